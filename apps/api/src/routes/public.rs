//! Unauthenticated routes: health, manager signup/signin, session start.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use tableside_core::{ManagerView, SessionClaims, ValidationError};

use crate::auth::{MANAGER_COOKIE, SESSION_COOKIE};
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::services::{ManagerService, SeatService, SigninGrant, TokenGrant};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/session/start", get(start_session))
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionStartQuery {
    #[serde(default)]
    pub store_id: String,
    #[serde(default)]
    pub seat_id: String,
    /// Unix expiry overriding the default session lifetime.
    pub exp: Option<i64>,
}

async fn health() -> ApiResponse<Value> {
    ApiResponse::ok("ok", json!({ "status": "ok" }))
}

async fn signup(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<ApiResponse<ManagerView>> {
    let Json(body) = body?;
    let manager = ManagerService::new(state)
        .signup(&body.email, &body.password)
        .await?;
    Ok(ApiResponse::created("manager registered", manager))
}

async fn signin(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<ApiResponse<SigninGrant>> {
    let Json(body) = body?;
    let max_age = state.config.manager_token_ttl_secs;

    let grant = ManagerService::new(state)
        .signin(&body.email, &body.password)
        .await?;
    let token = grant.token.clone();

    Ok(ApiResponse::ok("signed in", grant).with_cookie(MANAGER_COOKIE, &token, max_age))
}

async fn start_session(
    State(state): State<AppState>,
    query: Result<Query<SessionStartQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<TokenGrant<SessionClaims>>> {
    let Query(query) = query?;

    let mut missing = Vec::new();
    if query.store_id.trim().is_empty() {
        missing.push("store_id".to_string());
    }
    if query.seat_id.trim().is_empty() {
        missing.push("seat_id".to_string());
    }
    if !missing.is_empty() {
        return Err(ValidationError::Required { fields: missing }.into());
    }

    let expires_at = query
        .exp
        .map(|exp| {
            DateTime::<Utc>::from_timestamp(exp, 0)
                .ok_or_else(|| ApiError::BadRequest(format!("exp {exp} is out of range")))
        })
        .transpose()?;

    let grant = SeatService::new(state)
        .start_session(&query.store_id, &query.seat_id, expires_at)
        .await?;
    let token = grant.token.clone();
    let max_age = grant.claims.exp - Utc::now().timestamp();

    let message = format!(
        "session started for store_id={}, seat_id={}",
        query.store_id, query.seat_id
    );
    Ok(ApiResponse::ok(message, grant).with_cookie(SESSION_COOKIE, &token, max_age))
}
