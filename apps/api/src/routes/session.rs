//! Customer routes. Every handler runs behind `require_session` and only
//! reaches orders of the token's own store and seat.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use tableside_core::{OrderSession, SessionClaims};

use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::services::{NewLineItem, OrderService};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/orders", post(create_order))
        .route("/orders/{order_id}", get(get_order))
        .route("/orders/{order_id}/items", post(add_item))
        .route("/orders/{order_id}/cancel", post(cancel_order))
}

#[derive(Debug, Deserialize)]
pub struct NewOrder {
    #[serde(default)]
    pub items: Vec<NewLineItem>,
}

async fn health(Extension(claims): Extension<SessionClaims>) -> ApiResponse<SessionClaims> {
    ApiResponse::ok("session token is valid", claims)
}

async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> ApiResult<ApiResponse<OrderSession>> {
    let Json(body) = body?;
    let order = OrderService::new(state).create(&claims, body.items).await?;
    Ok(ApiResponse::created("order created", order))
}

async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<ApiResponse<OrderSession>> {
    let Path(order_id) = path?;
    let order = OrderService::new(state)
        .get_for_session(&claims, &order_id)
        .await?;
    Ok(ApiResponse::ok("order", order))
}

async fn add_item(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<NewLineItem>, JsonRejection>,
) -> ApiResult<ApiResponse<OrderSession>> {
    let Path(order_id) = path?;
    let Json(item) = body?;
    let order = OrderService::new(state)
        .add_item(&claims, &order_id, item)
        .await?;
    Ok(ApiResponse::ok("item added", order))
}

async fn cancel_order(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<ApiResponse<OrderSession>> {
    let Path(order_id) = path?;
    let order = OrderService::new(state).cancel(&claims, &order_id).await?;
    Ok(ApiResponse::ok("order cancelled", order))
}
