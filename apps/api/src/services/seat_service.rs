//! Seats and the session tokens behind their QR codes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use tableside_core::{Seat, SessionClaims};

use crate::error::{ApiError, ApiResult};
use crate::services::{StoreService, TokenGrant};
use crate::AppState;

/// What a seat's QR code encodes.
#[derive(Debug, Clone, Serialize)]
pub struct SeatQr {
    #[serde(flatten)]
    pub grant: TokenGrant<SessionClaims>,
    /// Path a scan opens to start a session at this seat.
    pub start_path: String,
}

pub struct SeatService {
    state: AppState,
}

impl SeatService {
    pub fn new(state: AppState) -> Self {
        SeatService { state }
    }

    pub async fn create(&self, store_id: &str, name: &str) -> ApiResult<Seat> {
        StoreService::new(self.state.clone()).load(store_id).await?;

        let seat = Seat::new(store_id, name)?;
        self.state.seats.create(&seat).await?;
        info!(store_id = %store_id, seat_id = %seat.id, "seat created");

        Ok(seat)
    }

    pub async fn list(&self, store_id: &str) -> ApiResult<Vec<Seat>> {
        StoreService::new(self.state.clone()).load(store_id).await?;
        Ok(self
            .state
            .seats
            .find_by_field("store_id", &json!(store_id))
            .await?)
    }

    /// Loads a seat, which must belong to `store_id`. A seat of another
    /// store is reported as missing.
    pub async fn get(&self, store_id: &str, seat_id: &str) -> ApiResult<Seat> {
        match self.state.seats.find_by_id(seat_id).await? {
            Some(seat) if seat.store_id == store_id => Ok(seat),
            _ => Err(ApiError::not_found(format!(
                "seat {seat_id} in store {store_id}"
            ))),
        }
    }

    /// Starts a session at a seat, expiring at `expires_at` or after the
    /// configured session lifetime.
    pub async fn start_session(
        &self,
        store_id: &str,
        seat_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> ApiResult<TokenGrant<SessionClaims>> {
        let seat = self.get(store_id, seat_id).await?;

        let claims = match expires_at {
            Some(at) if at <= Utc::now() => {
                return Err(ApiError::BadRequest("exp must be in the future".to_string()));
            }
            Some(at) => SessionClaims::with_expiry(store_id, seat_id, seat.name.as_str(), at),
            None => SessionClaims::new(
                store_id,
                seat_id,
                seat.name.as_str(),
                self.state.config.session_token_ttl(),
            ),
        };

        let token = self.state.jwt.sign(&claims)?;
        info!(store_id = %store_id, seat_id = %seat_id, exp = claims.exp, "session started");

        Ok(TokenGrant::new(token, claims))
    }

    /// Issues the session token a seat's QR code carries.
    pub async fn issue_qr(&self, store_id: &str, seat_id: &str) -> ApiResult<SeatQr> {
        let grant = self.start_session(store_id, seat_id, None).await?;
        Ok(SeatQr {
            grant,
            start_path: format!(
                "/api/v1/public/session/start?store_id={store_id}&seat_id={seat_id}"
            ),
        })
    }
}
