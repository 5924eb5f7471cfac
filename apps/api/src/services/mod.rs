//! Service layer.
//!
//! Each service wraps a clone of [`AppState`](crate::AppState) and holds the
//! use-case logic for one area. Handlers stay thin: parse, call, wrap.

pub mod manager_service;
pub mod order_service;
pub mod seat_service;
pub mod store_service;

use serde::Serialize;

pub use manager_service::{ManagerService, SigninGrant};
pub use order_service::{NewLineItem, OrderService};
pub use seat_service::SeatService;
pub use store_service::StoreService;

/// `token_type` reported alongside every issued token.
pub const TOKEN_TYPE: &str = "bearer";

/// A freshly signed token together with the claims inside it.
#[derive(Debug, Clone, Serialize)]
pub struct TokenGrant<C> {
    pub token: String,
    pub token_type: &'static str,
    pub claims: C,
}

impl<C> TokenGrant<C> {
    pub fn new(token: String, claims: C) -> Self {
        TokenGrant {
            token,
            token_type: TOKEN_TYPE,
            claims,
        }
    }
}
