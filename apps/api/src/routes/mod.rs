//! # Routes
//!
//! ```text
//! /api/v1
//! ├── /public                   no auth
//! ├── /private/manager          require_manager  (jwt_token)
//! └── /private/session          require_session  (session_jwt)
//! ```

pub mod manager;
pub mod public;
pub mod session;

use axum::middleware;
use axum::Router;

use crate::auth::{require_manager, require_session};
use crate::AppState;

/// Every route group, with its auth layer, ready to nest under `/api/v1`.
pub fn router(state: AppState) -> Router {
    let manager = manager::router()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_manager));
    let session = session::router()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .nest("/public", public::router())
        .nest("/private/manager", manager)
        .nest("/private/session", session)
        .with_state(state)
}
