//! # Tableside API
//!
//! HTTP server for table ordering: customers scan a seat's QR code, get a
//! session token and place orders; managers sign in to run stores, seats
//! and the order lifecycle.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tableside API                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐   │
//! │  │  /public         │  │ /private/manager │  │  /private/session    │   │
//! │  │                  │  │                  │  │                      │   │
//! │  │ • health         │  │ • stores         │  │ • create order       │   │
//! │  │ • signup/signin  │  │ • seats, QR      │  │ • add item           │   │
//! │  │ • session start  │  │ • orders, status │  │ • cancel             │   │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘   │
//! │            │                    │                       │               │
//! │            └───────── services (AppState) ──────────────┘               │
//! │                                 │                                       │
//! │                 Arc<dyn Repository<T>> (SQLite or memory)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `APP_ENV` - production / staging / test / development (default)
//! - `PORT` - HTTP port (default: 8080)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `DATABASE_PATH` - SQLite file (default: ./tableside.db)
//! - `FRONTEND_URL` - Allowed CORS origin in production
//! - `MANAGER_TOKEN_TTL_SECS` - Manager token lifetime (default: 604800)
//! - `SESSION_TOKEN_TTL_SECS` - Session token lifetime (default: 3600)

pub mod auth;
pub mod config;
pub mod error;
pub mod password;
pub mod response;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use tableside_core::{Manager, OrderSession, Seat, Store};
use tableside_db::{Database, MemoryRepository, Repository};

// Re-exports
pub use auth::JwtManager;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn Repository<OrderSession>>,
    pub stores: Arc<dyn Repository<Store>>,
    pub seats: Arc<dyn Repository<Seat>>,
    pub managers: Arc<dyn Repository<Manager>>,
    pub jwt: JwtManager,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// State backed by SQLite collections under the database's environment.
    pub fn from_database(db: &Database, config: ApiConfig) -> Self {
        AppState {
            orders: Arc::new(db.orders()),
            stores: Arc::new(db.stores()),
            seats: Arc::new(db.seats()),
            managers: Arc::new(db.managers()),
            jwt: JwtManager::new(config.jwt_secret.clone()),
            config: Arc::new(config),
        }
    }

    /// State backed by empty in-process collections.
    pub fn in_memory(config: ApiConfig) -> Self {
        AppState {
            orders: Arc::new(MemoryRepository::<OrderSession>::new()),
            stores: Arc::new(MemoryRepository::<Store>::new()),
            seats: Arc::new(MemoryRepository::<Seat>::new()),
            managers: Arc::new(MemoryRepository::<Manager>::new()),
            jwt: JwtManager::new(config.jwt_secret.clone()),
            config: Arc::new(config),
        }
    }
}

/// The complete application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .nest("/api/v1", routes::router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Production admits only `FRONTEND_URL`; other environments allow any origin.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if !config.environment.is_production() {
        return CorsLayer::permissive();
    }

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86_400));

    match config.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(e)) => {
            warn!(error = %e, "FRONTEND_URL is not a valid origin, refusing cross-origin requests");
            cors
        }
        None => {
            warn!("FRONTEND_URL not set, refusing cross-origin requests");
            cors
        }
    }
}
