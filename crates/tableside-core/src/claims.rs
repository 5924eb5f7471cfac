//! # Token Claims
//!
//! Snapshots carried inside signed tokens. This module only builds and
//! inspects claims; signing lives with the HTTP layer.
//!
//! ```text
//! ┌──────────────────────────┐        ┌──────────────────────────────┐
//! │      ManagerClaims       │        │        SessionClaims         │
//! │  sub    (manager email)  │        │  store_id                    │
//! │  admin                   │        │  seat_id                     │
//! │  iat / exp               │        │  name    (seat display name) │
//! │  scope = manager         │        │  iat / exp                   │
//! └──────────────────────────┘        │  scope = session             │
//!                                     └──────────────────────────────┘
//! ```
//!
//! Claims are built fresh for every issuance and never mutated.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which route group a token opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    Manager,
    Session,
}

/// Claims that know their own scope.
pub trait ScopedClaims {
    /// Scope a token must carry to decode as this type.
    const SCOPE: TokenScope;

    fn scope(&self) -> TokenScope;

    /// Expiry as a unix timestamp.
    fn exp(&self) -> i64;

    /// Expired on or after `exp`.
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp()
    }
}

// =============================================================================
// Manager Claims
// =============================================================================

/// Identity of a signed-in store manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ManagerClaims {
    /// Manager email.
    pub sub: String,
    pub admin: bool,
    pub iat: i64,
    pub exp: i64,
    pub scope: TokenScope,
}

impl ManagerClaims {
    pub fn new(email: impl Into<String>, admin: bool, ttl: Duration) -> Self {
        Self::issued_at(email, admin, Utc::now(), ttl)
    }

    pub fn issued_at(
        email: impl Into<String>,
        admin: bool,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        ManagerClaims {
            sub: email.into(),
            admin,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            scope: TokenScope::Manager,
        }
    }

    pub fn email(&self) -> &str {
        &self.sub
    }
}

impl ScopedClaims for ManagerClaims {
    const SCOPE: TokenScope = TokenScope::Manager;

    fn scope(&self) -> TokenScope {
        self.scope
    }

    fn exp(&self) -> i64 {
        self.exp
    }
}

// =============================================================================
// Session Claims
// =============================================================================

/// An active ordering session at one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionClaims {
    pub store_id: String,
    pub seat_id: String,
    /// Seat display name.
    pub name: String,
    pub iat: i64,
    pub exp: i64,
    pub scope: TokenScope,
}

impl SessionClaims {
    pub fn new(
        store_id: impl Into<String>,
        seat_id: impl Into<String>,
        name: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self::build(store_id, seat_id, name, now, now + ttl)
    }

    /// Claims with an explicit expiry instead of a lifetime.
    pub fn with_expiry(
        store_id: impl Into<String>,
        seat_id: impl Into<String>,
        name: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self::build(store_id, seat_id, name, Utc::now(), expires_at)
    }

    fn build(
        store_id: impl Into<String>,
        seat_id: impl Into<String>,
        name: impl Into<String>,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        SessionClaims {
            store_id: store_id.into(),
            seat_id: seat_id.into(),
            name: name.into(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            scope: TokenScope::Session,
        }
    }
}

impl ScopedClaims for SessionClaims {
    const SCOPE: TokenScope = TokenScope::Session;

    fn scope(&self) -> TokenScope {
        self.scope
    }

    fn exp(&self) -> i64 {
        self.exp
    }
}
