//! # tableside-core: Order Lifecycle for Table Ordering
//!
//! Pure domain logic with zero I/O. Customers scan a seat QR code, open a
//! time-boxed [`OrderSession`], add [`LineItem`]s, and the order moves
//! through the [`Status`] state machine until it is served and settled.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   apps/api (axum handlers)                      │    │
//! │  │    load session ──► one core operation ──► persist result       │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ tableside-core (THIS CRATE) ★                   │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐    │    │
//! │  │   │  status   │  │ line_item │  │  session  │  │  claims   │    │    │
//! │  │   │  Status   │  │ LineItem  │  │  Order    │  │ Manager / │    │    │
//! │  │   │  table    │  │ subtotal  │  │  Session  │  │ Session   │    │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘    │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO ENV READS              │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                 tableside-db (Repository<T>)                    │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`status`] - Status enum, predicates and the transition table
//! - [`line_item`] - One product line with its subtotal
//! - [`session`] - The order session aggregate
//! - [`claims`] - Manager and session token claims
//! - [`types`] - Store, Seat, Manager
//! - [`money`] - Integer minor-unit amounts
//! - [`id`] - Prefixed sortable ids
//! - [`validation`] - Boundary input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tableside_core::{LineItem, Money, OrderSession, Status};
//!
//! let items = vec![
//!     LineItem::new("p1", 2, Money::from_minor(100)),
//!     LineItem::new("p2", 1, Money::from_minor(50)),
//! ];
//! let mut order = OrderSession::new("store_1", "seat_1", items).unwrap();
//! assert_eq!(order.total_amount(), Money::from_minor(250));
//!
//! order.mark_confirmed().unwrap();
//! assert_eq!(order.status(), Status::Confirmed);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod claims;
pub mod error;
pub mod id;
pub mod line_item;
pub mod money;
pub mod session;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use claims::{ManagerClaims, ScopedClaims, SessionClaims, TokenScope};
pub use error::{CoreError, CoreResult, OrderError, ValidationError};
pub use id::IdPrefix;
pub use line_item::LineItem;
pub use money::Money;
pub use session::{OrderSession, ORDER_SESSION_TTL_MINUTES};
pub use status::Status;
pub use types::*;
