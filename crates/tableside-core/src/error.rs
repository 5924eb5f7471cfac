//! # Error Types
//!
//! Domain-specific error types for tableside-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tableside-core errors (this file)                                      │
//! │  ├── OrderError       - Order session lifecycle failures                │
//! │  ├── ValidationError  - Entity field validation failures                │
//! │  └── CoreError        - Either of the above                             │
//! │                                                                         │
//! │  tableside-db errors (separate crate)                                   │
//! │  └── DbError          - Storage failures                                │
//! │                                                                         │
//! │  apps/api errors                                                        │
//! │  └── ApiError         - What the HTTP client sees                       │
//! │                                                                         │
//! │  Flow: OrderError → CoreError → ApiError → JSON envelope                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate logs or retries. Every failure is returned to the
//! immediate caller.

use thiserror::Error;

use crate::money::Money;
use crate::status::Status;

// =============================================================================
// Order Error
// =============================================================================

/// Failures of the order session aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// A required identifier was empty.
    ///
    /// ## When This Occurs
    /// - `OrderSession::new` with an empty store id or seat id
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An order session was constructed without line items.
    #[error("order must contain at least one item")]
    NoItems,

    /// The current status forbids adding items.
    ///
    /// ## When This Occurs
    /// - The order is already preparing, being served, or closed
    #[error("cannot add item to order in status {status}")]
    CannotAddItem { status: Status },

    /// The ordering window has passed.
    ///
    /// ## When This Occurs
    /// - `add_item` after `expires_at`, whatever the status
    #[error("order session has expired")]
    OrderExpired,

    /// A status change was attempted on a closed order.
    #[error("order is already in final status {status}")]
    OrderAlreadyFinal { status: Status },

    /// The requested edge is not in the transition table.
    ///
    /// ## User Workflow
    /// ```text
    /// Manager clicks "Complete" on a freshly created order
    ///      │
    ///      ▼
    /// created.can_transition_to(completed) == false
    ///      │
    ///      ▼
    /// InvalidStatusTransition { from: created, to: completed }
    /// ```
    #[error("invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: Status, to: Status },

    /// A partial refund asked for more than the order total.
    #[error("refund amount {amount} exceeds order total {total}")]
    RefundAmountExceedsTotal { amount: Money, total: Money },

    /// A subtotal or the order total does not fit in an `i64`.
    ///
    /// ## When This Occurs
    /// - `OrderSession::new` or `add_item` with a huge quantity or price
    #[error("order amount out of range")]
    AmountOverflow,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for stores, seats, managers and passwords.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are empty after trimming.
    #[error("required fields are empty: {}", fields.join(", "))]
    Required { fields: Vec<String> },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} bytes")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g. an email without `@`).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A string did not name any known status.
    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

impl ValidationError {
    /// Shorthand for a single missing field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            fields: vec![field.into()],
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Any error raised by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
