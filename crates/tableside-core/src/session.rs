//! # Order Session
//!
//! The aggregate root for one customer order at one store seat.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  QR scan ──► SessionClaims ──► OrderSession::new(store, seat, items)    │
//! │                                      │                                  │
//! │                                      │ status = created                 │
//! │                                      │ expires_at = now + 15 min        │
//! │                                      ▼                                  │
//! │                 ┌──────────── add_item ◄─── customer                    │
//! │                 │  guarded by status.can_add_item() and expires_at      │
//! │                 ▼                                                       │
//! │          update_status / mark_* ◄─── manager / kitchen                  │
//! │                 │  guarded by is_final() then the transition table      │
//! │                 ▼                                                       │
//! │          mark_partially_refunded ◄─── operator                          │
//! │                    guarded only by amount <= total_amount               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `total_amount == Σ item.subtotal()` after every mutating call returns.
//! - Every item's `order_id` equals the session id.
//! - `status` only changes through [`OrderSession::update_status`] or the
//!   refund exception path.
//!
//! Items are only reachable read-only from outside, so the cached total
//! cannot be observed stale.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::OrderError;
use crate::id::IdPrefix;
use crate::line_item::LineItem;
use crate::money::Money;
use crate::status::Status;

/// How long a new session accepts items.
pub const ORDER_SESSION_TTL_MINUTES: i64 = 15;

// =============================================================================
// Order Session
// =============================================================================

/// One customer's order at a store seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderSession {
    id: String,
    store_id: String,
    seat_id: String,
    items: Vec<LineItem>,
    total_amount: Money,
    status: Status,
    #[ts(as = "String")]
    issued_at: DateTime<Utc>,
    #[ts(as = "String")]
    expires_at: DateTime<Utc>,
    #[ts(as = "String")]
    created_at: DateTime<Utc>,
    #[ts(as = "String")]
    updated_at: DateTime<Utc>,
}

impl OrderSession {
    /// Opens a new order session.
    ///
    /// ## Errors
    /// - [`OrderError::InvalidArgument`] if `store_id` or `seat_id` is empty
    /// - [`OrderError::NoItems`] if `items` is empty
    /// - [`OrderError::AmountOverflow`] if the total does not fit in an `i64`
    pub fn new(
        store_id: impl Into<String>,
        seat_id: impl Into<String>,
        items: Vec<LineItem>,
    ) -> Result<Self, OrderError> {
        let store_id = store_id.into();
        let seat_id = seat_id.into();

        if store_id.is_empty() {
            return Err(OrderError::InvalidArgument("store_id is required".into()));
        }
        if seat_id.is_empty() {
            return Err(OrderError::InvalidArgument("seat_id is required".into()));
        }
        if items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let id = IdPrefix::ORDER.generate();
        let now = Utc::now();

        let mut session = OrderSession {
            id,
            store_id,
            seat_id,
            items: Vec::with_capacity(items.len()),
            total_amount: Money::ZERO,
            status: Status::Created,
            issued_at: now,
            expires_at: now + Duration::minutes(ORDER_SESSION_TTL_MINUTES),
            created_at: now,
            updated_at: now,
        };

        for mut item in items {
            item.order_id = session.id.clone();
            session.items.push(item);
        }
        session.total_amount = session
            .sum_subtotals()
            .ok_or(OrderError::AmountOverflow)?;

        Ok(session)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn seat_id(&self) -> &str {
        &self.seat_id
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True once `now` is past `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    /// Appends an item and refreshes the total.
    ///
    /// ## Errors
    /// - [`OrderError::OrderExpired`] if the session window has passed,
    ///   whatever the status
    /// - [`OrderError::CannotAddItem`] if the status forbids additions
    /// - [`OrderError::AmountOverflow`] if the new total does not fit in an `i64`
    pub fn add_item(&mut self, item: LineItem) -> Result<(), OrderError> {
        self.add_item_at(item, Utc::now())
    }

    /// [`add_item`](Self::add_item) with an explicit clock reading.
    pub fn add_item_at(&mut self, mut item: LineItem, now: DateTime<Utc>) -> Result<(), OrderError> {
        if self.is_expired_at(now) {
            return Err(OrderError::OrderExpired);
        }
        if !self.status.can_add_item() {
            return Err(OrderError::CannotAddItem {
                status: self.status,
            });
        }

        let total = item
            .subtotal()
            .and_then(|subtotal| self.total_amount.checked_add(subtotal))
            .ok_or(OrderError::AmountOverflow)?;

        item.order_id = self.id.clone();
        self.items.push(item);
        self.total_amount = total;
        self.touch();
        Ok(())
    }

    /// Recomputes `total_amount` from the current items. Always succeeds.
    ///
    /// Items only enter through [`new`](Self::new) and
    /// [`add_item`](Self::add_item), which reject totals outside the `i64`
    /// range, so the sum cannot overflow here.
    pub fn recalculate_total_amount(&mut self) {
        if let Some(total) = self.sum_subtotals() {
            self.total_amount = total;
        }
        self.touch();
    }

    fn sum_subtotals(&self) -> Option<Money> {
        self.items
            .iter()
            .map(LineItem::subtotal)
            .try_fold(Money::ZERO, |acc, subtotal| acc.checked_add(subtotal?))
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // -------------------------------------------------------------------------
    // Status
    // -------------------------------------------------------------------------

    /// Moves the order along one edge of the transition table.
    ///
    /// ## Errors
    /// - [`OrderError::OrderAlreadyFinal`] if the current status is final
    /// - [`OrderError::InvalidStatusTransition`] if the edge is not allowed
    pub fn update_status(&mut self, new_status: Status) -> Result<(), OrderError> {
        if self.status.is_final() {
            return Err(OrderError::OrderAlreadyFinal {
                status: self.status,
            });
        }
        if !self.status.can_transition_to(new_status) {
            return Err(OrderError::InvalidStatusTransition {
                from: self.status,
                to: new_status,
            });
        }

        self.status = new_status;
        self.touch();
        Ok(())
    }

    pub fn mark_confirmed(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::Confirmed)
    }

    pub fn mark_preparing(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::Preparing)
    }

    pub fn mark_ready_for_pickup(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::ReadyForPickup)
    }

    pub fn mark_ready_for_delivery(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::ReadyForDelivery)
    }

    pub fn mark_out_for_delivery(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::OutForDelivery)
    }

    pub fn mark_delivered(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::Delivered)
    }

    pub fn mark_picked_up(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::PickedUp)
    }

    pub fn mark_served(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::Served)
    }

    pub fn mark_completed(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::Completed)
    }

    pub fn mark_cancelled(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::Cancelled)
    }

    pub fn mark_payment_failed(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::PaymentFailed)
    }

    pub fn mark_on_hold(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::OnHold)
    }

    pub fn mark_refunded(&mut self) -> Result<(), OrderError> {
        self.update_status(Status::Refunded)
    }

    /// Records a partial refund of `amount`.
    ///
    /// Unlike every other status change this skips the final-state guard and
    /// the transition table, so a completed order can still be partially
    /// refunded.
    ///
    /// ## Errors
    /// - [`OrderError::RefundAmountExceedsTotal`] if `amount > total_amount`
    pub fn mark_partially_refunded(&mut self, amount: Money) -> Result<(), OrderError> {
        if amount > self.total_amount {
            return Err(OrderError::RefundAmountExceedsTotal {
                amount,
                total: self.total_amount,
            });
        }
        self.apply_exception_status(Status::PartiallyRefunded);
        Ok(())
    }

    /// Unguarded status assignment. Only the refund path calls this.
    fn apply_exception_status(&mut self, status: Status) {
        self.status = status;
        self.touch();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
