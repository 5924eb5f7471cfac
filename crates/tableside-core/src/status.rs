//! # Order Status
//!
//! The lifecycle state of an order session and its transition table.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  created ──► pending_payment ──► payment_received ──► pending_confirm.  │
//! │     │              │                                        │           │
//! │     │              └──► payment_failed (final)              │           │
//! │     ▼                                                       ▼           │
//! │  confirmed ◄───────────────────────────────────────────────┘            │
//! │     │  ▲                                                                │
//! │     ▼  │                                                                │
//! │  preparing ◄──► on_hold                                                 │
//! │     │                                                                   │
//! │     ├──► ready_for_pickup ──► picked_up / served                        │
//! │     └──► ready_for_delivery ──► out_for_delivery ◄──► delivery_failed   │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │                                   delivered                             │
//! │                                                                         │
//! │  delivered / picked_up / served ──► completed | refunded |              │
//! │                                     partially_refunded                  │
//! │  partially_refunded ──► refunded | completed | cancelled                │
//! │                                                                         │
//! │  Final: completed, cancelled, declined, refunded, failed,               │
//! │         payment_failed                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every allowed edge lives in [`TRANSITIONS`]. Nothing else decides whether
//! a transition is legal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Status
// =============================================================================

/// Lifecycle state of an order session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    // Initial / payment
    #[default]
    Created,
    PendingPayment,
    PaymentReceived,
    PaymentFailed,

    // Internal processing
    PendingConfirmation,
    Confirmed,
    Preparing,
    OnHold,

    // Fulfillment
    ReadyForPickup,
    ReadyForDelivery,
    OutForDelivery,
    DeliveryAttemptFailed,
    Delivered,
    PickedUp,
    Served,

    // Completion / exception
    Completed,
    Cancelled,
    Declined,
    Refunded,
    PartiallyRefunded,
    Failed,
}

use Status::*;

/// Adjacency table: source status → allowed targets.
///
/// Sources missing from this table have no outgoing edges.
pub const TRANSITIONS: &[(Status, &[Status])] = &[
    (Created, &[PendingPayment, Confirmed, Cancelled, Declined]),
    (PendingPayment, &[PaymentReceived, PaymentFailed, Cancelled, Declined]),
    (PaymentReceived, &[PendingConfirmation, Cancelled, Declined]),
    (PendingConfirmation, &[Confirmed, Cancelled, Declined]),
    (Confirmed, &[Preparing, OnHold, Cancelled]),
    (Preparing, &[ReadyForPickup, ReadyForDelivery, OnHold, Cancelled]),
    (
        OnHold,
        &[Confirmed, Preparing, ReadyForPickup, ReadyForDelivery, Cancelled],
    ),
    (ReadyForPickup, &[PickedUp, Served, Cancelled]),
    (ReadyForDelivery, &[OutForDelivery, Served, Cancelled]),
    (OutForDelivery, &[Delivered, DeliveryAttemptFailed, Cancelled]),
    (DeliveryAttemptFailed, &[OutForDelivery, Delivered, Cancelled]),
    (Delivered, &[Completed, Refunded, PartiallyRefunded]),
    (PickedUp, &[Completed, Refunded, PartiallyRefunded]),
    (Served, &[Completed, Refunded, PartiallyRefunded]),
    (PaymentFailed, &[Cancelled]),
    (Failed, &[Cancelled]),
    (PartiallyRefunded, &[Refunded, Completed, Cancelled]),
];

impl Status {
    /// Every status, in declaration order.
    pub const ALL: [Status; 21] = [
        Created,
        PendingPayment,
        PaymentReceived,
        PaymentFailed,
        PendingConfirmation,
        Confirmed,
        Preparing,
        OnHold,
        ReadyForPickup,
        ReadyForDelivery,
        OutForDelivery,
        DeliveryAttemptFailed,
        Delivered,
        PickedUp,
        Served,
        Completed,
        Cancelled,
        Declined,
        Refunded,
        PartiallyRefunded,
        Failed,
    ];

    /// The wire name of this status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Created => "created",
            PendingPayment => "pending_payment",
            PaymentReceived => "payment_received",
            PaymentFailed => "payment_failed",
            PendingConfirmation => "pending_confirmation",
            Confirmed => "confirmed",
            Preparing => "preparing",
            OnHold => "on_hold",
            ReadyForPickup => "ready_for_pickup",
            ReadyForDelivery => "ready_for_delivery",
            OutForDelivery => "out_for_delivery",
            DeliveryAttemptFailed => "delivery_attempt_failed",
            Delivered => "delivered",
            PickedUp => "picked_up",
            Served => "served",
            Completed => "completed",
            Cancelled => "cancelled",
            Declined => "declined",
            Refunded => "refunded",
            PartiallyRefunded => "partially_refunded",
            Failed => "failed",
        }
    }

    /// True when no ordinary status update may leave this status.
    ///
    /// `partially_refunded` is deliberately not final.
    pub const fn is_final(&self) -> bool {
        matches!(
            self,
            Completed | Cancelled | Declined | Refunded | Failed | PaymentFailed
        )
    }

    pub const fn can_add_item(&self) -> bool {
        matches!(
            self,
            Created | PendingPayment | PendingConfirmation | Confirmed | OnHold
        )
    }

    pub const fn can_cancel(&self) -> bool {
        matches!(
            self,
            Created
                | PendingPayment
                | PendingConfirmation
                | Preparing
                | Confirmed
                | OnHold
                | ReadyForPickup
                | ReadyForDelivery
        )
    }

    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, Delivered | PickedUp | Served)
    }

    pub const fn is_in_preparation(&self) -> bool {
        matches!(self, Confirmed | Preparing | OnHold)
    }

    pub const fn is_ready_for_service(&self) -> bool {
        matches!(self, ReadyForPickup | ReadyForDelivery | OutForDelivery)
    }

    /// Targets reachable from this status in one step.
    pub fn allowed_transitions(&self) -> &'static [Status] {
        TRANSITIONS
            .iter()
            .find(|(from, _)| from == self)
            .map(|(_, targets)| *targets)
            .unwrap_or(&[])
    }

    /// Looks up `self → target` in [`TRANSITIONS`].
    pub fn can_transition_to(&self, target: Status) -> bool {
        self.allowed_transitions().contains(&target)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Allowed edges written out by hand, one per line.
    const EXPECTED_EDGES: &str = "
        created pending_payment
        created confirmed
        created cancelled
        created declined
        pending_payment payment_received
        pending_payment payment_failed
        pending_payment cancelled
        pending_payment declined
        payment_received pending_confirmation
        payment_received cancelled
        payment_received declined
        pending_confirmation confirmed
        pending_confirmation cancelled
        pending_confirmation declined
        confirmed preparing
        confirmed on_hold
        confirmed cancelled
        preparing ready_for_pickup
        preparing ready_for_delivery
        preparing on_hold
        preparing cancelled
        on_hold confirmed
        on_hold preparing
        on_hold ready_for_pickup
        on_hold ready_for_delivery
        on_hold cancelled
        ready_for_pickup picked_up
        ready_for_pickup served
        ready_for_pickup cancelled
        ready_for_delivery out_for_delivery
        ready_for_delivery served
        ready_for_delivery cancelled
        out_for_delivery delivered
        out_for_delivery delivery_attempt_failed
        out_for_delivery cancelled
        delivery_attempt_failed out_for_delivery
        delivery_attempt_failed delivered
        delivery_attempt_failed cancelled
        delivered completed
        delivered refunded
        delivered partially_refunded
        picked_up completed
        picked_up refunded
        picked_up partially_refunded
        served completed
        served refunded
        served partially_refunded
        payment_failed cancelled
        failed cancelled
        partially_refunded refunded
        partially_refunded completed
        partially_refunded cancelled
    ";

    fn expected_edges() -> HashSet<(String, String)> {
        EXPECTED_EDGES
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                let mut parts = line.split_whitespace();
                (
                    parts.next().unwrap().to_string(),
                    parts.next().unwrap().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_transition_table_exhaustive() {
        let expected = expected_edges();
        assert_eq!(expected.len(), 52);

        let mut checked = 0;
        for from in Status::ALL {
            for to in Status::ALL {
                let want = expected.contains(&(from.to_string(), to.to_string()));
                assert_eq!(
                    from.can_transition_to(to),
                    want,
                    "{} -> {} should be {}",
                    from,
                    to,
                    want
                );
                checked += 1;
            }
        }
        assert_eq!(checked, 441);
    }

    #[test]
    fn test_closed_statuses_have_no_edges() {
        for status in [Completed, Cancelled, Declined, Refunded] {
            assert!(status.allowed_transitions().is_empty(), "{}", status);
        }
    }

    #[test]
    fn test_partially_refunded_is_only_non_final_with_only_final_targets() {
        let quasi_terminal: Vec<Status> = Status::ALL
            .into_iter()
            .filter(|s| !s.is_final())
            .filter(|s| {
                let targets = s.allowed_transitions();
                !targets.is_empty() && targets.iter().all(Status::is_final)
            })
            .collect();

        assert_eq!(quasi_terminal, vec![PartiallyRefunded]);
    }

    #[test]
    fn test_default_is_created() {
        assert_eq!(Status::default(), Status::Created);
    }

    #[test]
    fn test_is_final() {
        let finals: Vec<Status> = Status::ALL.into_iter().filter(Status::is_final).collect();
        assert_eq!(
            finals,
            vec![PaymentFailed, Completed, Cancelled, Declined, Refunded, Failed]
        );
        assert!(!PartiallyRefunded.is_final());
    }

    #[test]
    fn test_can_add_item() {
        let open: Vec<Status> = Status::ALL
            .into_iter()
            .filter(Status::can_add_item)
            .collect();
        assert_eq!(
            open,
            vec![Created, PendingPayment, PendingConfirmation, Confirmed, OnHold]
        );
    }

    #[test]
    fn test_can_cancel() {
        let cancellable: HashSet<Status> = Status::ALL
            .into_iter()
            .filter(Status::can_cancel)
            .collect();
        let expected: HashSet<Status> = [
            Created,
            PendingPayment,
            PendingConfirmation,
            Preparing,
            Confirmed,
            OnHold,
            ReadyForPickup,
            ReadyForDelivery,
        ]
        .into_iter()
        .collect();
        assert_eq!(cancellable, expected);
    }

    #[test]
    fn test_grouping_predicates() {
        assert!(Delivered.is_fulfilled() && PickedUp.is_fulfilled() && Served.is_fulfilled());
        assert!(!Completed.is_fulfilled());

        assert!(Confirmed.is_in_preparation());
        assert!(Preparing.is_in_preparation());
        assert!(OnHold.is_in_preparation());
        assert!(!Created.is_in_preparation());

        assert!(ReadyForPickup.is_ready_for_service());
        assert!(ReadyForDelivery.is_ready_for_service());
        assert!(OutForDelivery.is_ready_for_service());
        assert!(!Delivered.is_ready_for_service());
    }

    #[test]
    fn test_parse_and_display() {
        for status in Status::ALL {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        assert_eq!(
            "shipped".parse::<Status>(),
            Err(ValidationError::UnknownStatus("shipped".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&DeliveryAttemptFailed).unwrap();
        assert_eq!(json, "\"delivery_attempt_failed\"");
        let parsed: Status = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(parsed, OnHold);
    }
}
