//! Order status state machine.
//!
//! Mirrors the storefront's order lifecycle. This crate only ever moves an
//! order out of `Pending`: to `Completed` when a verified callback arrives, or
//! to `Failed` when the shopper returns from an unsuccessful checkout.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Storefront order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting payment. The only state a callback may complete.
    Pending,

    /// Payment received, fulfilment in progress.
    Processing,

    /// Awaiting manual confirmation.
    OnHold,

    /// Paid and fulfilled.
    Completed,

    /// Payment failed or was declined.
    Failed,

    /// Cancelled by the shopper or an administrator.
    Cancelled,

    /// Refunded after completion.
    Refunded,
}

impl OrderStatus {
    /// Returns true if the order is waiting for payment.
    pub fn is_awaiting_payment(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns the storefront's name for the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::OnHold => "on_hold",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for OrderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            // From PENDING
            (Pending, Completed)
                | (Pending, Processing)
                | (Pending, OnHold)
                | (Pending, Failed)
                | (Pending, Cancelled)
            // From PROCESSING / ON_HOLD
                | (Processing, Completed)
                | (Processing, Cancelled)
                | (OnHold, Processing)
                | (OnHold, Cancelled)
            // From COMPLETED
                | (Completed, Refunded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            Pending => vec![Completed, Processing, OnHold, Failed, Cancelled],
            Processing => vec![Completed, Cancelled],
            OnHold => vec![Processing, Cancelled],
            Completed => vec![Refunded],
            Failed | Cancelled | Refunded => vec![],
        }
    }
}
