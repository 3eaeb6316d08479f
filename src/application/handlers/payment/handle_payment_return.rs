//! HandlePaymentReturnHandler - Command handler for the shopper coming back
//! from the hosted checkout page.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, Timestamp};
use crate::domain::order::OrderStatus;
use crate::domain::payment::{PaymentError, SUCCESS};
use crate::ports::OrderRepository;

/// Command built from the return URL's query string.
#[derive(Debug, Clone)]
pub struct HandlePaymentReturnCommand {
    pub order_id: OrderId,
    /// Status the gateway appended to the return URL, if any.
    pub status: Option<String>,
    /// Set on the follow-up view after a failure was already recorded.
    pub refreshed: bool,
}

/// What the return did to the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentReturnOutcome {
    /// Gateway reported success; completion is left to the callback.
    Succeeded,
    /// Payment did not succeed and the pending order was marked failed.
    MarkedFailed,
    /// Nothing changed.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlePaymentReturnResult {
    pub order_id: OrderId,
    pub outcome: PaymentReturnOutcome,
    pub order_status: OrderStatus,
}

/// Handler for the shopper's return.
///
/// Unless the gateway reported `SUCCESS`, a pending order moves to failed
/// with a compare-and-set, and a missing status counts as failure. Orders in
/// any other state are left alone. A refreshed view only reads the order.
pub struct HandlePaymentReturnHandler {
    orders: Arc<dyn OrderRepository>,
}

impl HandlePaymentReturnHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentReturnCommand,
    ) -> Result<HandlePaymentReturnResult, PaymentError> {
        let order = self
            .orders
            .find(&cmd.order_id)
            .await?
            .ok_or_else(|| PaymentError::OrderNotFound(cmd.order_id.clone()))?;

        let reported = cmd.status.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let outcome = match reported {
            Some(SUCCESS) => PaymentReturnOutcome::Succeeded,
            _ if cmd.refreshed => PaymentReturnOutcome::Unchanged,
            status => {
                let status = status.unwrap_or("missing");
                let failed = self
                    .orders
                    .transition_status(
                        &order.id,
                        OrderStatus::Pending,
                        OrderStatus::Failed,
                        Timestamp::now(),
                    )
                    .await?;
                if failed {
                    tracing::info!(order_id = %order.id, status, "Order marked failed on return");
                    PaymentReturnOutcome::MarkedFailed
                } else {
                    PaymentReturnOutcome::Unchanged
                }
            }
        };

        let order_status = match outcome {
            PaymentReturnOutcome::MarkedFailed => OrderStatus::Failed,
            _ => order.status,
        };

        Ok(HandlePaymentReturnResult {
            order_id: order.id,
            outcome,
            order_status,
        })
    }
}
