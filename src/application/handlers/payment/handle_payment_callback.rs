//! HandlePaymentCallbackHandler - Command handler for the gateway's
//! asynchronous payment notification.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, OutTradeNo, Timestamp};
use crate::domain::order::OrderStatus;
use crate::domain::payment::{
    CallbackOutcome, CallbackRejection, GatewayNotification, PaymentCallback, PaymentError,
};
use crate::ports::{OrderRepository, PaymentAttemptStore, PaymentGateway};

/// Notification body and its detached signature.
#[derive(Debug, Clone)]
pub struct SignedNotification {
    pub body: Vec<u8>,
    pub signature: String,
}

/// Command to handle a payment callback.
#[derive(Debug, Clone)]
pub struct HandlePaymentCallbackCommand {
    pub callback: PaymentCallback,
    /// The gateway's signed body. Callbacks without one are ignored.
    pub notification: Option<SignedNotification>,
}

/// Handler for payment callbacks.
///
/// Completes an order only when the callback names it, presents the nonce
/// recorded at initiation, carries a gateway-signed notification reporting
/// `SUCCESS` for that attempt's trade number, and the order is still
/// pending. The completion is a compare-and-set, so duplicate or concurrent
/// deliveries complete the order and reduce stock exactly once.
///
/// Invalid callbacks are not errors: they come back as
/// `CallbackOutcome::Ignored`. Only infrastructure failures and a missing
/// gateway key are errors.
pub struct HandlePaymentCallbackHandler {
    orders: Arc<dyn OrderRepository>,
    attempts: Arc<dyn PaymentAttemptStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl HandlePaymentCallbackHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        attempts: Arc<dyn PaymentAttemptStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            orders,
            attempts,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentCallbackCommand,
    ) -> Result<CallbackOutcome, PaymentError> {
        // 1. Nothing is trusted without the gateway key
        self.gateway.require_verification_key()?;

        // 2. Required parameters
        let validated = match cmd.callback.validate() {
            Ok(validated) => validated,
            Err(rejection) => return Ok(ignore(None, rejection)),
        };
        let order_id = validated.order_id;

        // 3. Signed notification reporting success
        let notification = match &cmd.notification {
            Some(notification) => notification,
            None => {
                return Ok(ignore(
                    Some(&order_id),
                    CallbackRejection::MissingNotificationSignature,
                ))
            }
        };
        if !self
            .gateway
            .verify_notification(&notification.body, &notification.signature)?
        {
            return Ok(ignore(
                Some(&order_id),
                CallbackRejection::InvalidNotificationSignature,
            ));
        }
        let reported = match GatewayNotification::parse(&notification.body)
            .and_then(|n| n.require_success().map(|_| n))
        {
            Ok(reported) => reported,
            Err(rejection) => return Ok(ignore(Some(&order_id), rejection)),
        };

        // 4. Nonce and trade number recorded at initiation
        let attempt = match self.attempts.find(&order_id).await? {
            Some(attempt) => attempt,
            None => return Ok(ignore(Some(&order_id), CallbackRejection::NoPendingAttempt)),
        };
        if !attempt.nonce.matches(&validated.nonce) {
            return Ok(ignore(Some(&order_id), CallbackRejection::NonceMismatch));
        }
        if let Err(rejection) = reported.require_trade_number(&attempt.out_trade_no) {
            return Ok(ignore(Some(&order_id), rejection));
        }

        // 5. Order still awaiting payment
        let order = match self.orders.find(&order_id).await? {
            Some(order) => order,
            None => return Ok(ignore(Some(&order_id), CallbackRejection::OrderNotFound)),
        };
        if order.status == OrderStatus::Completed {
            // The attempt outlives completion only when a delivery failed
            // after the status change.
            return self.finish(order_id, &attempt.out_trade_no, true).await;
        }
        if !order.status.is_awaiting_payment() {
            return Ok(ignore(
                Some(&order_id),
                CallbackRejection::OrderNotPending(order.status),
            ));
        }

        // 6. Complete exactly once
        let completed = self
            .orders
            .transition_status(
                &order_id,
                OrderStatus::Pending,
                OrderStatus::Completed,
                Timestamp::now(),
            )
            .await?;
        if !completed {
            let current = self
                .orders
                .find(&order_id)
                .await?
                .map(|o| o.status)
                .unwrap_or(order.status);
            return Ok(ignore(
                Some(&order_id),
                CallbackRejection::OrderNotPending(current),
            ));
        }

        self.finish(order_id, &attempt.out_trade_no, false).await
    }

    /// Reduces stock and consumes the attempt. Both steps are idempotent, so
    /// a redelivery after a failure here picks up where it stopped.
    async fn finish(
        &self,
        order_id: OrderId,
        out_trade_no: &OutTradeNo,
        resumed: bool,
    ) -> Result<CallbackOutcome, PaymentError> {
        self.orders.reduce_stock_levels(&order_id).await?;
        self.attempts.consume(&order_id).await?;

        if resumed {
            tracing::info!(
                order_id = %order_id,
                out_trade_no = %out_trade_no,
                "Payment completion resumed"
            );
            Ok(CallbackOutcome::Resumed { order_id })
        } else {
            tracing::info!(
                order_id = %order_id,
                out_trade_no = %out_trade_no,
                "Payment completed"
            );
            Ok(CallbackOutcome::Completed { order_id })
        }
    }
}

fn ignore(order_id: Option<&OrderId>, rejection: CallbackRejection) -> CallbackOutcome {
    let order_id = order_id.map(OrderId::as_str).unwrap_or("-");
    match rejection {
        CallbackRejection::NonceMismatch
        | CallbackRejection::MissingNotificationSignature
        | CallbackRejection::InvalidNotificationSignature
        | CallbackRejection::MalformedNotification(_)
        | CallbackRejection::TradeNumberMismatch
        | CallbackRejection::StatusNotSuccess(_) => {
            tracing::warn!(order_id, reason = %rejection, "Payment callback ignored");
        }
        _ => {
            tracing::debug!(order_id, reason = %rejection, "Payment callback ignored");
        }
    }
    CallbackOutcome::Ignored(rejection)
}
