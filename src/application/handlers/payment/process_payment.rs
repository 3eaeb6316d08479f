//! ProcessPaymentHandler - Command handler for starting a PayerMax checkout.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, OutTradeNo, Timestamp};
use crate::domain::payment::{
    CallbackRejection, CallbackUrls, CheckoutSettings, GatewayRequestBuilder, MerchantConfig,
    PaymentAttempt, PaymentError, PaymentNonce, VerificationFailure, ORDER_AND_PAY,
};
use crate::ports::{OrderRepository, PaymentAttemptStore, PaymentGateway};

/// Command to start payment for an order.
#[derive(Debug, Clone)]
pub struct ProcessPaymentCommand {
    pub order_id: OrderId,
    /// Where the gateway sends the shopper afterwards.
    pub return_url: String,
}

/// Hosted-checkout redirect for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRedirect {
    pub redirect_url: String,
    pub out_trade_no: OutTradeNo,
}

/// Handler for starting payment.
///
/// Mints a nonce and trade number, records the attempt, then sends a signed
/// `orderAndPay` request. Never changes the order; on any error the shopper
/// simply stays on the checkout page.
pub struct ProcessPaymentHandler {
    orders: Arc<dyn OrderRepository>,
    attempts: Arc<dyn PaymentAttemptStore>,
    gateway: Arc<dyn PaymentGateway>,
    merchant: Arc<MerchantConfig>,
    settings: CheckoutSettings,
    notify_url: String,
}

impl ProcessPaymentHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        attempts: Arc<dyn PaymentAttemptStore>,
        gateway: Arc<dyn PaymentGateway>,
        merchant: Arc<MerchantConfig>,
        settings: CheckoutSettings,
        notify_url: impl Into<String>,
    ) -> Self {
        Self {
            orders,
            attempts,
            gateway,
            merchant,
            settings,
            notify_url: notify_url.into(),
        }
    }

    pub async fn handle(&self, cmd: ProcessPaymentCommand) -> Result<PaymentRedirect, PaymentError> {
        // 1. Load the order
        let order = self
            .orders
            .find(&cmd.order_id)
            .await?
            .ok_or_else(|| PaymentError::OrderNotFound(cmd.order_id.clone()))?;

        if !order.status.is_awaiting_payment() {
            return Err(PaymentError::Validation(CallbackRejection::OrderNotPending(
                order.status,
            )));
        }

        // 2. Mint attempt identifiers
        let now = Timestamp::now();
        let nonce = PaymentNonce::generate();
        let out_trade_no = OutTradeNo::for_attempt(&order.order_key, now.as_unix_millis())
            .map_err(|e| PaymentError::configuration(format!("order key unusable: {}", e)))?;
        let urls = CallbackUrls::new(cmd.return_url, &self.notify_url, &order.id, &nonce)?;

        // 3. Record the attempt before the gateway can call back
        self.attempts
            .record(PaymentAttempt::new(
                order.id.clone(),
                out_trade_no.clone(),
                nonce,
                now,
            ))
            .await?;

        // 4. Build and send the signed request
        let request = GatewayRequestBuilder::new(&self.merchant, &self.settings).build(
            &order,
            out_trade_no.clone(),
            &urls,
            now,
        );

        let response = match self.gateway.send(ORDER_AND_PAY, &request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    order_id = %order.id,
                    out_trade_no = %out_trade_no,
                    error = %err,
                    "Payment initiation failed"
                );
                return Err(err);
            }
        };

        let redirect_url = response
            .redirect_url()
            .map(str::to_owned)
            .ok_or_else(|| {
                PaymentError::verification(VerificationFailure::MissingRedirectUrl, response.msg.clone())
            })?;

        tracing::info!(
            order_id = %order.id,
            out_trade_no = %out_trade_no,
            "Payment initiated"
        );

        Ok(PaymentRedirect {
            redirect_url,
            out_trade_no,
        })
    }
}
