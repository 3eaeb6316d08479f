//! Mock payment gateway for testing.
//!
//! Provides a configurable `PaymentGateway` for unit tests and the
//! development binary. Supports:
//! - Pre-configured redirect URLs
//! - Error injection
//! - Request capture
//! - Notification verification outcomes

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::domain::payment::{GatewayRequest, GatewayResponse, PaymentError, APPLY_SUCCESS};
use crate::ports::PaymentGateway;

/// Mock gateway that answers every `send` with a hosted-checkout redirect.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentGateway::redirecting_to("https://pay.example/x");
/// mock.set_error(PaymentError::transport("timed out"));
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    redirect_url: Option<String>,
    next_error: Option<PaymentError>,
    requests: Vec<(String, GatewayRequest)>,
    notification_mode: NotificationMode,
}

/// How to answer `verify_notification`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NotificationMode {
    #[default]
    AcceptAll,
    RejectAll,
    /// Behave as if no gateway key were configured.
    Unconfigured,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that answers with the given redirect URL.
    pub fn redirecting_to(url: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().redirect_url = Some(url.into());
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set an error to return on the next `send`.
    pub fn set_error(&self, error: PaymentError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    pub fn set_notification_mode(&self, mode: NotificationMode) {
        self.inner.lock().unwrap().notification_mode = mode;
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Requests received so far, with their operation names.
    pub fn requests(&self) -> Vec<(String, GatewayRequest)> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn send_count(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn send(
        &self,
        operation: &str,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse, PaymentError> {
        let mut state = self.inner.lock().unwrap();
        state
            .requests
            .push((operation.to_string(), request.clone()));

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        let redirect_url = state.redirect_url.clone().unwrap_or_else(|| {
            format!("https://mock.payermax.local/checkout/{}", request.data.out_trade_no)
        });

        Ok(GatewayResponse {
            code: APPLY_SUCCESS.to_string(),
            msg: "Success.".to_string(),
            data: json!({
                "outTradeNo": request.data.out_trade_no,
                "redirectUrl": redirect_url,
            }),
        })
    }

    fn require_verification_key(&self) -> Result<(), PaymentError> {
        match self.inner.lock().unwrap().notification_mode {
            NotificationMode::Unconfigured => Err(PaymentError::configuration(
                "gateway public key is not configured",
            )),
            _ => Ok(()),
        }
    }

    fn verify_notification(&self, _body: &[u8], _signature: &str) -> Result<bool, PaymentError> {
        match self.inner.lock().unwrap().notification_mode {
            NotificationMode::AcceptAll => Ok(true),
            NotificationMode::RejectAll => Ok(false),
            NotificationMode::Unconfigured => Err(PaymentError::configuration(
                "gateway public key is not configured",
            )),
        }
    }
}
