//! HTTP DTOs (Data Transfer Objects) for the PayerMax endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::payment::{HandlePaymentReturnResult, PaymentReturnOutcome};
use crate::domain::order::OrderStatus;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a hosted checkout for an order.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    /// URL the gateway returns the shopper to.
    pub return_url: String,
}

/// Query string of the shopper's return URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnQuery {
    #[serde(default)]
    pub status: Option<String>,
    /// Set on the single follow-up redirect after a failed payment.
    #[serde(default)]
    pub refreshed: Option<bool>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Successful checkout start, in the storefront's payment-result shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub result: String,
    pub redirect: String,
}

impl CheckoutResponse {
    pub fn success(redirect: impl Into<String>) -> Self {
        Self {
            result: "success".to_string(),
            redirect: redirect.into(),
        }
    }
}

/// Acknowledgement the gateway expects from the notify URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackAck {
    pub code: String,
    pub msg: String,
}

impl Default for CallbackAck {
    fn default() -> Self {
        Self {
            code: "SUCCESS".to_string(),
            msg: "Success.".to_string(),
        }
    }
}

/// Order state shown to the shopper after returning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnResponse {
    pub order_id: String,
    pub order_status: OrderStatus,
    pub payment_succeeded: bool,
}

impl From<HandlePaymentReturnResult> for ReturnResponse {
    fn from(result: HandlePaymentReturnResult) -> Self {
        Self {
            order_id: result.order_id.to_string(),
            order_status: result.order_status,
            payment_succeeded: result.outcome == PaymentReturnOutcome::Succeeded,
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `failure`, mirroring the checkout success shape.
    pub result: String,
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Message safe to show a shopper.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            result: "failure".to_string(),
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
