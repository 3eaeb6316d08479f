//! Inbound gateway notification and the reasons one can be rejected.

use std::fmt;

use serde::Deserialize;

use crate::domain::foundation::OrderId;
use crate::domain::order::OrderStatus;

/// Status value the gateway reports for a paid order.
pub const SUCCESS: &str = "SUCCESS";

/// Why a callback was ignored. None of these are errors to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackRejection {
    MissingOrderId,
    MissingNonce,
    InvalidOrderId,
    /// No attempt is on record for the order.
    NoPendingAttempt,
    NonceMismatch,
    OrderNotFound,
    OrderNotPending(OrderStatus),
    StatusNotSuccess(String),
    /// No signed gateway notification accompanied the callback.
    MissingNotificationSignature,
    InvalidNotificationSignature,
    MalformedNotification(String),
    /// The notification names a different trade number than the attempt.
    TradeNumberMismatch,
}

impl fmt::Display for CallbackRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackRejection::MissingOrderId => f.write_str("order id missing"),
            CallbackRejection::MissingNonce => f.write_str("nonce missing"),
            CallbackRejection::InvalidOrderId => f.write_str("order id invalid"),
            CallbackRejection::NoPendingAttempt => f.write_str("no payment attempt on record"),
            CallbackRejection::NonceMismatch => f.write_str("nonce mismatch"),
            CallbackRejection::OrderNotFound => f.write_str("order not found"),
            CallbackRejection::OrderNotPending(status) => {
                write!(f, "order is {}, not pending", status)
            }
            CallbackRejection::StatusNotSuccess(status) => {
                write!(f, "reported status {} is not {}", status, SUCCESS)
            }
            CallbackRejection::MissingNotificationSignature => {
                f.write_str("notification signature missing")
            }
            CallbackRejection::InvalidNotificationSignature => {
                f.write_str("notification signature invalid")
            }
            CallbackRejection::MalformedNotification(reason) => {
                write!(f, "notification malformed: {}", reason)
            }
            CallbackRejection::TradeNumberMismatch => {
                f.write_str("notification trade number does not match the attempt")
            }
        }
    }
}

/// Raw callback parameters as they arrive on the notify URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentCallback {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Callback parameters after the presence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCallback {
    pub order_id: OrderId,
    pub nonce: String,
}

impl PaymentCallback {
    pub fn new(order_id: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            nonce: Some(nonce.into()),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Lays `other` over these parameters. Fields present in `other` win,
    /// the way posted form fields override the query string.
    pub fn overlay(self, other: PaymentCallback) -> Self {
        Self {
            order_id: other.order_id.or(self.order_id),
            nonce: other.nonce.or(self.nonce),
            status: other.status.or(self.status),
        }
    }

    /// Checks that order id and nonce are present and that any reported
    /// status is success. Blank values count as missing.
    pub fn validate(&self) -> Result<ValidatedCallback, CallbackRejection> {
        let order_id = non_blank(&self.order_id).ok_or(CallbackRejection::MissingOrderId)?;
        let nonce = non_blank(&self.nonce).ok_or(CallbackRejection::MissingNonce)?;
        let order_id = OrderId::new(order_id).map_err(|_| CallbackRejection::InvalidOrderId)?;

        if let Some(status) = non_blank(&self.status) {
            if status != SUCCESS {
                return Err(CallbackRejection::StatusNotSuccess(status.to_string()));
            }
        }

        Ok(ValidatedCallback {
            order_id,
            nonce: nonce.to_string(),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Result of processing a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The order moved from pending to completed.
    Completed { order_id: OrderId },
    /// The order was already completed by an earlier delivery whose stock
    /// reduction did not finish; the remaining steps ran now.
    Resumed { order_id: OrderId },
    /// Nothing changed.
    Ignored(CallbackRejection),
}

impl CallbackOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CallbackOutcome::Completed { .. })
    }
}
