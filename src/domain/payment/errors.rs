//! Payment error taxonomy.
//!
//! Separates misconfiguration, network failure, unauthenticated gateway
//! responses and malformed callbacks so callers never confuse one for another.

use std::fmt;

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, OrderId};

use super::callback::CallbackRejection;

/// Why a gateway response was not accepted as authentic success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    /// Response body is not the expected JSON envelope.
    MalformedBody(String),

    /// Response authenticated (or not) but reports a non-success code.
    StatusNotSuccess { code: String },

    /// Response carried no `sign` header.
    MissingSignature,

    /// `sign` header did not verify against the gateway public key.
    InvalidSignature,

    /// Success response without a redirect URL.
    MissingRedirectUrl,
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationFailure::MalformedBody(reason) => write!(f, "malformed body: {}", reason),
            VerificationFailure::StatusNotSuccess { code } => {
                write!(f, "gateway returned code {}", code)
            }
            VerificationFailure::MissingSignature => f.write_str("missing sign header"),
            VerificationFailure::InvalidSignature => f.write_str("invalid signature"),
            VerificationFailure::MissingRedirectUrl => f.write_str("missing redirect url"),
        }
    }
}

/// Errors from payment initiation and callback processing.
#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    /// Key material or merchant settings missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network failure, timeout, or non-2xx HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Gateway response was not authentic success. Carries the raw body.
    #[error("Verification failed ({failure}): {body}")]
    Verification {
        failure: VerificationFailure,
        body: String,
    },

    /// Inbound callback failed validation.
    #[error("Invalid callback: {0}")]
    Validation(CallbackRejection),

    /// The storefront has no such order.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A collaborator store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PaymentError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        PaymentError::Configuration(message.into())
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        PaymentError::Transport(message.into())
    }

    /// Create a verification error carrying the raw response body.
    pub fn verification(failure: VerificationFailure, body: impl Into<String>) -> Self {
        PaymentError::Verification {
            failure,
            body: body.into(),
        }
    }

    /// Maps the error to an HTTP status code for the storefront surface.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::Configuration(_) | PaymentError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PaymentError::Transport(_) | PaymentError::Verification { .. } => {
                StatusCode::BAD_GATEWAY
            }
            PaymentError::Validation(_) => StatusCode::BAD_REQUEST,
            PaymentError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message safe to show a shopper. Never includes gateway bodies or keys.
    pub fn shopper_message(&self) -> &'static str {
        match self {
            PaymentError::OrderNotFound(_) => "Order not found.",
            _ => "Payment could not be initiated. Please try again or choose another method.",
        }
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        PaymentError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn configuration_error_displays_message() {
        let err = PaymentError::configuration("merchant private key is not configured");
        assert_eq!(
            err.to_string(),
            "Configuration error: merchant private key is not configured"
        );
    }

    #[test]
    fn verification_error_includes_raw_body() {
        let body = r#"{"code":"APPLY_FAIL"}"#;
        let err = PaymentError::verification(
            VerificationFailure::StatusNotSuccess {
                code: "APPLY_FAIL".to_string(),
            },
            body,
        );
        let text = err.to_string();
        assert!(text.contains("gateway returned code APPLY_FAIL"));
        assert!(text.contains(body));
    }

    #[test]
    fn kinds_are_distinguishable() {
        let config = PaymentError::configuration("x");
        let transport = PaymentError::transport("x");
        let verification = PaymentError::verification(VerificationFailure::InvalidSignature, "x");

        assert!(matches!(config, PaymentError::Configuration(_)));
        assert!(matches!(transport, PaymentError::Transport(_)));
        assert!(matches!(verification, PaymentError::Verification { .. }));
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            PaymentError::configuration("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(PaymentError::transport("x").status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            PaymentError::verification(VerificationFailure::MissingSignature, "").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            PaymentError::Validation(CallbackRejection::MissingNonce).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PaymentError::OrderNotFound(OrderId::new("1").unwrap()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn shopper_message_hides_details() {
        let err = PaymentError::verification(
            VerificationFailure::InvalidSignature,
            "secret gateway body",
        );
        assert!(!err.shopper_message().contains("secret"));
    }

    #[test]
    fn domain_error_becomes_storage_error() {
        let err: PaymentError = DomainError::new(ErrorCode::DatabaseError, "down").into();
        assert!(matches!(err, PaymentError::Storage(msg) if msg.contains("down")));
    }
}
