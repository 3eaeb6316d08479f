//! Gateway response envelope and the acceptance rule for it.

use serde::Deserialize;

use super::errors::{PaymentError, VerificationFailure};
use super::signature::PublicVerifyingKey;

/// Code the gateway returns when a checkout session was created.
pub const APPLY_SUCCESS: &str = "APPLY_SUCCESS";

/// Parsed gateway response. Only constructed through [`accept`], so holding
/// one means the body was authentic and successful.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayResponse {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl GatewayResponse {
    /// Hosted-checkout URL from `data.redirectUrl`.
    pub fn redirect_url(&self) -> Option<&str> {
        self.data
            .get("redirectUrl")
            .and_then(|v| v.as_str())
            .filter(|url| !url.is_empty())
    }
}

/// Accepts a response only when it reports `APPLY_SUCCESS` and its `sign`
/// header verifies over the exact raw bytes received.
///
/// Signature is checked before the code so that an unauthenticated body is
/// never reported as a gateway decision.
pub fn accept(
    raw_body: &[u8],
    sign_header: Option<&str>,
    key: &PublicVerifyingKey,
) -> Result<GatewayResponse, PaymentError> {
    let body_text = String::from_utf8_lossy(raw_body).into_owned();

    let signature = match sign_header.map(str::trim).filter(|s| !s.is_empty()) {
        Some(signature) => signature,
        None => {
            return Err(PaymentError::verification(
                VerificationFailure::MissingSignature,
                body_text,
            ))
        }
    };
    if !key.verify(raw_body, signature) {
        return Err(PaymentError::verification(
            VerificationFailure::InvalidSignature,
            body_text,
        ));
    }

    let response: GatewayResponse = serde_json::from_slice(raw_body).map_err(|e| {
        PaymentError::verification(VerificationFailure::MalformedBody(e.to_string()), &body_text)
    })?;

    if response.code != APPLY_SUCCESS {
        return Err(PaymentError::verification(
            VerificationFailure::StatusNotSuccess {
                code: response.code,
            },
            body_text,
        ));
    }
    if response.redirect_url().is_none() {
        return Err(PaymentError::verification(
            VerificationFailure::MissingRedirectUrl,
            body_text,
        ));
    }

    Ok(response)
}
