//! PaymentGateway port - the outbound call to the payment gateway and
//! verification of what the gateway sends back.

use async_trait::async_trait;

use crate::domain::payment::{GatewayRequest, GatewayResponse, PaymentError};

/// Sends a signed request to a gateway operation.
///
/// Implementations sign the exact bytes they transmit and only return a
/// response that passed signature verification and reported success.
/// They make a single attempt; retries are the caller's decision.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn send(
        &self,
        operation: &str,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse, PaymentError>;

    /// Fails with `PaymentError::Configuration` when no gateway public key is
    /// available. Callers check this before trusting any inbound callback.
    fn require_verification_key(&self) -> Result<(), PaymentError>;

    /// Verifies a signed asynchronous notification body.
    ///
    /// Returns `Ok(false)` for a signature that does not verify and
    /// `PaymentError::Configuration` when no gateway key is available.
    fn verify_notification(&self, body: &[u8], signature: &str) -> Result<bool, PaymentError>;
}
