//! PayerMax gateway client.
//!
//! Implements the `PaymentGateway` port over HTTPS.
//!
//! # Security
//!
//! - Request bodies are serialized once; the signed bytes are the sent bytes
//! - Responses are verified over the raw bytes before they are parsed
//! - Keys and signatures are never logged

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::domain::payment::{
    self, GatewayRequest, GatewayResponse, MerchantConfig, PaymentError,
};
use crate::ports::PaymentGateway;

/// Header carrying the detached signature in both directions.
pub const SIGN_HEADER: &str = "sign";

/// Path prefix shared by all gateway operations.
const GATEWAY_PATH: &str = "/aggregate-pay/api/gateway";

/// Default bound on a single gateway call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Transport options for [`PayerMaxClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Bound on the whole request, connect to last body byte.
    pub timeout: Duration,

    /// Overrides the environment host (for tests and proxies).
    pub base_url: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            base_url: None,
        }
    }
}

impl ClientOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

/// A request body together with its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub body: Vec<u8>,
    pub signature: String,
}

/// PayerMax gateway client. Owns its merchant credentials and one
/// connection-pooling `reqwest::Client` reused across calls.
pub struct PayerMaxClient {
    merchant: Arc<MerchantConfig>,
    http_client: reqwest::Client,
    base_url: String,
}

impl PayerMaxClient {
    /// Create a client for the merchant's environment.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Configuration` if the HTTP client cannot be built.
    pub fn new(merchant: Arc<MerchantConfig>, options: ClientOptions) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| PaymentError::configuration(format!("http client: {}", e)))?;

        let base_url = options
            .base_url
            .unwrap_or_else(|| merchant.environment().base_url().to_string());

        Ok(Self {
            merchant,
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn merchant(&self) -> &MerchantConfig {
        &self.merchant
    }

    /// Full URL of a gateway operation.
    pub fn operation_url(&self, operation: &str) -> String {
        format!("{}{}/{}", self.base_url, GATEWAY_PATH, operation)
    }

    /// Serializes and signs a request. The returned body is exactly what
    /// [`PaymentGateway::send`] transmits.
    pub fn prepare(&self, request: &GatewayRequest) -> Result<SignedRequest, PaymentError> {
        let key = self.merchant.signing_key()?;
        let body = request.to_body()?;
        let signature = payment::signature::sign(&body, key)?;
        Ok(SignedRequest { body, signature })
    }
}

#[async_trait]
impl PaymentGateway for PayerMaxClient {
    async fn send(
        &self,
        operation: &str,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse, PaymentError> {
        // Both keys are checked before any network traffic.
        let gateway_key = self.merchant.gateway_key()?;
        let signed = self.prepare(request)?;
        let url = self.operation_url(operation);

        tracing::debug!(
            operation,
            out_trade_no = %request.data.out_trade_no,
            "Sending PayerMax request"
        );

        let response = self
            .http_client
            .post(&url)
            .header(SIGN_HEADER, signed.signature.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(signed.body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::warn!(operation, "PayerMax request timed out");
                    PaymentError::transport(format!("request to {} timed out", operation))
                } else {
                    tracing::warn!(operation, error = %e, "PayerMax request failed");
                    PaymentError::transport(e.to_string())
                }
            })?;

        let status = response.status();
        let sign_header = response
            .headers()
            .get(SIGN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let raw_body = response
            .bytes()
            .await
            .map_err(|e| PaymentError::transport(format!("reading response body: {}", e)))?;

        if !status.is_success() {
            tracing::error!(operation, status = status.as_u16(), "PayerMax returned HTTP error");
            return Err(PaymentError::transport(format!(
                "HTTP {}: {}",
                status.as_u16(),
                String::from_utf8_lossy(&raw_body)
            )));
        }

        match payment::accept(&raw_body, sign_header.as_deref(), gateway_key) {
            Ok(accepted) => {
                tracing::info!(
                    operation,
                    status = status.as_u16(),
                    code = %accepted.code,
                    "PayerMax request accepted"
                );
                Ok(accepted)
            }
            Err(err) => {
                tracing::warn!(
                    operation,
                    status = status.as_u16(),
                    error = %err,
                    "PayerMax response rejected"
                );
                Err(err)
            }
        }
    }

    fn require_verification_key(&self) -> Result<(), PaymentError> {
        self.merchant.gateway_key().map(|_| ())
    }

    fn verify_notification(&self, body: &[u8], signature: &str) -> Result<bool, PaymentError> {
        let key = self.merchant.gateway_key()?;
        Ok(key.verify(body, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{OrderId, OutTradeNo, Timestamp};
    use crate::domain::order::Order;
    use crate::domain::payment::signature::test_keys;
    use crate::domain::payment::{
        CallbackUrls, CheckoutSettings, GatewayEnvironment, GatewayRequestBuilder, PaymentNonce,
        ORDER_AND_PAY,
    };

    fn merchant(environment: GatewayEnvironment) -> MerchantConfig {
        MerchantConfig::new("SDP01010114", "app-3b1e", environment)
            .unwrap()
            .with_private_key(test_keys::merchant_private())
            .with_gateway_public_key(test_keys::gateway_public())
    }

    fn request(merchant: &MerchantConfig) -> GatewayRequest {
        let order = Order::pending(
            OrderId::new("1042").unwrap(),
            "wc_order_abc",
            "100.00".parse().unwrap(),
            "USD",
        );
        let urls = CallbackUrls::new(
            "https://shop.example/thanks",
            "https://shop.example/payermax/notify",
            &order.id,
            &PaymentNonce::from_stored("n0nce"),
        )
        .unwrap();
        let settings = CheckoutSettings::default();
        GatewayRequestBuilder::new(merchant, &settings).build(
            &order,
            OutTradeNo::new("wc_order_abc1").unwrap(),
            &urls,
            Timestamp::now(),
        )
    }

    #[test]
    fn operation_url_uses_environment_host() {
        let sandbox = PayerMaxClient::new(
            Arc::new(merchant(GatewayEnvironment::Sandbox)),
            ClientOptions::default(),
        )
        .unwrap();
        let production = PayerMaxClient::new(
            Arc::new(merchant(GatewayEnvironment::Production)),
            ClientOptions::default(),
        )
        .unwrap();

        assert_eq!(
            sandbox.operation_url(ORDER_AND_PAY),
            "https://pay-gate-uat.payermax.com/aggregate-pay/api/gateway/orderAndPay"
        );
        assert_eq!(
            production.operation_url(ORDER_AND_PAY),
            "https://pay-gate.payermax.com/aggregate-pay/api/gateway/orderAndPay"
        );
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let client = PayerMaxClient::new(
            Arc::new(merchant(GatewayEnvironment::Sandbox)),
            ClientOptions::default().with_base_url("http://127.0.0.1:9000/"),
        )
        .unwrap();
        assert_eq!(
            client.operation_url("orderAndPay"),
            "http://127.0.0.1:9000/aggregate-pay/api/gateway/orderAndPay"
        );
    }

    #[test]
    fn prepared_signature_covers_prepared_body() {
        let merchant = merchant(GatewayEnvironment::Sandbox);
        let request = request(&merchant);
        let client = PayerMaxClient::new(Arc::new(merchant), ClientOptions::default()).unwrap();

        let signed = client.prepare(&request).unwrap();

        assert_eq!(signed.body, request.to_body().unwrap());
        assert!(test_keys::merchant_public().verify(&signed.body, &signed.signature));
    }

    #[test]
    fn prepare_without_private_key_is_configuration_error() {
        let merchant = MerchantConfig::new("SDP01", "app", GatewayEnvironment::Sandbox).unwrap();
        let request = request(&merchant);
        let client = PayerMaxClient::new(Arc::new(merchant), ClientOptions::default()).unwrap();

        assert!(matches!(
            client.prepare(&request),
            Err(PaymentError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn send_without_gateway_key_fails_before_network() {
        let merchant = MerchantConfig::new("SDP01", "app", GatewayEnvironment::Sandbox)
            .unwrap()
            .with_private_key(test_keys::merchant_private());
        let request = request(&merchant);
        // Unroutable base URL: reaching the network would surface as Transport.
        let client = PayerMaxClient::new(
            Arc::new(merchant),
            ClientOptions::default().with_base_url("http://0.0.0.0:1"),
        )
        .unwrap();

        let result = client.send(ORDER_AND_PAY, &request).await;
        assert!(matches!(result, Err(PaymentError::Configuration(_))));
    }

    #[test]
    fn notification_verification_uses_gateway_key() {
        let client = PayerMaxClient::new(
            Arc::new(merchant(GatewayEnvironment::Sandbox)),
            ClientOptions::default(),
        )
        .unwrap();
        let body = br#"{"outTradeNo":"wc_order_abc1","status":"SUCCESS"}"#;
        let good = test_keys::gateway_private().sign(body).unwrap();
        let forged = test_keys::merchant_private().sign(body).unwrap();

        assert!(client.verify_notification(body, &good).unwrap());
        assert!(!client.verify_notification(body, &forged).unwrap());
    }

    #[test]
    fn verification_key_is_required() {
        let keyless = PayerMaxClient::new(
            Arc::new(MerchantConfig::new("SDP01", "app", GatewayEnvironment::Sandbox).unwrap()),
            ClientOptions::default(),
        )
        .unwrap();
        let configured = PayerMaxClient::new(
            Arc::new(merchant(GatewayEnvironment::Sandbox)),
            ClientOptions::default(),
        )
        .unwrap();

        assert!(matches!(
            keyless.require_verification_key(),
            Err(PaymentError::Configuration(_))
        ));
        assert!(configured.require_verification_key().is_ok());
    }
}
