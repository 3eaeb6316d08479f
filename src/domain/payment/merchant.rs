//! Merchant credentials and gateway environment selection.

use serde::{Deserialize, Serialize};

use super::errors::PaymentError;
use super::signature::{PrivateSigningKey, PublicVerifyingKey};

/// Gateway environment. Selects the endpoint host and which key pair the
/// storefront configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayEnvironment {
    /// UAT environment with test credentials.
    Sandbox,
    /// Live environment.
    Production,
}

impl GatewayEnvironment {
    /// Selects the environment from the storefront's test-mode flag.
    pub fn from_testing_flag(is_testing: bool) -> Self {
        if is_testing {
            GatewayEnvironment::Sandbox
        } else {
            GatewayEnvironment::Production
        }
    }

    /// Gateway host for this environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            GatewayEnvironment::Sandbox => "https://pay-gate-uat.payermax.com",
            GatewayEnvironment::Production => "https://pay-gate.payermax.com",
        }
    }
}

/// Credential bundle identifying the storefront to the gateway.
///
/// Immutable once built. Key material is optional at construction so that a
/// partially configured storefront can still boot; any operation needing an
/// absent key fails with `PaymentError::Configuration`.
#[derive(Debug, Clone)]
pub struct MerchantConfig {
    merchant_no: String,
    merchant_app_id: String,
    merchant_private_key: Option<PrivateSigningKey>,
    gateway_public_key: Option<PublicVerifyingKey>,
    environment: GatewayEnvironment,
}

impl MerchantConfig {
    /// Creates a merchant config without key material.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Configuration` if either identifier is blank.
    pub fn new(
        merchant_no: impl Into<String>,
        merchant_app_id: impl Into<String>,
        environment: GatewayEnvironment,
    ) -> Result<Self, PaymentError> {
        let merchant_no = merchant_no.into();
        let merchant_app_id = merchant_app_id.into();

        if merchant_no.trim().is_empty() {
            return Err(PaymentError::configuration("merchant number is not configured"));
        }
        if merchant_app_id.trim().is_empty() {
            return Err(PaymentError::configuration(
                "merchant app id is not configured",
            ));
        }

        Ok(Self {
            merchant_no,
            merchant_app_id,
            merchant_private_key: None,
            gateway_public_key: None,
            environment,
        })
    }

    /// Sets the key used to sign outbound requests.
    pub fn with_private_key(mut self, key: PrivateSigningKey) -> Self {
        self.merchant_private_key = Some(key);
        self
    }

    /// Sets the key used to verify gateway responses and notifications.
    pub fn with_gateway_public_key(mut self, key: PublicVerifyingKey) -> Self {
        self.gateway_public_key = Some(key);
        self
    }

    pub fn merchant_no(&self) -> &str {
        &self.merchant_no
    }

    pub fn merchant_app_id(&self) -> &str {
        &self.merchant_app_id
    }

    pub fn environment(&self) -> GatewayEnvironment {
        self.environment
    }

    /// Returns the merchant signing key, or a configuration error.
    pub fn signing_key(&self) -> Result<&PrivateSigningKey, PaymentError> {
        self.merchant_private_key
            .as_ref()
            .ok_or_else(|| PaymentError::configuration("merchant private key is not configured"))
    }

    /// Returns the gateway verification key, or a configuration error.
    pub fn gateway_key(&self) -> Result<&PublicVerifyingKey, PaymentError> {
        self.gateway_public_key
            .as_ref()
            .ok_or_else(|| PaymentError::configuration("gateway public key is not configured"))
    }

    /// True when both keys are present.
    pub fn has_key_material(&self) -> bool {
        self.merchant_private_key.is_some() && self.gateway_public_key.is_some()
    }
}
