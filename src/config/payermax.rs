//! PayerMax gateway configuration

use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::adapters::payermax::ClientOptions;
use crate::domain::payment::{
    CheckoutSettings, GatewayEnvironment, MerchantConfig, PaymentError, PrivateSigningKey,
    PublicVerifyingKey,
};

use super::error::ValidationError;

/// PayerMax merchant settings
///
/// Holds both key pairs; `is_testing` selects the sandbox pair and host.
#[derive(Debug, Clone, Deserialize)]
pub struct PayerMaxConfig {
    /// Merchant number (`merchantNo`)
    #[serde(default)]
    pub merchant_id: String,

    /// Merchant application id (`merchantAppId`)
    #[serde(default)]
    pub app_id: String,

    /// Use the sandbox host and test key pair
    #[serde(default = "default_is_testing")]
    pub is_testing: bool,

    /// Sandbox merchant private key (PEM or base64 DER)
    pub test_merchant_private_key: Option<SecretString>,

    /// Sandbox gateway public key (PEM or base64 DER)
    pub test_payermax_public_key: Option<String>,

    /// Production merchant private key
    pub merchant_private_key: Option<SecretString>,

    /// Production gateway public key
    pub payermax_public_key: Option<String>,

    /// Country sent when the order has no shipping country
    #[serde(default = "default_country")]
    pub default_country: String,

    /// Checkout page language
    #[serde(default = "default_language")]
    pub language: String,

    /// Order subject shown on the checkout page
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Outbound gateway call timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Overrides the environment host
    pub base_url: Option<String>,

    /// Public URL of this service's notify endpoint
    #[serde(default)]
    pub notify_url: String,

    /// Payment method title shown at checkout
    #[serde(default = "default_title")]
    pub title: String,

    /// Payment method description shown at checkout
    #[serde(default)]
    pub description: String,
}

impl PayerMaxConfig {
    /// Gateway environment selected by `is_testing`
    pub fn environment(&self) -> GatewayEnvironment {
        GatewayEnvironment::from_testing_flag(self.is_testing)
    }

    fn active_private_key(&self) -> Option<&SecretString> {
        if self.is_testing {
            self.test_merchant_private_key.as_ref()
        } else {
            self.merchant_private_key.as_ref()
        }
    }

    fn active_public_key(&self) -> Option<&String> {
        if self.is_testing {
            self.test_payermax_public_key.as_ref()
        } else {
            self.payermax_public_key.as_ref()
        }
    }

    /// Validate PayerMax configuration
    ///
    /// `production` additionally requires an HTTPS notify URL.
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.merchant_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYERMAX_CHECKOUT__PAYERMAX__MERCHANT_ID",
            ));
        }
        if self.app_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYERMAX_CHECKOUT__PAYERMAX__APP_ID",
            ));
        }

        let private_present = self
            .active_private_key()
            .is_some_and(|k| !k.expose_secret().trim().is_empty());
        if !private_present {
            return Err(ValidationError::MissingRequired(if self.is_testing {
                "PAYERMAX_CHECKOUT__PAYERMAX__TEST_MERCHANT_PRIVATE_KEY"
            } else {
                "PAYERMAX_CHECKOUT__PAYERMAX__MERCHANT_PRIVATE_KEY"
            }));
        }
        let public_present = self.active_public_key().is_some_and(|k| !k.trim().is_empty());
        if !public_present {
            return Err(ValidationError::MissingRequired(if self.is_testing {
                "PAYERMAX_CHECKOUT__PAYERMAX__TEST_PAYERMAX_PUBLIC_KEY"
            } else {
                "PAYERMAX_CHECKOUT__PAYERMAX__PAYERMAX_PUBLIC_KEY"
            }));
        }

        if self.request_timeout_secs == 0 || self.request_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.notify_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYERMAX_CHECKOUT__PAYERMAX__NOTIFY_URL",
            ));
        }
        let notify = Url::parse(&self.notify_url).map_err(|_| ValidationError::InvalidNotifyUrl)?;
        match notify.scheme() {
            "https" => {}
            "http" if !production => {}
            "http" => return Err(ValidationError::NotifyUrlMustBeHttps),
            _ => return Err(ValidationError::InvalidNotifyUrl),
        }

        if let Some(base) = &self.base_url {
            let base = Url::parse(base).map_err(|_| ValidationError::InvalidBaseUrl)?;
            if !matches!(base.scheme(), "http" | "https") {
                return Err(ValidationError::InvalidBaseUrl);
            }
        }

        let country = self.default_country.as_bytes();
        if country.len() != 2 || !country.iter().all(u8::is_ascii_uppercase) {
            return Err(ValidationError::InvalidCountryCode);
        }

        Ok(())
    }

    /// Build the merchant credential bundle for the selected environment.
    ///
    /// Missing keys are allowed here; operations that need them fail later
    /// with `PaymentError::Configuration`. Unparseable keys fail now.
    pub fn merchant_config(&self) -> Result<MerchantConfig, PaymentError> {
        let mut merchant = MerchantConfig::new(&self.merchant_id, &self.app_id, self.environment())?;

        if let Some(encoded) = self.active_private_key() {
            if !encoded.expose_secret().trim().is_empty() {
                merchant =
                    merchant.with_private_key(PrivateSigningKey::from_encoded(encoded.expose_secret())?);
            }
        }
        if let Some(encoded) = self.active_public_key() {
            if !encoded.trim().is_empty() {
                merchant = merchant.with_gateway_public_key(PublicVerifyingKey::from_encoded(encoded)?);
            }
        }

        Ok(merchant)
    }

    /// Request-shaping settings for the checkout
    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            subject: self.subject.clone(),
            language: self.language.clone(),
            default_country: self.default_country.clone(),
        }
    }

    /// Transport options for the gateway client
    pub fn client_options(&self) -> ClientOptions {
        let options =
            ClientOptions::default().with_timeout(Duration::from_secs(self.request_timeout_secs));
        match &self.base_url {
            Some(url) => options.with_base_url(url.clone()),
            None => options,
        }
    }
}

impl Default for PayerMaxConfig {
    fn default() -> Self {
        Self {
            merchant_id: String::new(),
            app_id: String::new(),
            is_testing: default_is_testing(),
            test_merchant_private_key: None,
            test_payermax_public_key: None,
            merchant_private_key: None,
            payermax_public_key: None,
            default_country: default_country(),
            language: default_language(),
            subject: default_subject(),
            request_timeout_secs: default_request_timeout(),
            base_url: None,
            notify_url: String::new(),
            title: default_title(),
            description: String::new(),
        }
    }
}

fn default_is_testing() -> bool {
    true
}

fn default_country() -> String {
    "SA".to_string()
}

fn default_language() -> String {
    "ar".to_string()
}

fn default_subject() -> String {
    "Buying goods".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_title() -> String {
    "PayerMax".to_string()
}
