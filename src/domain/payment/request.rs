//! Gateway request model and builder.
//!
//! Requests are plain serde structs; the wire body is produced by
//! `serde_json` so order values containing quotes or control characters are
//! escaped rather than interpolated.

use reqwest::Url;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, OutTradeNo, Timestamp};
use crate::domain::order::Order;

use super::errors::PaymentError;
use super::merchant::MerchantConfig;
use super::nonce::PaymentNonce;

/// Gateway operation that creates a hosted-checkout session.
pub const ORDER_AND_PAY: &str = "orderAndPay";

/// Storefront checkout settings that shape every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Order subject shown on the hosted checkout page.
    pub subject: String,

    /// Checkout page language.
    pub language: String,

    /// Country used when the order carries no shipping country.
    pub default_country: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            subject: "Buying goods".to_string(),
            language: "ar".to_string(),
            default_country: "SA".to_string(),
        }
    }
}

/// Where the gateway sends the shopper and the asynchronous notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackUrls {
    /// Shopper-facing return URL.
    pub front_callback_url: String,

    /// Server-to-server notification URL, carrying order id and nonce.
    pub notify_url: String,
}

impl CallbackUrls {
    /// Builds the notification URL by appending `order_id` and `nonce` to
    /// the storefront's callback endpoint.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Configuration` if `notify_base` is not a URL.
    pub fn new(
        front_callback_url: impl Into<String>,
        notify_base: &str,
        order_id: &OrderId,
        nonce: &PaymentNonce,
    ) -> Result<Self, PaymentError> {
        let mut notify = Url::parse(notify_base).map_err(|e| {
            PaymentError::configuration(format!("invalid notify url '{}': {}", notify_base, e))
        })?;
        notify
            .query_pairs_mut()
            .append_pair("order_id", order_id.as_str())
            .append_pair("nonce", nonce.as_str());

        Ok(Self {
            front_callback_url: front_callback_url.into(),
            notify_url: notify.into(),
        })
    }
}

/// Business payload of an `orderAndPay` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentData {
    pub out_trade_no: OutTradeNo,
    pub subject: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub country: String,
    pub user_id: String,
    pub language: String,
    #[serde(rename = "frontCallbackURL")]
    pub front_callback_url: String,
    pub notify_url: String,
}

/// Signed envelope sent to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    /// ISO-8601 with milliseconds and offset; covered by the signature.
    pub request_time: String,
    pub merchant_app_id: String,
    pub merchant_no: String,
    pub data: PaymentData,
}

impl GatewayRequest {
    /// Serializes the envelope into the exact bytes to sign and send.
    pub fn to_body(&self) -> Result<Vec<u8>, PaymentError> {
        serde_json::to_vec(self)
            .map_err(|e| PaymentError::configuration(format!("request serialization failed: {}", e)))
    }
}

/// Assembles a [`GatewayRequest`] from an order. Pure: the caller supplies
/// the trade number and the request time.
pub struct GatewayRequestBuilder<'a> {
    merchant: &'a MerchantConfig,
    settings: &'a CheckoutSettings,
}

impl<'a> GatewayRequestBuilder<'a> {
    pub fn new(merchant: &'a MerchantConfig, settings: &'a CheckoutSettings) -> Self {
        Self { merchant, settings }
    }

    pub fn build(
        &self,
        order: &Order,
        out_trade_no: OutTradeNo,
        urls: &CallbackUrls,
        requested_at: Timestamp,
    ) -> GatewayRequest {
        let data = PaymentData {
            out_trade_no,
            subject: self.settings.subject.clone(),
            total_amount: order.total,
            currency: order.currency.clone(),
            country: order.country_or(&self.settings.default_country).to_string(),
            user_id: order.buyer_id().to_string(),
            language: self.settings.language.clone(),
            front_callback_url: urls.front_callback_url.clone(),
            notify_url: urls.notify_url.clone(),
        };

        GatewayRequest {
            request_time: requested_at.to_gateway_format(),
            merchant_app_id: self.merchant.merchant_app_id().to_string(),
            merchant_no: self.merchant.merchant_no().to_string(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::merchant::GatewayEnvironment;
    use chrono::{DateTime, Utc};

    fn merchant() -> MerchantConfig {
        MerchantConfig::new("SDP01010114", "app-3b1e", GatewayEnvironment::Sandbox).unwrap()
    }

    fn order() -> Order {
        Order::pending(
            OrderId::new("1042").unwrap(),
            "wc_order_abc",
            "100.00".parse().unwrap(),
            "USD",
        )
    }

    fn requested_at() -> Timestamp {
        Timestamp::from_datetime(
            DateTime::parse_from_rfc3339("2024-03-01T08:15:30.250Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    fn urls() -> CallbackUrls {
        CallbackUrls::new(
            "https://shop.example/checkout/order-received/1042",
            "https://shop.example/payermax/notify",
            &OrderId::new("1042").unwrap(),
            &PaymentNonce::from_stored("n0nce"),
        )
        .unwrap()
    }

    fn build(order: &Order) -> GatewayRequest {
        let merchant = merchant();
        let settings = CheckoutSettings::default();
        GatewayRequestBuilder::new(&merchant, &settings).build(
            order,
            OutTradeNo::for_attempt(&order.order_key, requested_at().as_unix_millis()).unwrap(),
            &urls(),
            requested_at(),
        )
    }

    #[test]
    fn country_defaults_to_configured_fallback() {
        let request = build(&order());

        assert_eq!(request.data.country, "SA");
        assert_eq!(request.data.currency, "USD");
        assert_eq!(request.data.total_amount.to_string(), "100.00");
    }

    #[test]
    fn shipping_country_is_used_when_present() {
        let request = build(&order().with_shipping_country("EG"));
        assert_eq!(request.data.country, "EG");
    }

    #[test]
    fn envelope_carries_merchant_ids_and_millisecond_time() {
        let request = build(&order());

        assert_eq!(request.merchant_no, "SDP01010114");
        assert_eq!(request.merchant_app_id, "app-3b1e");
        assert_eq!(request.request_time, "2024-03-01T08:15:30.250+00:00");
    }

    #[test]
    fn guest_orders_send_zero_user_id() {
        assert_eq!(build(&order()).data.user_id, "0");
        assert_eq!(build(&order().with_customer("77")).data.user_id, "77");
    }

    #[test]
    fn body_uses_gateway_field_names() {
        let body = build(&order()).to_body().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        for field in ["requestTime", "merchantAppId", "merchantNo", "data"] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
        let data = &json["data"];
        for field in [
            "outTradeNo",
            "subject",
            "totalAmount",
            "currency",
            "country",
            "userId",
            "language",
            "frontCallbackURL",
            "notifyUrl",
        ] {
            assert!(data.get(field).is_some(), "missing data.{}", field);
        }
        assert_eq!(data["totalAmount"], "100.00");
        assert_eq!(data["subject"], "Buying goods");
        assert_eq!(data["language"], "ar");
        assert_eq!(data["outTradeNo"], "wc_order_abc1709280930250");
    }

    #[test]
    fn hostile_values_are_escaped_not_interpolated() {
        let mut order = order();
        order.currency = "USD\",\"totalAmount\":\"0.01".to_string();

        let body = build(&order).to_body().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["data"]["totalAmount"], "100.00");
        assert_eq!(json["data"]["currency"], "USD\",\"totalAmount\":\"0.01");
    }

    #[test]
    fn notify_url_carries_order_and_nonce() {
        let urls = urls();
        assert_eq!(
            urls.notify_url,
            "https://shop.example/payermax/notify?order_id=1042&nonce=n0nce"
        );
    }

    #[test]
    fn notify_url_keeps_existing_query() {
        let urls = CallbackUrls::new(
            "https://shop.example/thanks",
            "https://shop.example/?wc-api=payermax",
            &OrderId::new("7").unwrap(),
            &PaymentNonce::from_stored("abc"),
        )
        .unwrap();
        assert_eq!(
            urls.notify_url,
            "https://shop.example/?wc-api=payermax&order_id=7&nonce=abc"
        );
    }

    #[test]
    fn invalid_notify_base_is_configuration_error() {
        let result = CallbackUrls::new(
            "https://shop.example/thanks",
            "not a url",
            &OrderId::new("7").unwrap(),
            &PaymentNonce::from_stored("abc"),
        );
        assert!(matches!(result, Err(PaymentError::Configuration(_))));
    }
}
