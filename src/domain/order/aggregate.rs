//! Storefront order as seen by the payment module.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, Timestamp};

use super::OrderStatus;

/// Buyer id the gateway receives for guest checkouts.
pub const GUEST_CUSTOMER_ID: &str = "0";

/// A purchased line on the order, used for stock adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product SKU.
    pub sku: String,

    /// Units purchased.
    pub quantity: u32,
}

impl LineItem {
    pub fn new(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity,
        }
    }
}

/// Order snapshot supplied by the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Storefront order id.
    pub id: OrderId,

    /// Storefront order key (stable per order, used to derive trade numbers).
    pub order_key: String,

    /// Order total in major units.
    pub total: Decimal,

    /// ISO-4217 currency code.
    pub currency: String,

    /// ISO-3166 alpha-2 shipping country, if the order ships anywhere.
    pub shipping_country: Option<String>,

    /// Storefront customer id; `None` for guest checkout.
    pub customer_id: Option<String>,

    /// Current lifecycle status.
    pub status: OrderStatus,

    /// Purchased lines.
    #[serde(default)]
    pub items: Vec<LineItem>,

    /// When the order was marked paid.
    pub paid_at: Option<Timestamp>,
}

impl Order {
    /// Creates a pending order with no line items.
    pub fn pending(
        id: OrderId,
        order_key: impl Into<String>,
        total: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id,
            order_key: order_key.into(),
            total,
            currency: currency.into(),
            shipping_country: None,
            customer_id: None,
            status: OrderStatus::Pending,
            items: Vec::new(),
            paid_at: None,
        }
    }

    pub fn with_shipping_country(mut self, country: impl Into<String>) -> Self {
        self.shipping_country = Some(country.into());
        self
    }

    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    /// Shipping country, or `fallback` when the order carries none.
    pub fn country_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.shipping_country.as_deref().map(str::trim) {
            Some(country) if !country.is_empty() => country,
            _ => fallback,
        }
    }

    /// Buyer id reported to the gateway.
    pub fn buyer_id(&self) -> &str {
        self.customer_id.as_deref().unwrap_or(GUEST_CUSTOMER_ID)
    }
}
