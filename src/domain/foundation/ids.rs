//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Storefront order identifier.
///
/// The storefront owns the format; we only require it to be non-empty and
/// free of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Creates a new OrderId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("order_id"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Merchant-side trade number sent to the gateway as `outTradeNo`.
///
/// One is minted per payment attempt and echoed back by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutTradeNo(String);

impl OutTradeNo {
    /// Upper bound the gateway accepts for `outTradeNo`.
    pub const MAX_LEN: usize = 64;

    /// Wraps an existing trade number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::empty_field("out_trade_no"));
        }
        if value.len() > Self::MAX_LEN {
            return Err(ValidationError::invalid_format(
                "out_trade_no",
                format!("longer than {} characters", Self::MAX_LEN),
            ));
        }
        Ok(Self(value))
    }

    /// Derives the trade number for an attempt from the order key and the
    /// attempt time in Unix milliseconds.
    pub fn for_attempt(order_key: &str, attempt_millis: i64) -> Result<Self, ValidationError> {
        Self::new(format!("{}{}", order_key, attempt_millis))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutTradeNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
