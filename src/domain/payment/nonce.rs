//! Per-attempt nonce and the payment attempt record that holds it.

use std::fmt;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::domain::foundation::{OrderId, OutTradeNo, Timestamp};

/// Random token binding a notification URL to one payment attempt.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentNonce(String);

impl PaymentNonce {
    pub const LEN: usize = 32;

    /// Generates a fresh alphanumeric nonce from the thread RNG.
    pub fn generate() -> Self {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::LEN)
            .map(char::from)
            .collect();
        Self(value)
    }

    /// Wraps a nonce read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against a presented nonce.
    pub fn matches(&self, presented: &str) -> bool {
        self.0.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl fmt::Debug for PaymentNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PaymentNonce([REDACTED])")
    }
}

/// One initiation of payment for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAttempt {
    pub order_id: OrderId,
    pub out_trade_no: OutTradeNo,
    pub nonce: PaymentNonce,
    pub created_at: Timestamp,
}

impl PaymentAttempt {
    pub fn new(
        order_id: OrderId,
        out_trade_no: OutTradeNo,
        nonce: PaymentNonce,
        created_at: Timestamp,
    ) -> Self {
        Self {
            order_id,
            out_trade_no,
            nonce,
            created_at,
        }
    }
}
