//! PaymentAttemptStore port - side table of payment attempts keyed by order.
//!
//! An attempt is written when payment is initiated and read back when the
//! gateway calls the notify URL. A newer attempt replaces an older one, so
//! only the latest nonce for an order is honoured.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::payment::PaymentAttempt;

#[async_trait]
pub trait PaymentAttemptStore: Send + Sync {
    /// Store an attempt, replacing any previous attempt for the same order.
    async fn record(&self, attempt: PaymentAttempt) -> Result<(), DomainError>;

    /// Latest attempt for an order.
    async fn find(&self, order_id: &OrderId) -> Result<Option<PaymentAttempt>, DomainError>;

    /// Remove the attempt once the order is paid. Missing is not an error.
    async fn consume(&self, order_id: &OrderId) -> Result<(), DomainError>;
}
