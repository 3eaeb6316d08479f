//! In-Memory Payment Attempt Store
//!
//! Side table of the latest payment attempt per order.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::payment::PaymentAttempt;
use crate::ports::PaymentAttemptStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentAttemptStore {
    attempts: Arc<RwLock<HashMap<OrderId, PaymentAttempt>>>,
}

impl InMemoryPaymentAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.attempts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.attempts.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentAttemptStore for InMemoryPaymentAttemptStore {
    async fn record(&self, attempt: PaymentAttempt) -> Result<(), DomainError> {
        self.attempts
            .write()
            .await
            .insert(attempt.order_id.clone(), attempt);
        Ok(())
    }

    async fn find(&self, order_id: &OrderId) -> Result<Option<PaymentAttempt>, DomainError> {
        Ok(self.attempts.read().await.get(order_id).cloned())
    }

    async fn consume(&self, order_id: &OrderId) -> Result<(), DomainError> {
        self.attempts.write().await.remove(order_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{OutTradeNo, Timestamp};
    use crate::domain::payment::PaymentNonce;

    fn attempt(nonce: &str) -> PaymentAttempt {
        PaymentAttempt::new(
            OrderId::new("1042").unwrap(),
            OutTradeNo::new(format!("wc_order_abc{}", nonce)).unwrap(),
            PaymentNonce::from_stored(nonce),
            Timestamp::now(),
        )
    }

    #[tokio::test]
    async fn newer_attempt_replaces_older() {
        let store = InMemoryPaymentAttemptStore::new();
        store.record(attempt("first")).await.unwrap();
        store.record(attempt("second")).await.unwrap();

        let found = store
            .find(&OrderId::new("1042").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(found.nonce.matches("second"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn consume_removes_and_tolerates_missing() {
        let store = InMemoryPaymentAttemptStore::new();
        let id = OrderId::new("1042").unwrap();
        store.record(attempt("n")).await.unwrap();

        store.consume(&id).await.unwrap();
        store.consume(&id).await.unwrap();

        assert!(store.find(&id).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
