//! OrderRepository port - the storefront's order store as the payment flow
//! needs it.
//!
//! Durable storage belongs to the storefront. The payment flow only reads
//! orders, moves their status, and asks for stock to be reduced once paid.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId, Timestamp};
use crate::domain::order::{Order, OrderStatus};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Find an order by id.
    async fn find(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Atomically move an order from `from` to `to`.
    ///
    /// Returns `Ok(false)` without changing anything when the order is not
    /// currently in `from` (or does not exist). Concurrent callers racing on
    /// the same transition see exactly one `Ok(true)`. A transition to
    /// `Completed` records `at` as the paid-at time.
    async fn transition_status(
        &self,
        id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
        at: Timestamp,
    ) -> Result<bool, DomainError>;

    /// Reduce inventory for every line item of a paid order.
    ///
    /// Idempotent per order: once an order's stock has been reduced, later
    /// calls succeed without touching inventory again.
    async fn reduce_stock_levels(&self, id: &OrderId) -> Result<(), DomainError>;
}
