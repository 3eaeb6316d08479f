//! In-Memory Order Store
//!
//! Holds orders and stock levels in memory. Used by tests and the
//! development binary in place of the storefront database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, StateMachine, Timestamp};
use crate::domain::order::{Order, OrderStatus};
use crate::ports::OrderRepository;

/// In-memory order repository with stock tracking.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    stock: Arc<RwLock<HashMap<String, i64>>>,
    stock_reductions: Arc<RwLock<HashMap<OrderId, u32>>>,
    unavailable: Arc<AtomicBool>,
    stock_reduction_failing: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an order.
    pub async fn insert(&self, order: Order) {
        self.orders.write().await.insert(order.id.clone(), order);
    }

    /// Set the stock level for a SKU.
    pub async fn set_stock(&self, sku: impl Into<String>, level: i64) {
        self.stock.write().await.insert(sku.into(), level);
    }

    pub async fn stock_level(&self, sku: &str) -> Option<i64> {
        self.stock.read().await.get(sku).copied()
    }

    /// How many times stock was actually reduced for an order.
    pub async fn stock_reduction_count(&self, id: &OrderId) -> u32 {
        self.stock_reductions
            .read()
            .await
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    pub async fn status_of(&self, id: &OrderId) -> Option<OrderStatus> {
        self.orders.read().await.get(id).map(|o| o.status)
    }

    /// Make every operation fail with a database error (for tests).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make only `reduce_stock_levels` fail (for tests).
    pub fn set_stock_reduction_failing(&self, failing: bool) {
        self.stock_reduction_failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::database("order store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn find(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        self.check_available()?;
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn transition_status(
        &self,
        id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
        at: Timestamp,
    ) -> Result<bool, DomainError> {
        self.check_available()?;

        if !from.can_transition_to(&to) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition from {} to {}", from, to),
            )
            .with_detail("order_id", id.as_str()));
        }

        // Compare and set under one write lock.
        let mut orders = self.orders.write().await;
        match orders.get_mut(id) {
            Some(order) if order.status == from => {
                order.status = to;
                if to == OrderStatus::Completed {
                    order.paid_at = Some(at);
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reduce_stock_levels(&self, id: &OrderId) -> Result<(), DomainError> {
        self.check_available()?;
        if self.stock_reduction_failing.load(Ordering::SeqCst) {
            return Err(DomainError::database("stock update failed"));
        }

        let items = match self.orders.read().await.get(id) {
            Some(order) => order.items.clone(),
            None => {
                return Err(DomainError::new(
                    ErrorCode::OrderNotFound,
                    format!("Order {} not found", id),
                ))
            }
        };

        // Held across the update so a reduction is applied at most once.
        let mut reductions = self.stock_reductions.write().await;
        if reductions.contains_key(id) {
            return Ok(());
        }

        let mut stock = self.stock.write().await;
        for item in &items {
            if let Some(level) = stock.get_mut(&item.sku) {
                *level -= i64::from(item.quantity);
            }
        }

        reductions.insert(id.clone(), 1);
        Ok(())
    }
}
