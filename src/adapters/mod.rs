//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the payment flow to external systems:
//! - `payermax` - PayerMax gateway client and a mock gateway
//! - `memory` - In-memory order and payment attempt stores
//! - `http` - Axum endpoints for checkout, notify and return

pub mod http;
pub mod memory;
pub mod payermax;

pub use memory::{InMemoryOrderStore, InMemoryPaymentAttemptStore};
pub use payermax::{ClientOptions, MockPaymentGateway, PayerMaxClient};
