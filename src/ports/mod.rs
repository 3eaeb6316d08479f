//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the payment flow and the outside world. Adapters implement these ports.
//!
//! - `OrderRepository` - Storefront orders, status compare-and-set, stock
//! - `PaymentAttemptStore` - Nonce side table keyed by order id
//! - `PaymentGateway` - Signed outbound gateway call

mod order_repository;
mod payment_attempt_store;
mod payment_gateway;

pub use order_repository::OrderRepository;
pub use payment_attempt_store::PaymentAttemptStore;
pub use payment_gateway::PaymentGateway;
