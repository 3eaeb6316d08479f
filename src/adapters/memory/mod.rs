//! In-memory collaborator adapters for tests and local development.

mod order_store;
mod payment_attempt_store;

pub use order_store::InMemoryOrderStore;
pub use payment_attempt_store::InMemoryPaymentAttemptStore;
