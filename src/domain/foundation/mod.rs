//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state machine trait and error
//! types used by the order and payment modules.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{OrderId, OutTradeNo};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
