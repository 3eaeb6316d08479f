//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `order` - The storefront order and its status state machine
//! - `payment` - Signing, gateway request and response, callback validation

pub mod foundation;
pub mod order;
pub mod payment;
