//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    HandlePaymentCallbackCommand, HandlePaymentCallbackHandler, HandlePaymentReturnCommand,
    HandlePaymentReturnHandler, HandlePaymentReturnResult, PaymentRedirect, PaymentReturnOutcome,
    ProcessPaymentCommand, ProcessPaymentHandler, SignedNotification,
};
