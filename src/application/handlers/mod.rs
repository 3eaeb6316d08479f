//! Application handlers.
//!
//! Command handlers that orchestrate domain operations over the ports.

pub mod payment;

pub use payment::{
    HandlePaymentCallbackCommand, HandlePaymentCallbackHandler, HandlePaymentReturnCommand,
    HandlePaymentReturnHandler, HandlePaymentReturnResult, PaymentRedirect, PaymentReturnOutcome,
    ProcessPaymentCommand, ProcessPaymentHandler, SignedNotification,
};
