//! Payment handlers.
//!
//! ## Commands
//! - Starting a hosted checkout (`orderAndPay`)
//! - Processing the gateway's asynchronous callback
//! - Processing the shopper's return from the checkout page

mod handle_payment_callback;
mod handle_payment_return;
mod process_payment;

pub use handle_payment_callback::{
    HandlePaymentCallbackCommand, HandlePaymentCallbackHandler, SignedNotification,
};
pub use handle_payment_return::{
    HandlePaymentReturnCommand, HandlePaymentReturnHandler, HandlePaymentReturnResult,
    PaymentReturnOutcome,
};
pub use process_payment::{PaymentRedirect, ProcessPaymentCommand, ProcessPaymentHandler};
