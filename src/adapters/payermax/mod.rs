//! PayerMax gateway adapter.
//!
//! Implements the `PaymentGateway` port for PayerMax, including:
//! - SHA256withRSA request signing over the exact transmitted bytes
//! - Response acceptance (`APPLY_SUCCESS` plus a verified `sign` header)
//! - Notification signature verification
//!
//! # Configuration
//!
//! Key material and merchant ids come from `config::PayerMaxConfig`;
//! see `MerchantConfig` for the credential bundle.

mod client;
mod mock_gateway;

pub use client::{ClientOptions, PayerMaxClient, SignedRequest, DEFAULT_TIMEOUT, SIGN_HEADER};
pub use mock_gateway::{MockPaymentGateway, NotificationMode};
