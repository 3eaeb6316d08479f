//! PayerMax Checkout - PayerMax payment gateway integration for a storefront.
//!
//! Builds SHA256withRSA-signed `orderAndPay` requests, accepts only signed
//! successful gateway responses, and completes orders from nonce-checked
//! asynchronous callbacks.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
