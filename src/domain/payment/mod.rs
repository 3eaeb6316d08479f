//! Payment module - signing, request building, response acceptance and
//! callback and notification validation for the PayerMax gateway.

mod callback;
mod errors;
mod merchant;
mod nonce;
mod notification;
mod request;
mod response;
pub mod signature;

pub use callback::{CallbackOutcome, CallbackRejection, PaymentCallback, ValidatedCallback, SUCCESS};
pub use errors::{PaymentError, VerificationFailure};
pub use merchant::{GatewayEnvironment, MerchantConfig};
pub use nonce::{PaymentAttempt, PaymentNonce};
pub use notification::GatewayNotification;
pub use request::{
    CallbackUrls, CheckoutSettings, GatewayRequest, GatewayRequestBuilder, PaymentData,
    ORDER_AND_PAY,
};
pub use response::{accept, GatewayResponse, APPLY_SUCCESS};
pub use signature::{PrivateSigningKey, PublicVerifyingKey};
