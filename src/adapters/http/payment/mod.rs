//! HTTP adapter for the PayerMax checkout, notify and return endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{CallbackAck, CheckoutRequest, CheckoutResponse, ErrorResponse, ReturnQuery, ReturnResponse};
pub use handlers::{PaymentApiError, PaymentAppState};
pub use routes::{payment_router, payment_routes};
