//! Axum router configuration for the PayerMax endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{payment_callback, payment_return, start_checkout, PaymentAppState};

/// Create the payment routes.
///
/// # Routes
///
/// ## Shopper Endpoints
/// - `POST /checkout/:order_id` - Start hosted checkout, returns redirect
/// - `GET /return/:order_id` - Shopper return from the checkout page
///
/// ## Gateway Endpoints (no auth, nonce verified)
/// - `GET|POST /notify` - Asynchronous payment notification
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/checkout/:order_id", post(start_checkout))
        .route("/return/:order_id", get(payment_return))
        .route("/notify", get(payment_callback).post(payment_callback))
}

/// Create the payment module router, mounted at `/payermax`.
///
/// # Example
///
/// ```ignore
/// let app = payment_router().with_state(app_state);
/// ```
pub fn payment_router() -> Router<PaymentAppState> {
    Router::new().nest("/payermax", payment_routes())
}
