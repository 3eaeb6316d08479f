//! HTTP handlers for the PayerMax endpoints.
//!
//! These handlers connect Axum routes to the payment command handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, OriginalUri, Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};

use crate::adapters::payermax::SIGN_HEADER;
use crate::application::handlers::payment::{
    HandlePaymentCallbackCommand, HandlePaymentCallbackHandler, HandlePaymentReturnCommand,
    HandlePaymentReturnHandler, ProcessPaymentCommand, ProcessPaymentHandler, SignedNotification,
};
use crate::domain::foundation::OrderId;
use crate::domain::payment::{
    CallbackRejection, CheckoutSettings, MerchantConfig, PaymentCallback, PaymentError, SUCCESS,
};
use crate::ports::{OrderRepository, PaymentAttemptStore, PaymentGateway};

use super::dto::{
    CallbackAck, CheckoutRequest, CheckoutResponse, ErrorResponse, ReturnQuery, ReturnResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the payment endpoints.
///
/// Cloned per request; dependencies are Arc-wrapped.
#[derive(Clone)]
pub struct PaymentAppState {
    pub orders: Arc<dyn OrderRepository>,
    pub attempts: Arc<dyn PaymentAttemptStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub merchant: Arc<MerchantConfig>,
    pub settings: CheckoutSettings,
    /// Public URL of the notify endpoint, sent to the gateway.
    pub notify_url: String,
}

impl PaymentAppState {
    pub fn process_payment_handler(&self) -> ProcessPaymentHandler {
        ProcessPaymentHandler::new(
            self.orders.clone(),
            self.attempts.clone(),
            self.gateway.clone(),
            self.merchant.clone(),
            self.settings.clone(),
            self.notify_url.clone(),
        )
    }

    pub fn callback_handler(&self) -> HandlePaymentCallbackHandler {
        HandlePaymentCallbackHandler::new(
            self.orders.clone(),
            self.attempts.clone(),
            self.gateway.clone(),
        )
    }

    pub fn return_handler(&self) -> HandlePaymentReturnHandler {
        HandlePaymentReturnHandler::new(self.orders.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /payermax/checkout/:order_id
pub async fn start_checkout(
    State(state): State<PaymentAppState>,
    Path(order_id): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, PaymentApiError> {
    let cmd = ProcessPaymentCommand {
        order_id: parse_order_id(&order_id)?,
        return_url: request.return_url,
    };

    let redirect = state.process_payment_handler().handle(cmd).await?;

    Ok(Json(CheckoutResponse::success(redirect.redirect_url)))
}

/// GET|POST /payermax/notify?order_id=..&nonce=..
///
/// Parameters come from the query string, overlaid by form fields when the
/// body is form-encoded. The body, signed in the `sign` header, is the
/// gateway notification.
///
/// Acknowledges every well-formed delivery, including ignored ones, so the
/// gateway stops retrying. Only infrastructure and configuration failures
/// produce an error.
pub async fn payment_callback(
    State(state): State<PaymentAppState>,
    Query(query): Query<PaymentCallback>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CallbackAck>, PaymentApiError> {
    let callback = if is_form(&headers) {
        query.overlay(form_fields(&body))
    } else {
        query
    };

    let notification = headers
        .get(SIGN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|signature| SignedNotification {
            body: body.to_vec(),
            signature: signature.to_string(),
        });

    let cmd = HandlePaymentCallbackCommand {
        callback,
        notification,
    };

    state.callback_handler().handle(cmd).await?;

    Ok(Json(CallbackAck::default()))
}

/// GET /payermax/return/:order_id?status=..&refreshed=..
///
/// Unless the payment succeeded, redirects once to the same URL with
/// `refreshed=true` so the shopper sees the updated order.
pub async fn payment_return(
    State(state): State<PaymentAppState>,
    Path(order_id): Path<String>,
    Query(query): Query<ReturnQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, PaymentApiError> {
    let refreshed = query.refreshed.unwrap_or(false);
    let succeeded = query.status.as_deref().map(str::trim) == Some(SUCCESS);

    let cmd = HandlePaymentReturnCommand {
        order_id: parse_order_id(&order_id)?,
        status: query.status,
        refreshed,
    };

    let result = state.return_handler().handle(cmd).await?;

    if !succeeded && !refreshed {
        return Ok(Redirect::to(&refreshed_target(uri.path(), uri.query())).into_response());
    }

    Ok(Json(ReturnResponse::from(result)).into_response())
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

fn form_fields(body: &[u8]) -> PaymentCallback {
    let mut callback = PaymentCallback::default();
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "order_id" => callback.order_id = Some(value.into_owned()),
            "nonce" => callback.nonce = Some(value.into_owned()),
            "status" => callback.status = Some(value.into_owned()),
            _ => {}
        }
    }
    callback
}

/// Same path and query with `refreshed` set to `true`, replacing any
/// existing value.
fn refreshed_target(path: &str, query: Option<&str>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    if let Some(query) = query {
        serializer.extend_pairs(
            url::form_urlencoded::parse(query.as_bytes()).filter(|(key, _)| key != "refreshed"),
        );
    }
    serializer.append_pair("refreshed", "true");
    format!("{}?{}", path, serializer.finish())
}

fn parse_order_id(raw: &str) -> Result<OrderId, PaymentApiError> {
    OrderId::new(raw).map_err(|_| PaymentError::Validation(CallbackRejection::InvalidOrderId).into())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts payment errors to HTTP responses.
#[derive(Debug)]
pub struct PaymentApiError(PaymentError);

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        let error_code = match &self.0 {
            PaymentError::Configuration(_) => "CONFIGURATION_ERROR",
            PaymentError::Transport(_) => "GATEWAY_UNAVAILABLE",
            PaymentError::Verification { .. } => "GATEWAY_REJECTED",
            PaymentError::Validation(_) => "INVALID_REQUEST",
            PaymentError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            PaymentError::Storage(_) => "INTERNAL_ERROR",
        };

        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Payment request failed");
        } else {
            tracing::warn!(error = %self.0, "Payment request rejected");
        }

        let body = ErrorResponse::new(error_code, self.0.shopper_message());
        (status, Json(body)).into_response()
    }
}
