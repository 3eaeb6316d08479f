//! Integration tests for the PayerMax client against an in-process gateway.
//!
//! These tests verify:
//! - The bytes signed are the bytes sent, on the expected path and content type
//! - Responses are accepted only when authentic and successful
//! - Transport failures (non-2xx, timeouts) surface as transport errors
//! - A full checkout and signed notify round trip through the HTTP router

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use payermax_checkout::adapters::http::{payment_router, PaymentAppState};
use payermax_checkout::adapters::memory::{InMemoryOrderStore, InMemoryPaymentAttemptStore};
use payermax_checkout::adapters::payermax::{ClientOptions, PayerMaxClient, SIGN_HEADER};
use payermax_checkout::application::handlers::payment::{
    ProcessPaymentCommand, ProcessPaymentHandler,
};
use payermax_checkout::domain::foundation::{OrderId, OutTradeNo, Timestamp};
use payermax_checkout::domain::order::{LineItem, Order, OrderStatus};
use payermax_checkout::domain::payment::{
    CallbackUrls, CheckoutSettings, GatewayRequest, GatewayRequestBuilder, PaymentError,
    PaymentNonce, VerificationFailure, ORDER_AND_PAY,
};
use payermax_checkout::ports::PaymentGateway;

use common::{FakeGateway, Reply, ReplySigning, REDIRECT_URL};

// =============================================================================
// Test Infrastructure
// =============================================================================

const NOTIFY_URL: &str = "https://shop.example/payermax/notify";

fn order_id() -> OrderId {
    OrderId::new("1042").unwrap()
}

fn order() -> Order {
    Order::pending(order_id(), "wc_order_abc", "100.00".parse().unwrap(), "USD")
        .with_item(LineItem::new("SKU-1", 2))
}

fn client(gateway: &FakeGateway, options: ClientOptions) -> PayerMaxClient {
    PayerMaxClient::new(
        Arc::new(common::merchant()),
        options.with_base_url(gateway.base_url()),
    )
    .unwrap()
}

fn request() -> GatewayRequest {
    let merchant = common::merchant();
    let settings = CheckoutSettings::default();
    let now = Timestamp::now();
    let urls = CallbackUrls::new(
        "https://shop.example/thanks",
        NOTIFY_URL,
        &order_id(),
        &PaymentNonce::generate(),
    )
    .unwrap();
    GatewayRequestBuilder::new(&merchant, &settings).build(
        &order(),
        OutTradeNo::for_attempt("wc_order_abc", now.as_unix_millis()).unwrap(),
        &urls,
        now,
    )
}

fn verification_failure(result: Result<impl std::fmt::Debug, PaymentError>) -> VerificationFailure {
    match result {
        Err(PaymentError::Verification { failure, .. }) => failure,
        other => panic!("expected verification error, got {:?}", other),
    }
}

// =============================================================================
// Outbound Request
// =============================================================================

#[tokio::test]
async fn sent_body_is_the_signed_body() {
    let gateway = FakeGateway::start().await;
    let client = client(&gateway, ClientOptions::default());
    let request = request();

    let response = client.send(ORDER_AND_PAY, &request).await.unwrap();
    assert_eq!(response.redirect_url(), Some(REDIRECT_URL));

    let captured = gateway.captured();
    assert_eq!(captured.len(), 1);
    let captured = &captured[0];

    let prepared = client.prepare(&request).unwrap();
    assert_eq!(captured.body, prepared.body);

    let signature = captured.sign.as_deref().expect("sign header sent");
    assert!(common::merchant_public().verify(&captured.body, signature));
}

#[tokio::test]
async fn request_targets_order_and_pay_as_json() {
    let gateway = FakeGateway::start().await;
    let client = client(&gateway, ClientOptions::default());

    client.send(ORDER_AND_PAY, &request()).await.unwrap();

    let captured = &gateway.captured()[0];
    assert_eq!(captured.operation, "orderAndPay");
    assert!(captured
        .content_type
        .as_deref()
        .unwrap_or_default()
        .starts_with("application/json"));

    let json = captured.json();
    assert_eq!(json["merchantNo"], "SDP01010114");
    assert_eq!(json["data"]["totalAmount"], "100.00");
    assert_eq!(json["data"]["country"], "SA");
    assert_eq!(json["data"]["userId"], "0");
}

// =============================================================================
// Response Acceptance
// =============================================================================

#[tokio::test]
async fn forged_response_is_rejected() {
    let gateway = FakeGateway::start().await;
    gateway.reply_with(Reply {
        signing: ReplySigning::Forged,
        ..Reply::default()
    });
    let client = client(&gateway, ClientOptions::default());

    let result = client.send(ORDER_AND_PAY, &request()).await;
    assert_eq!(verification_failure(result), VerificationFailure::InvalidSignature);
}

#[tokio::test]
async fn unsigned_response_is_rejected() {
    let gateway = FakeGateway::start().await;
    gateway.reply_with(Reply {
        signing: ReplySigning::Unsigned,
        ..Reply::default()
    });
    let client = client(&gateway, ClientOptions::default());

    let result = client.send(ORDER_AND_PAY, &request()).await;
    assert_eq!(verification_failure(result), VerificationFailure::MissingSignature);
}

#[tokio::test]
async fn signed_failure_code_leaves_order_untouched() {
    let gateway = FakeGateway::start().await;
    gateway.reply_with(Reply {
        body: r#"{"code":"APPLY_FAIL","msg":"merchant disabled","data":{}}"#.to_string(),
        ..Reply::default()
    });

    let orders = InMemoryOrderStore::new();
    orders.insert(order()).await;
    orders.set_stock("SKU-1", 10).await;

    let handler = ProcessPaymentHandler::new(
        Arc::new(orders.clone()),
        Arc::new(InMemoryPaymentAttemptStore::new()),
        Arc::new(client(&gateway, ClientOptions::default())),
        Arc::new(common::merchant()),
        CheckoutSettings::default(),
        NOTIFY_URL,
    );

    let result = handler
        .handle(ProcessPaymentCommand {
            order_id: order_id(),
            return_url: "https://shop.example/thanks".to_string(),
        })
        .await;

    match result {
        Err(PaymentError::Verification { failure, body }) => {
            assert_eq!(
                failure,
                VerificationFailure::StatusNotSuccess {
                    code: "APPLY_FAIL".to_string()
                }
            );
            assert!(body.contains("merchant disabled"));
        }
        other => panic!("expected verification error, got {:?}", other),
    }
    assert_eq!(orders.status_of(&order_id()).await, Some(OrderStatus::Pending));
    assert_eq!(orders.stock_level("SKU-1").await, Some(10));
}

// =============================================================================
// Transport
// =============================================================================

#[tokio::test]
async fn non_success_http_status_is_transport_error() {
    let gateway = FakeGateway::start().await;
    gateway.reply_with(Reply {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "upstream unavailable".to_string(),
        ..Reply::default()
    });
    let client = client(&gateway, ClientOptions::default());

    let result = client.send(ORDER_AND_PAY, &request()).await;
    match result {
        Err(PaymentError::Transport(message)) => assert!(message.contains("503")),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn slow_gateway_times_out() {
    let gateway = FakeGateway::start().await;
    gateway.reply_with(Reply {
        delay: Some(Duration::from_secs(2)),
        ..Reply::default()
    });
    let client = client(
        &gateway,
        ClientOptions::default().with_timeout(Duration::from_millis(200)),
    );

    let result = client.send(ORDER_AND_PAY, &request()).await;
    assert!(matches!(result, Err(PaymentError::Transport(_))));
}

#[tokio::test]
async fn unreachable_gateway_is_transport_error() {
    let client = PayerMaxClient::new(
        Arc::new(common::merchant()),
        ClientOptions::default().with_base_url("http://127.0.0.1:1"),
    )
    .unwrap();

    let result = client.send(ORDER_AND_PAY, &request()).await;
    assert!(matches!(result, Err(PaymentError::Transport(_))));
}

// =============================================================================
// Checkout Round Trip
// =============================================================================

#[tokio::test]
async fn checkout_then_notify_completes_order_once() {
    let gateway = FakeGateway::start().await;

    let orders = InMemoryOrderStore::new();
    orders.insert(order()).await;
    orders.set_stock("SKU-1", 10).await;

    let state = PaymentAppState {
        orders: Arc::new(orders.clone()),
        attempts: Arc::new(InMemoryPaymentAttemptStore::new()),
        gateway: Arc::new(client(&gateway, ClientOptions::default())),
        merchant: Arc::new(common::merchant()),
        settings: CheckoutSettings::default(),
        notify_url: NOTIFY_URL.to_string(),
    };
    let router = payment_router().with_state(state);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/payermax/checkout/1042")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"return_url":"https://shop.example/thanks"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The gateway calls back on the notify URL it was given
    let notify_url = gateway.captured()[0].json()["data"]["notifyUrl"]
        .as_str()
        .unwrap()
        .to_string();
    let notify_path = notify_url.trim_start_matches("https://shop.example");
    assert!(notify_path.starts_with("/payermax/notify?order_id=1042&nonce="));

    let trade_no = gateway.captured()[0].json()["data"]["outTradeNo"]
        .as_str()
        .unwrap()
        .to_string();

    // Knowing the nonce is not enough without a gateway-signed notification
    let unsigned = router
        .clone()
        .oneshot(Request::builder().uri(notify_path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(unsigned.status(), StatusCode::OK);
    assert_eq!(orders.status_of(&order_id()).await, Some(OrderStatus::Pending));

    let notification = format!(
        r#"{{"code":"APPLY_SUCCESS","notifyType":"PAYMENT","data":{{"outTradeNo":"{}","status":"SUCCESS"}}}}"#,
        trade_no
    );
    let signature = common::gateway_private()
        .sign(notification.as_bytes())
        .unwrap();

    for _ in 0..2 {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(notify_path)
                    .header(SIGN_HEADER, signature.as_str())
                    .header("content-type", "application/json")
                    .body(Body::from(notification.clone()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["code"], "SUCCESS");
    }

    assert_eq!(orders.status_of(&order_id()).await, Some(OrderStatus::Completed));
    assert_eq!(orders.stock_reduction_count(&order_id()).await, 1);
    assert_eq!(orders.stock_level("SKU-1").await, Some(8));
}
