//! Shared test infrastructure: an in-process PayerMax gateway.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use once_cell::sync::Lazy;
use rsa::RsaPrivateKey;

use payermax_checkout::domain::payment::{
    GatewayEnvironment, MerchantConfig, PrivateSigningKey, PublicVerifyingKey,
};

// =============================================================================
// Keys
// =============================================================================

static MERCHANT_KEY: Lazy<RsaPrivateKey> = Lazy::new(generate_key);
static GATEWAY_KEY: Lazy<RsaPrivateKey> = Lazy::new(generate_key);

fn generate_key() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("generate test key")
}

pub fn merchant_private() -> PrivateSigningKey {
    PrivateSigningKey::from_rsa(MERCHANT_KEY.clone())
}

pub fn merchant_public() -> PublicVerifyingKey {
    merchant_private().public_key()
}

pub fn gateway_private() -> PrivateSigningKey {
    PrivateSigningKey::from_rsa(GATEWAY_KEY.clone())
}

pub fn gateway_public() -> PublicVerifyingKey {
    gateway_private().public_key()
}

/// Sandbox merchant holding both test key pairs.
pub fn merchant() -> MerchantConfig {
    MerchantConfig::new("SDP01010114", "app-3b1e", GatewayEnvironment::Sandbox)
        .expect("merchant config")
        .with_private_key(merchant_private())
        .with_gateway_public_key(gateway_public())
}

// =============================================================================
// Fake Gateway
// =============================================================================

pub const REDIRECT_URL: &str = "https://pay-gate-uat.payermax.com/checkout/abc123";

/// How the fake gateway signs its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySigning {
    Gateway,
    /// Signed with the merchant key, which the client must not accept.
    Forged,
    Unsigned,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
    pub signing: ReplySigning,
    pub delay: Option<Duration>,
}

impl Default for Reply {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            body: format!(
                r#"{{"code":"APPLY_SUCCESS","msg":"Success.","data":{{"redirectUrl":"{}"}}}}"#,
                REDIRECT_URL
            ),
            signing: ReplySigning::Gateway,
            delay: None,
        }
    }
}

/// A request as the gateway received it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub operation: String,
    pub body: Vec<u8>,
    pub sign: Option<String>,
    pub content_type: Option<String>,
}

impl Captured {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("captured body is JSON")
    }
}

#[derive(Default)]
struct GatewayState {
    reply: Mutex<Reply>,
    captured: Mutex<Vec<Captured>>,
}

/// In-process gateway bound to an ephemeral port.
#[derive(Clone)]
pub struct FakeGateway {
    addr: SocketAddr,
    state: Arc<GatewayState>,
}

impl FakeGateway {
    pub async fn start() -> Self {
        let state = Arc::new(GatewayState::default());
        let app = Router::new()
            .route("/aggregate-pay/api/gateway/:operation", post(handle))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake gateway");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake gateway");
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn reply_with(&self, reply: Reply) {
        *self.state.reply.lock().unwrap() = reply;
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.state.captured.lock().unwrap().clone()
    }
}

async fn handle(
    State(state): State<Arc<GatewayState>>,
    Path(operation): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    state.captured.lock().unwrap().push(Captured {
        operation,
        body: body.to_vec(),
        sign: header("sign"),
        content_type: header("content-type"),
    });

    let reply = state.reply.lock().unwrap().clone();
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let signature = match reply.signing {
        ReplySigning::Gateway => Some(gateway_private().sign(reply.body.as_bytes()).unwrap()),
        ReplySigning::Forged => Some(merchant_private().sign(reply.body.as_bytes()).unwrap()),
        ReplySigning::Unsigned => None,
    };

    let mut response = (reply.status, reply.body).into_response();
    if let Some(signature) = signature {
        response
            .headers_mut()
            .insert("sign", signature.parse().unwrap());
    }
    response
}
