//! PayerMax checkout service.
//!
//! Serves the checkout, notify and return endpoints against in-memory
//! collaborators. In development a demo order `demo-1` is seeded.

use std::sync::Arc;
use std::time::Duration;

use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use payermax_checkout::adapters::http::{payment_router, PaymentAppState};
use payermax_checkout::adapters::memory::{InMemoryOrderStore, InMemoryPaymentAttemptStore};
use payermax_checkout::adapters::payermax::PayerMaxClient;
use payermax_checkout::config::{AppConfig, Environment};
use payermax_checkout::domain::foundation::OrderId;
use payermax_checkout::domain::order::{LineItem, Order};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let merchant = Arc::new(config.payermax.merchant_config()?);
    let client = PayerMaxClient::new(merchant.clone(), config.payermax.client_options())?;

    let orders = InMemoryOrderStore::new();
    if config.server.environment == Environment::Development {
        seed_demo_order(&orders).await?;
    }

    let state = PaymentAppState {
        orders: Arc::new(orders),
        attempts: Arc::new(InMemoryPaymentAttemptStore::new()),
        gateway: Arc::new(client),
        merchant: merchant.clone(),
        settings: config.payermax.checkout_settings(),
        notify_url: config.payermax.notify_url.clone(),
    };

    let app = payment_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?merchant.environment(),
        merchant_no = merchant.merchant_no(),
        payment_method = %config.payermax.title,
        "PayerMax checkout listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

async fn seed_demo_order(orders: &InMemoryOrderStore) -> Result<(), Box<dyn std::error::Error>> {
    let order = Order::pending(OrderId::new("demo-1")?, "wc_order_demo", "25.00".parse()?, "USD")
        .with_item(LineItem::new("DEMO-SKU", 1));
    orders.insert(order).await;
    orders.set_stock("DEMO-SKU", 100).await;
    tracing::debug!("Seeded demo order demo-1");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
