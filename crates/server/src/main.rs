//! E-Store order service binary.
//!
//! Serves the order-placement API. Wires configuration, the `PostgreSQL`
//! pool, and the SMTP mailer into the order service, then hands the router
//! to axum.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use estore_server::config::ServerConfig;
use estore_server::db::{
    self, CardRepository, CustomerRepository, OrderRepository, ProductRepository,
};
use estore_server::routes;
use estore_server::services::{OrderService, SmtpMailer};
use estore_server::state::AppState;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env().expect("Failed to load configuration");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let _sentry_guard = init_sentry(&config);

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let mailer = SmtpMailer::new(&config.email).expect("Failed to configure SMTP transport");

    let orders = OrderService::new(
        Arc::new(CustomerRepository::new(pool.clone())),
        Arc::new(ProductRepository::new(pool.clone())),
        Arc::new(CardRepository::new(pool.clone())),
        Arc::new(OrderRepository::new(pool)),
        Arc::new(mailer),
    );

    let addr = config.bind_addr();
    let app = routes::router(AppState::new(config, orders));

    tracing::info!(%addr, "Order service listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
