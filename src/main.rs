//! Pro Entitlements API server.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use secrecy::ExposeSecret;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pro_entitlements::adapters::http::{router, AppState};
use pro_entitlements::adapters::{
    InMemoryEntitlementRepository, InMemoryPaymentRecordRepository, JwtSessionValidator,
    PostgresEntitlementRepository, PostgresPaymentRecordRepository, SystemClock,
};
use pro_entitlements::config::{AppConfig, ServerConfig};
use pro_entitlements::ports::{EntitlementRepository, PaymentRecordRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting pro-entitlements"
    );

    let (entitlements, payments) = repositories(&config).await?;
    let state = AppState {
        entitlements,
        payments,
        clock: Arc::new(SystemClock),
        session_validator: Arc::new(JwtSessionValidator::new(config.auth.jwt())),
        policy: config.entitlement.policy(),
    };

    let app = router(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn repositories(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn EntitlementRepository>, Arc<dyn PaymentRecordRepository>)> {
    let Some(database) = &config.database else {
        tracing::warn!("No database configured, using in-memory storage");
        return Ok((
            Arc::new(InMemoryEntitlementRepository::new()),
            Arc::new(InMemoryPaymentRecordRepository::new()),
        ));
    };

    tracing::info!("Connecting to database...");
    let pool = database.pool_options().connect(database.url.expose_secret()).await?;
    if database.run_migrations {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }
    tracing::info!("Database ready");

    Ok((
        Arc::new(PostgresEntitlementRepository::new(pool.clone())),
        Arc::new(PostgresPaymentRecordRepository::new(pool)),
    ))
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() && !server.is_production() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
