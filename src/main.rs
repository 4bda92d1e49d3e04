use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loyalty_gateway::clients::{IdentityClient, LoyaltyClient};
use loyalty_gateway::config::{Config, LogFormat};
use loyalty_gateway::kafka::StatsProducer;
use loyalty_gateway::{build_router, GatewayState, TokenAuthority};

const KAFKA_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let config = Arc::new(config);

    // Initialize tracing
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()));
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    info!("=== Loyalty Gateway Starting ===");
    info!("Port: {}", config.port);

    let tokens = Arc::new(
        TokenAuthority::new(&config.auth).context("Failed to initialize session tokens")?,
    );

    // Backends are connected eagerly; the gateway does not start without them
    let services = &config.services;
    info!("Connecting to identity backend at {}...", services.identity_grpc_url);
    let identity = IdentityClient::connect(&services.identity_grpc_url, services.connect_timeout())
        .await
        .with_context(|| format!("Failed to connect to identity backend at {}", services.identity_grpc_url))?;

    info!("Connecting to loyalty backend at {}...", services.loyalty_grpc_url);
    let loyalty = LoyaltyClient::connect(&services.loyalty_grpc_url, services.connect_timeout())
        .await
        .with_context(|| format!("Failed to connect to loyalty backend at {}", services.loyalty_grpc_url))?;

    let producer = StatsProducer::new(&config.kafka).context("Failed to initialize Kafka producer")?;
    if producer.is_enabled() {
        info!(topic = %producer.topic(), "Usage events are published to Kafka");
    } else {
        tracing::warn!("Kafka is disabled, usage events are dropped");
    }

    let state = GatewayState::new(
        config.clone(),
        tokens,
        Arc::new(identity),
        Arc::new(loyalty),
        Arc::new(producer.clone()),
    )
    .context("Failed to build gateway state")?;

    let app = build_router(state);

    let bind_address = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    info!("Loyalty Gateway listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to start server")?;

    if let Err(e) = producer.flush(KAFKA_FLUSH_TIMEOUT) {
        tracing::warn!(error = %e, "Pending usage events were not flushed");
    }

    info!("Loyalty Gateway stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
