//! `yv-api`: the HTTP server.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use yv_api::{create_router, metrics, ApiConfig, AppState};

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

/// `LOG_FORMAT=json` for log shippers, human-readable otherwise.
fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("yv=info".parse()?);
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // The S3 client and reqwest both link rustls 0.23, which needs one
    // process-wide provider
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        anyhow::bail!("another rustls crypto provider is already installed");
    }

    init_logging()?;

    let config = ApiConfig::from_env();
    if config.jwt_secret.is_none() {
        warn!("AUTH_JWT_SECRET is not set, every authenticated route will answer 401");
    }
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("bad bind address {}:{}", config.host, config.port))?;

    let state = AppState::new(config)
        .await
        .context("wiring storage, cache and pipeline")?;

    let metrics = if env_flag("METRICS_ENABLED", true) {
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, metrics = metrics.is_some(), "yv-api listening");

    axum::serve(listener, create_router(state, metrics))
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutting down"),
                Err(e) => {
                    warn!("Cannot listen for ctrl-c: {e}");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    Ok(())
}
