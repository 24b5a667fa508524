//! Binary runner for the NFT DEX HTTP API.
//!
//! Loads configuration from the environment, verifies chain connectivity
//! (refusing to start against a dead or mismatched node), then serves the
//! axum router until ctrl-c / SIGTERM.

use nftdex_http_api::{ApiState, build_router};
use nftdex_runtime::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    setup_log();

    let config = Config::from_env()?;
    tracing::info!(
        rpc_url = %config.chain.rpc_url,
        chain_id = config.chain.chain_id,
        artifacts_dir = %config.artifacts_dir,
        "Starting NFT DEX API"
    );

    let state = ApiState::from_config(&config)?;

    // Hard startup gate: no listener until the node answers on the right chain.
    if let Err(e) = state.chain.check_connectivity().await {
        tracing::error!("Chain connectivity check failed: {e}");
        return Err(e.into());
    }
    tracing::info!(wallet = %state.chain.address(), "Signing account ready");

    let router = build_router(state, &config.api_prefix);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, prefix = %config.api_prefix, "NFT DEX API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down NFT DEX API");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn setup_log() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};
    if tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .is_err()
    {}
}
