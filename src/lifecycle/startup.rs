//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Seed the environment store and log the proxy variables it starts with
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast on configuration and bind errors
//! - A missing credential only disables token issuance
//! - Listener starts last (traffic only when ready)

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::loader::{load_credential, load_with_overrides, API_KEY_VAR};
use crate::config::ConfigError;
use crate::dispatch::resolver::redact_endpoint;
use crate::dispatch::{EnvStore, ProxyConfig, SharedEnv, SharedEnvStore};
use crate::http::HttpServer;
use crate::lifecycle::signals::wait_for_shutdown_signal;
use crate::lifecycle::Shutdown;
use crate::observability::{logging, metrics};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging initialization failed: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the relay: configure, bind, serve, drain.
pub async fn run(config_path: Option<PathBuf>) -> Result<(), StartupError> {
    let env = SharedEnv::from_process();
    let lookup = |key: &str| env.get(key);

    let config = load_with_overrides(config_path.as_deref(), lookup)?;
    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "realtime-relay starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        session_url = %config.upstream.session_url,
        model = %config.upstream.model,
        voice = %config.upstream.voice,
        "Configuration loaded"
    );

    let credential = load_credential(lookup);
    if credential.is_none() {
        tracing::warn!(
            var = API_KEY_VAR,
            "Upstream credential not set; /token will fail until it is provided"
        );
    }
    log_proxy_config(&ProxyConfig::from_env(&env));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let store: SharedEnvStore = Arc::new(env);
    let server = HttpServer::new(config, store, credential);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn log_proxy_config(proxy: &ProxyConfig) {
    let show = |v: &Option<String>| v.as_deref().map(redact_endpoint).unwrap_or_else(|| "unset".into());
    tracing::info!(
        http_proxy = %show(&proxy.http_proxy),
        https_proxy = %show(&proxy.https_proxy),
        no_proxy = proxy.no_proxy.as_deref().unwrap_or("unset"),
        all_proxy = %show(&proxy.all_proxy),
        effective = %proxy.effective(),
        "Proxy configuration"
    );
}
