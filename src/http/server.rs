//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, timeout)
//! - Build the dispatcher and the services that share it
//! - Bind server to listener with graceful shutdown

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::diagnostics::DiagnosticProbe;
use crate::dispatch::{Dispatcher, SharedEnvStore, TransportOptions};
use crate::http::handlers;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::session::{PromptLoader, SessionTokenService};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store written by `/set-proxy` and read by the dispatcher.
    pub env: SharedEnvStore,
    pub probe: DiagnosticProbe,
    pub tokens: SessionTokenService,
    pub prompt: PromptLoader,
    pub client_template: PathBuf,
}

impl AppState {
    /// Build services over one shared dispatcher.
    pub fn new(config: &ServerConfig, env: SharedEnvStore, credential: Option<SecretString>) -> Self {
        let dispatcher = Dispatcher::new(env.clone(), TransportOptions::from(&config.transport));

        Self {
            probe: DiagnosticProbe::new(dispatcher.clone(), config.upstream.ip_echo_url.clone()),
            tokens: SessionTokenService::new(dispatcher, credential, &config.upstream),
            prompt: PromptLoader::new(&config.prompt.path),
            client_template: PathBuf::from(&config.prompt.client_template),
            env,
        }
    }
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig, env: SharedEnvStore, credential: Option<SecretString>) -> Self {
        let state = AppState::new(&config, env, credential);
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/check-ip", get(handlers::check_ip))
            .route("/set-proxy", post(handlers::set_proxy))
            .route("/token", get(handlers::token))
            .fallback(handlers::client_shell)
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.listener.request_timeout_secs),
            ))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(set_request_id_layer())
    }

    /// A clone of the router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
