//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default upstream endpoint that issues realtime session tokens.
pub const DEFAULT_SESSION_URL: &str = "https://api.openai.com/v1/realtime/sessions";

/// Default realtime model requested for new sessions.
pub const DEFAULT_MODEL: &str = "gpt-4o-realtime-preview-2025-06-03";

/// Default voice requested for new sessions.
pub const DEFAULT_VOICE: &str = "shimmer";

/// Default public IP-echo endpoint used by the diagnostic probe.
pub const DEFAULT_IP_ECHO_URL: &str = "https://httpbin.org/ip";

/// Root configuration for the relay server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream endpoints and session parameters.
    pub upstream: UpstreamConfig,

    /// Outbound transport settings.
    pub transport: TransportConfig,

    /// Prompt and client template locations.
    pub prompt: PromptConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Deadline for handling one inbound request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl ListenerConfig {
    /// Replace the port of the bind address, keeping the host part.
    pub fn with_port(&mut self, port: u16) {
        let host = match self.bind_address.rsplit_once(':') {
            Some((host, _)) => host.to_string(),
            None => self.bind_address.clone(),
        };
        self.bind_address = format!("{}:{}", host, port);
    }
}

/// Upstream endpoints and realtime session parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Session-issuance endpoint.
    pub session_url: String,

    /// Model identifier sent with every session request.
    pub model: String,

    /// Voice identifier sent with every session request.
    pub voice: String,

    /// IP-echo endpoint queried by `/check-ip`.
    pub ip_echo_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            session_url: DEFAULT_SESSION_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            ip_echo_url: DEFAULT_IP_ECHO_URL.to_string(),
        }
    }
}

/// Outbound transport configuration.
///
/// Unset timeouts leave the HTTP client's own defaults in place.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: Option<u64>,

    /// Total request timeout in seconds.
    pub request_timeout_secs: Option<u64>,

    /// User-Agent header sent on outbound requests.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: None,
            request_timeout_secs: None,
            user_agent: concat!("realtime-relay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Prompt and client template locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Markdown file holding the session instructions.
    pub path: String,

    /// HTML shell served for client routes.
    pub client_template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            path: "./prompt.md".to_string(),
            client_template: "./client/index.html".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "realtime_relay=info,tower_http=info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
