//! Effective proxy resolution.
//!
//! # Responsibilities
//! - Snapshot the four proxy variables from an `EnvStore`
//! - Pick the effective endpoint by fixed precedence
//!
//! # Design Decisions
//! - Precedence: `HTTPS_PROXY` > `HTTP_PROXY` > `ALL_PROXY`
//! - Empty values count as unset
//! - `NO_PROXY` is carried for logging only; it is not enforced
//! - Nothing is memoized: the store may change between calls

use std::fmt;

use crate::dispatch::env::EnvStore;

pub const HTTP_PROXY: &str = "HTTP_PROXY";
pub const HTTPS_PROXY: &str = "HTTPS_PROXY";
pub const NO_PROXY: &str = "NO_PROXY";
pub const ALL_PROXY: &str = "ALL_PROXY";

/// Read-only snapshot of the proxy variables at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub no_proxy: Option<String>,
    pub all_proxy: Option<String>,
}

impl ProxyConfig {
    /// Snapshot the proxy variables from `env`.
    pub fn from_env(env: &dyn EnvStore) -> Self {
        let read = |key: &str| env.get(key).filter(|v| !v.trim().is_empty());
        Self {
            http_proxy: read(HTTP_PROXY),
            https_proxy: read(HTTPS_PROXY),
            no_proxy: read(NO_PROXY),
            all_proxy: read(ALL_PROXY),
        }
    }

    /// Apply the precedence rule to this snapshot.
    pub fn effective(&self) -> EffectiveProxy {
        self.https_proxy
            .as_ref()
            .or(self.http_proxy.as_ref())
            .or(self.all_proxy.as_ref())
            .map(|endpoint| EffectiveProxy::Proxied(endpoint.trim().to_string()))
            .unwrap_or(EffectiveProxy::Direct)
    }
}

/// The single outbound path chosen for one call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EffectiveProxy {
    /// No proxy configured; connect straight to the target.
    Direct,
    /// Tunnel through the given proxy endpoint.
    Proxied(String),
}

impl EffectiveProxy {
    pub fn is_proxied(&self) -> bool {
        matches!(self, EffectiveProxy::Proxied(_))
    }

    /// The raw endpoint, if proxied.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            EffectiveProxy::Direct => None,
            EffectiveProxy::Proxied(endpoint) => Some(endpoint),
        }
    }

    /// Short label used in logs and metrics.
    pub fn transport_label(&self) -> &'static str {
        match self {
            EffectiveProxy::Direct => "direct",
            EffectiveProxy::Proxied(_) => "proxied",
        }
    }
}

impl fmt::Display for EffectiveProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectiveProxy::Direct => f.write_str("none"),
            EffectiveProxy::Proxied(endpoint) => f.write_str(&redact_endpoint(endpoint)),
        }
    }
}

/// Resolve the effective proxy from the current state of `env`.
pub fn resolve_effective_proxy(env: &dyn EnvStore) -> EffectiveProxy {
    ProxyConfig::from_env(env).effective()
}

/// Strip any password from a proxy endpoint before it reaches a log line.
pub fn redact_endpoint(endpoint: &str) -> String {
    match url::Url::parse(endpoint) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => endpoint.to_string(),
    }
}
