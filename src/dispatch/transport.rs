//! Transport selection.
//!
//! # Responsibilities
//! - Build a direct or proxy-tunneled HTTP client for an `EffectiveProxy`
//! - Reject malformed proxy endpoints before any request is made
//! - Reuse one client per distinct proxy configuration
//!
//! # Design Decisions
//! - A malformed proxy is an error, never a silent downgrade to direct
//! - Direct clients disable the HTTP library's own environment proxy lookup,
//!   so the resolver is the only place proxy variables are interpreted
//! - Credentials embedded in the proxy URL become proxy basic auth
//! - Pooled clients are keyed by the exact endpoint; two configurations
//!   never share connections

use dashmap::DashMap;
use reqwest::{Client, Proxy};
use std::time::Duration;
use url::Url;

use crate::config::TransportConfig;
use crate::dispatch::error::{DispatchError, DispatchResult};
use crate::dispatch::resolver::{redact_endpoint, EffectiveProxy};

/// Client-level settings applied to every transport.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl From<&TransportConfig> for TransportOptions {
    fn from(config: &TransportConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
            user_agent: Some(config.user_agent.clone()).filter(|ua| !ua.is_empty()),
        }
    }
}

/// A concrete outbound path: the client plus the proxy it is bound to.
#[derive(Debug, Clone)]
pub struct Transport {
    proxy: EffectiveProxy,
    client: Client,
}

impl Transport {
    pub fn proxy(&self) -> &EffectiveProxy {
        &self.proxy
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn is_proxied(&self) -> bool {
        self.proxy.is_proxied()
    }
}

/// Build the transport matching `proxy`.
pub fn select_transport(
    proxy: &EffectiveProxy,
    options: &TransportOptions,
) -> DispatchResult<Transport> {
    let mut builder = Client::builder();
    if let Some(timeout) = options.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = options.request_timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(user_agent) = &options.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }

    builder = match proxy {
        EffectiveProxy::Direct => builder.no_proxy(),
        EffectiveProxy::Proxied(endpoint) => {
            let url = parse_proxy_url(endpoint)?;
            let proxy = Proxy::all(url).map_err(|e| invalid(endpoint, e.to_string()))?;
            builder.proxy(proxy)
        }
    };

    let client = builder.build()?;

    tracing::debug!(transport = proxy.transport_label(), proxy = %proxy, "Transport built");

    Ok(Transport {
        proxy: proxy.clone(),
        client,
    })
}

/// Validate a proxy endpoint: absolute URL, http(s) scheme, non-empty host.
pub fn parse_proxy_url(endpoint: &str) -> DispatchResult<Url> {
    let url = Url::parse(endpoint).map_err(|e| invalid(endpoint, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            endpoint,
            format!("unsupported proxy scheme '{}'", url.scheme()),
        ));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid(endpoint, "missing host".to_string())),
    }
}

fn invalid(endpoint: &str, reason: String) -> DispatchError {
    DispatchError::InvalidProxyUrl {
        endpoint: redact_endpoint(endpoint),
        reason,
    }
}

/// Caches transports per effective proxy configuration.
///
/// Holds the direct transport plus at most one proxied transport, the most
/// recently built. Switching proxies drops the previous proxied client.
#[derive(Debug, Default)]
pub struct TransportPool {
    options: TransportOptions,
    transports: DashMap<EffectiveProxy, Transport>,
}

impl TransportPool {
    pub fn new(options: TransportOptions) -> Self {
        Self {
            options,
            transports: DashMap::new(),
        }
    }

    /// Return the cached transport for `proxy`, building it on first use.
    ///
    /// Failed builds are not cached, so a corrected endpoint works on the
    /// next call.
    pub fn select(&self, proxy: &EffectiveProxy) -> DispatchResult<Transport> {
        if let Some(transport) = self.transports.get(proxy) {
            return Ok(transport.clone());
        }

        let transport = select_transport(proxy, &self.options)?;
        if proxy.is_proxied() {
            self.transports
                .retain(|cached, _| !cached.is_proxied() || cached == proxy);
        }
        self.transports.insert(proxy.clone(), transport.clone());
        Ok(transport)
    }

    /// Number of distinct configurations currently cached.
    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}
