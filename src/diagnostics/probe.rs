//! Outbound identity probe.
//!
//! Asks a public IP-echo service which address our requests arrive from,
//! to confirm the proxy configuration actually took effect.

use serde::Deserialize;

use crate::dispatch::{DispatchError, DispatchResult, Dispatcher, RequestSpec};

/// What the IP-echo service saw, and how we reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundIdentity {
    /// Origin address reported by the echo service.
    pub address: String,
    pub used_proxy: bool,
    /// Proxy endpoint used, if any.
    pub proxy_endpoint: Option<String>,
    /// HTTP status of the echo response.
    pub status: u16,
}

#[derive(Deserialize)]
struct EchoBody {
    origin: String,
}

#[derive(Debug, Clone)]
pub struct DiagnosticProbe {
    dispatcher: Dispatcher,
    echo_url: String,
}

impl DiagnosticProbe {
    pub fn new(dispatcher: Dispatcher, echo_url: impl Into<String>) -> Self {
        Self {
            dispatcher,
            echo_url: echo_url.into(),
        }
    }

    /// Query the echo endpoint once over the currently effective path.
    pub async fn check_outbound_identity(&self) -> DispatchResult<OutboundIdentity> {
        let (envelope, proxy) = self
            .dispatcher
            .dispatch(RequestSpec::get(&self.echo_url))
            .await?;

        let body: EchoBody = envelope.json().map_err(|e| DispatchError::Upstream {
            status: envelope.status(),
            message: format!("IP echo response has no usable origin: {}", e),
        })?;

        tracing::info!(
            address = %body.origin,
            status = envelope.status(),
            proxy = %proxy,
            "Outbound identity checked"
        );

        Ok(OutboundIdentity {
            address: body.origin,
            used_proxy: proxy.is_proxied(),
            proxy_endpoint: proxy.endpoint().map(str::to_string),
            status: envelope.status(),
        })
    }
}
