//! Proxy-aware outbound dispatcher.
//!
//! # Data Flow
//! ```text
//! caller builds RequestSpec
//!     → resolver.rs  (EnvStore → ProxyConfig → EffectiveProxy, every call)
//!     → transport.rs (EffectiveProxy → Transport, pooled per configuration)
//!     → executor.rs  (one request, full body read → ResponseEnvelope)
//!     → caller interprets status and body
//! ```
//!
//! # Design Decisions
//! - Proxy state is re-read on every call; no memoized effective proxy
//! - Transport failures are typed errors; HTTP statuses are data
//! - Nothing is retried or downgraded silently

pub mod env;
pub mod error;
pub mod executor;
pub mod request;
pub mod resolver;
pub mod response;
pub mod transport;

pub use env::{EnvStore, SharedEnv, SharedEnvStore};
pub use error::{DispatchError, DispatchResult};
pub use executor::execute;
pub use request::RequestSpec;
pub use resolver::{resolve_effective_proxy, EffectiveProxy, ProxyConfig};
pub use response::ResponseEnvelope;
pub use transport::{select_transport, Transport, TransportOptions, TransportPool};

/// Resolve → Select → Execute, bound to one environment store.
#[derive(Clone)]
pub struct Dispatcher {
    env: SharedEnvStore,
    pool: std::sync::Arc<TransportPool>,
}

impl Dispatcher {
    pub fn new(env: SharedEnvStore, options: TransportOptions) -> Self {
        Self {
            env,
            pool: std::sync::Arc::new(TransportPool::new(options)),
        }
    }

    /// The store proxy settings are read from.
    pub fn env(&self) -> &SharedEnvStore {
        &self.env
    }

    /// Effective proxy as of now.
    pub fn effective_proxy(&self) -> EffectiveProxy {
        resolve_effective_proxy(self.env.as_ref())
    }

    /// Dispatch one request on the currently configured path.
    ///
    /// Returns the envelope together with the proxy that carried it.
    pub async fn dispatch(&self, spec: RequestSpec) -> DispatchResult<(ResponseEnvelope, EffectiveProxy)> {
        let proxy = self.effective_proxy();
        let transport = self.pool.select(&proxy)?;
        let envelope = execute(spec, &transport).await?;
        Ok((envelope, proxy))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("effective_proxy", &self.effective_proxy().to_string())
            .field("pooled_transports", &self.pool.len())
            .finish()
    }
}
