//! Request execution.
//!
//! # Responsibilities
//! - Issue exactly one request over a chosen transport
//! - Buffer the whole body into a `ResponseEnvelope`
//! - Classify transport failures as network or timeout errors
//! - Log which path (proxied/direct) and which endpoint carried the call
//!
//! # Design Decisions
//! - No retries; callers own retry policy
//! - Status codes are not interpreted here

use std::time::Instant;

use crate::dispatch::error::{DispatchError, DispatchResult};
use crate::dispatch::request::RequestSpec;
use crate::dispatch::response::ResponseEnvelope;
use crate::dispatch::transport::Transport;
use crate::observability::metrics;

/// Execute `spec` over `transport` and return the buffered response.
pub async fn execute(spec: RequestSpec, transport: &Transport) -> DispatchResult<ResponseEnvelope> {
    let start_time = Instant::now();
    let label = transport.proxy().transport_label();

    tracing::info!(
        transport = label,
        proxy = %transport.proxy(),
        method = %spec.method,
        url = %spec.url,
        "Dispatching outbound request"
    );

    let RequestSpec {
        method,
        url,
        headers,
        body,
    } = spec;

    let mut request = transport.client().request(method, &url).headers(headers);
    if let Some(body) = body {
        request = request.body(body);
    }

    let result = match request.send().await {
        Ok(response) => ResponseEnvelope::from_response(response).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(envelope) => {
            tracing::info!(
                transport = label,
                url = %url,
                status = envelope.status(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Outbound request completed"
            );
            metrics::record_outbound_request(label, "completed", start_time);
            Ok(envelope)
        }
        Err(e) => {
            let err = DispatchError::from(e);
            let outcome = match err {
                DispatchError::Timeout => "timeout",
                _ => "network_error",
            };
            tracing::warn!(
                transport = label,
                proxy = %transport.proxy(),
                url = %url,
                error = %err,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Outbound request failed"
            );
            metrics::record_outbound_request(label, outcome, start_time);
            Err(err)
        }
    }
}
