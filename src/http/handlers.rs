//! Route handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatch::resolver::HTTPS_PROXY;
use crate::dispatch::transport::parse_proxy_url;
use crate::dispatch::{resolve_effective_proxy, EffectiveProxy};
use crate::http::response::ApiError;
use crate::http::server::AppState;

/// Marker in the client template replaced by rendered markup.
const SSR_OUTLET: &str = "<!--ssr-outlet-->";

#[derive(Debug, Serialize)]
pub struct CheckIpResponse {
    #[serde(rename = "serverIP")]
    pub server_ip: String,
    pub timestamp: String,
    #[serde(rename = "usingProxy")]
    pub using_proxy: bool,
    #[serde(rename = "proxyUrl")]
    pub proxy_url: Option<String>,
    #[serde(rename = "responseStatus")]
    pub response_status: u16,
}

#[derive(Debug, Default, Deserialize)]
pub struct SetProxyRequest {
    #[serde(rename = "proxyUrl")]
    pub proxy_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SetProxyResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Lower-precedence proxy still in effect after a removal.
    #[serde(rename = "effectiveProxy", skip_serializing_if = "Option::is_none")]
    pub effective_proxy: Option<String>,
}

/// `GET /check-ip`
pub async fn check_ip(State(state): State<AppState>) -> Result<Json<CheckIpResponse>, ApiError> {
    let identity = state.probe.check_outbound_identity().await?;

    Ok(Json(CheckIpResponse {
        server_ip: identity.address,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        using_proxy: identity.used_proxy,
        proxy_url: identity.proxy_endpoint,
        response_status: identity.status,
    }))
}

/// `POST /set-proxy`
///
/// A missing or empty body, or a blank `proxyUrl`, removes the HTTPS proxy.
pub async fn set_proxy(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SetProxyResponse>, ApiError> {
    let request: SetProxyRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SetProxyRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
    };

    match request.proxy_url.filter(|url| !url.trim().is_empty()) {
        Some(url) => {
            if let Err(e) = parse_proxy_url(&url) {
                tracing::warn!(error = %e, "Proxy set to a value outbound calls will reject");
            }
            state.env.set(HTTPS_PROXY, Some(url.clone()));
            tracing::info!(proxy = %EffectiveProxy::Proxied(url.clone()), "Proxy set");
            Ok(Json(SetProxyResponse {
                message: "Proxy updated",
                proxy: Some(url),
                effective_proxy: None,
            }))
        }
        None => {
            state.env.set(HTTPS_PROXY, None);
            let still_effective = resolve_effective_proxy(state.env.as_ref());
            if still_effective.is_proxied() {
                tracing::warn!(
                    proxy = %still_effective,
                    "HTTPS proxy removed but a lower-precedence proxy is still in effect"
                );
            } else {
                tracing::info!("Proxy removed");
            }
            Ok(Json(SetProxyResponse {
                message: "Proxy removed",
                proxy: None,
                effective_proxy: still_effective.is_proxied().then(|| still_effective.to_string()),
            }))
        }
    }
}

/// `GET /token`
pub async fn token(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let instructions = state.prompt.get_instructions().await;
    let session = state.tokens.issue_session_token(&instructions).await?;
    Ok(Json(session))
}

/// Fallback: serve the client shell for every other path.
pub async fn client_shell(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let template = tokio::fs::read_to_string(&state.client_template)
        .await
        .map_err(|e| {
            tracing::warn!(
                path = %state.client_template.display(),
                error = %e,
                "Client template unavailable"
            );
            ApiError::NotFound
        })?;

    Ok((
        [(header::CACHE_CONTROL, "no-cache")],
        Html(template.replace(SSR_OUTLET, "")),
    ))
}
