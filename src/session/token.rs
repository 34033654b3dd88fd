//! Session token client for the upstream realtime API.
//!
//! # Responsibilities
//! - Build the session request (model, voice, instructions, VAD policy)
//! - Authenticate with the process-wide bearer credential
//! - Send it through the proxy-aware dispatcher
//! - Return the upstream JSON untouched, or a typed failure
//!
//! # Security Constraints
//! - The credential is held as a `SecretString` and never logged
//! - Upstream error bodies are logged, never handed back to HTTP clients

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::dispatch::{DispatchError, Dispatcher, RequestSpec};
use crate::observability::metrics;

/// Server-side voice activity detection policy sent with every session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TurnDetection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub threshold: f64,
    pub prefix_padding_ms: u32,
    pub silence_duration_ms: u32,
    pub create_response: bool,
    pub interrupt_response: bool,
}

impl TurnDetection {
    pub const SERVER_VAD: TurnDetection = TurnDetection {
        kind: "server_vad",
        threshold: 0.8,
        prefix_padding_ms: 500,
        silence_duration_ms: 800,
        create_response: true,
        interrupt_response: true,
    };
}

/// Body of the session-issuance POST. Field names are the upstream wire format.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest<'a> {
    pub model: &'a str,
    pub voice: &'a str,
    pub instructions: &'a str,
    pub turn_detection: TurnDetection,
}

/// Errors from the token issuance path.
#[derive(Debug, Error)]
pub enum TokenIssuanceError {
    /// The request could not be assembled (e.g. credential not a valid header value).
    #[error("Invalid token request: {0}")]
    InvalidRequest(String),

    /// No upstream credential was configured.
    #[error("Upstream credential is not configured")]
    MissingCredential,

    /// Proxy selection or transport failure.
    #[error("Token dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// Upstream answered with a non-2xx status.
    #[error("Upstream rejected token request with status {status}")]
    Upstream { status: u16, body: String },

    /// Upstream answered 2xx but the body is not JSON.
    #[error("Upstream returned invalid JSON: {0}")]
    InvalidResponse(#[source] serde_json::Error),
}

impl TokenIssuanceError {
    fn outcome(&self) -> &'static str {
        match self {
            TokenIssuanceError::InvalidRequest(_) => "invalid_request",
            TokenIssuanceError::MissingCredential => "missing_credential",
            TokenIssuanceError::Dispatch(DispatchError::Timeout) => "timeout",
            TokenIssuanceError::Dispatch(_) => "dispatch_error",
            TokenIssuanceError::Upstream { .. } => "upstream_error",
            TokenIssuanceError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Issues realtime session tokens through the dispatcher.
#[derive(Clone)]
pub struct SessionTokenService {
    dispatcher: Dispatcher,
    credential: Option<Arc<SecretString>>,
    session_url: String,
    model: String,
    voice: String,
}

impl std::fmt::Debug for SessionTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenService")
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .field("session_url", &self.session_url)
            .field("model", &self.model)
            .field("voice", &self.voice)
            .finish_non_exhaustive()
    }
}

impl SessionTokenService {
    /// Without a credential every issuance fails with `MissingCredential`.
    pub fn new(
        dispatcher: Dispatcher,
        credential: Option<SecretString>,
        upstream: &UpstreamConfig,
    ) -> Self {
        Self {
            dispatcher,
            credential: credential.map(Arc::new),
            session_url: upstream.session_url.clone(),
            model: upstream.model.clone(),
            voice: upstream.voice.clone(),
        }
    }

    /// The request body that would be sent for `instructions`.
    pub fn session_request<'a>(&'a self, instructions: &'a str) -> SessionRequest<'a> {
        SessionRequest {
            model: &self.model,
            voice: &self.voice,
            instructions,
            turn_detection: TurnDetection::SERVER_VAD,
        }
    }

    /// Request a new session token.
    ///
    /// On success the upstream JSON is returned verbatim.
    pub async fn issue_session_token(&self, instructions: &str) -> Result<Value, TokenIssuanceError> {
        let start_time = Instant::now();
        let result = self.request_token(instructions).await;

        match &result {
            Ok(_) => {
                tracing::info!(
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Session token issued"
                );
                metrics::record_token_issuance("issued");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Session token issuance failed"
                );
                metrics::record_token_issuance(e.outcome());
            }
        }

        result
    }

    async fn request_token(&self, instructions: &str) -> Result<Value, TokenIssuanceError> {
        let credential = self
            .credential
            .as_ref()
            .ok_or(TokenIssuanceError::MissingCredential)?;

        let body = serde_json::to_string(&self.session_request(instructions))
            .map_err(|e| TokenIssuanceError::InvalidRequest(e.to_string()))?;

        let spec = RequestSpec::post(&self.session_url)
            .try_header(
                AUTHORIZATION,
                &format!("Bearer {}", credential.expose_secret()),
            )
            .map_err(|_| {
                TokenIssuanceError::InvalidRequest(
                    "credential is not a valid header value".to_string(),
                )
            })?
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body);

        let (envelope, proxy) = self.dispatcher.dispatch(spec).await?;
        tracing::info!(
            url = %self.session_url,
            proxy = %proxy,
            status = envelope.status(),
            "Realtime session response received"
        );

        if !envelope.is_success() {
            tracing::warn!(
                status = envelope.status(),
                body = %envelope.text(),
                "Upstream rejected session request"
            );
            return Err(TokenIssuanceError::Upstream {
                status: envelope.status(),
                body: envelope.text().to_string(),
            });
        }

        envelope.json().map_err(TokenIssuanceError::InvalidResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::resolver::HTTPS_PROXY;
    use crate::dispatch::{EnvStore, SharedEnv, TransportOptions};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(base_url: &str) -> SessionTokenService {
        let upstream = UpstreamConfig {
            session_url: format!("{}/v1/realtime/sessions", base_url),
            ..UpstreamConfig::default()
        };
        let dispatcher = Dispatcher::new(Arc::new(SharedEnv::new()), TransportOptions::default());
        SessionTokenService::new(dispatcher, Some(SecretString::from("sk-test")), &upstream)
    }

    /// Counts reads of `HTTPS_PROXY`, the first key every resolution consults.
    struct CountingEnv {
        inner: SharedEnv,
        reads: AtomicUsize,
    }

    impl EnvStore for CountingEnv {
        fn get(&self, key: &str) -> Option<String> {
            if key == HTTPS_PROXY {
                self.reads.fetch_add(1, Ordering::SeqCst);
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: Option<String>) {
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_session_body_shape() {
        let service = service("http://unused.local");
        let body = serde_json::to_value(service.session_request("Be brief.")).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-realtime-preview-2025-06-03",
                "voice": "shimmer",
                "instructions": "Be brief.",
                "turn_detection": {
                    "type": "server_vad",
                    "threshold": 0.8,
                    "prefix_padding_ms": 500,
                    "silence_duration_ms": 800,
                    "create_response": true,
                    "interrupt_response": true
                }
            })
        );
    }

    #[test]
    fn test_instructions_change_only_that_field() {
        let service = service("http://unused.local");
        let mut a = serde_json::to_value(service.session_request("one")).unwrap();
        let mut b = serde_json::to_value(service.session_request("two")).unwrap();

        assert_ne!(a, b);
        a["instructions"] = Value::Null;
        b["instructions"] = Value::Null;
        assert_eq!(a, b);
    }

    #[test]
    fn test_debug_redacts_credential() {
        let shown = format!("{:?}", service("http://unused.local"));
        assert!(!shown.contains("sk-test"));
        assert!(shown.contains("REDACTED"));
    }

    #[tokio::test]
    async fn test_issue_returns_upstream_json_verbatim() {
        let mock_server = MockServer::start().await;
        let service = service(&mock_server.uri());
        let upstream_payload = json!({
            "id": "sess_123",
            "client_secret": {"value": "ek_abc", "expires_at": 1700000000},
            "unexpected": [1, 2, 3]
        });

        Mock::given(method("POST"))
            .and(path("/v1/realtime/sessions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::to_value(service.session_request("hi")).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream_payload.clone()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let token = service.issue_session_token("hi").await.unwrap();
        assert_eq!(token, upstream_payload);
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "bad key"}})),
            )
            .mount(&mock_server)
            .await;

        let err = service(&mock_server.uri())
            .issue_session_token("hi")
            .await
            .unwrap_err();
        match err {
            TokenIssuanceError::Upstream { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("bad key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let err = service(&mock_server.uri())
            .issue_session_token("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, TokenIssuanceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_invalid_proxy_is_wrapped() {
        let service = service("http://unused.local");
        service
            .dispatcher
            .env()
            .set("HTTPS_PROXY", Some("not a url".to_string()));

        let err = service.issue_session_token("hi").await.unwrap_err();
        assert!(matches!(
            err,
            TokenIssuanceError::Dispatch(DispatchError::InvalidProxyUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_dispatch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "sess"})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let upstream = UpstreamConfig {
            session_url: format!("{}/v1/realtime/sessions", mock_server.uri()),
            ..UpstreamConfig::default()
        };
        let dispatcher = Dispatcher::new(Arc::new(SharedEnv::new()), TransportOptions::default());
        let service = SessionTokenService::new(dispatcher, None, &upstream);

        let err = service.issue_session_token("hi").await.unwrap_err();
        assert!(matches!(err, TokenIssuanceError::MissingCredential));
        assert!(format!("{:?}", service).contains("credential: None"));
    }

    #[tokio::test]
    async fn test_issue_resolves_proxy_once_per_call() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "sess"})))
            .mount(&mock_server)
            .await;

        let env = Arc::new(CountingEnv {
            inner: SharedEnv::new(),
            reads: AtomicUsize::new(0),
        });
        let upstream = UpstreamConfig {
            session_url: format!("{}/v1/realtime/sessions", mock_server.uri()),
            ..UpstreamConfig::default()
        };
        let dispatcher = Dispatcher::new(env.clone(), TransportOptions::default());
        let service =
            SessionTokenService::new(dispatcher, Some(SecretString::from("sk-test")), &upstream);

        service.issue_session_token("hi").await.unwrap();
        assert_eq!(env.reads.load(Ordering::SeqCst), 1);

        service.issue_session_token("hi").await.unwrap();
        assert_eq!(env.reads.load(Ordering::SeqCst), 2);
    }
}
