//! Normalized response envelope.
//!
//! # Design Decisions
//! - Built once at the transport boundary, after the body is fully read
//! - The body is cached as text; `text()` and `json()` never touch the network
//! - Non-2xx statuses are ordinary envelopes; callers interpret them

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

/// Status, headers and fully buffered body of one upstream response.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    status: u16,
    status_text: String,
    headers: HeaderMap,
    body: String,
}

impl ResponseEnvelope {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status.to_string(),
            headers,
            body: body.into(),
        }
    }

    /// Read the full body of a transport response into an envelope.
    pub async fn from_response(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        let body = String::from_utf8_lossy(&bytes).into_owned();
        Ok(Self::new(status, headers, body))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Status code rendered as text (e.g. "200").
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The cached body as text.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parse the cached body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_accessors_are_repeatable() {
        let envelope = ResponseEnvelope::new(500, HeaderMap::new(), r#"{"error":"bad"}"#);

        assert_eq!(envelope.status(), 500);
        assert_eq!(envelope.status_text(), "500");
        assert!(!envelope.is_success());
        assert_eq!(envelope.text(), envelope.text());

        let first: Value = envelope.json().unwrap();
        let second: Value = envelope.json().unwrap();
        assert_eq!(first, json!({"error": "bad"}));
        assert_eq!(first, second);
    }

    #[test]
    fn test_json_error_leaves_text_usable() {
        let envelope = ResponseEnvelope::new(200, HeaderMap::new(), "<html>");
        assert!(envelope.json::<Value>().is_err());
        assert_eq!(envelope.text(), "<html>");
    }
}
