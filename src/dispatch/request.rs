//! Outbound request description.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use reqwest::Method;

/// A single outbound request, owned by exactly one dispatch.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Add a header. Names are case-insensitive; a repeated name replaces the value.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a header from a string value, rejecting bytes HTTP does not allow.
    pub fn try_header(
        self,
        name: HeaderName,
        value: &str,
    ) -> Result<Self, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(value)?;
        if name == reqwest::header::AUTHORIZATION {
            value.set_sensitive(true);
        }
        Ok(self.header(name, value))
    }

    /// Set a raw text body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

    #[test]
    fn test_builder() {
        let spec = RequestSpec::post("http://example.com/x")
            .try_header(AUTHORIZATION, "Bearer k")
            .unwrap()
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body("{}");

        assert_eq!(spec.method, Method::POST);
        assert_eq!(spec.headers.get("authorization").unwrap(), "Bearer k");
        assert!(spec.headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(spec.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(spec.body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_rejects_control_characters() {
        assert!(RequestSpec::get("http://example.com")
            .try_header(AUTHORIZATION, "Bearer a\nb")
            .is_err());
    }
}
