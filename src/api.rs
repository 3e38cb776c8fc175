//! API client for REST assertions
//!
//! Thin façade over reqwest for probing backend endpoints from E2E suites:
//! every call resolves to a status code plus a parsed JSON body that
//! assertion helpers operate on.

use anyhow::{bail, Context, Result};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

pub struct ApiClient {
    base_url: String,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

/// Response snapshot kept after the transport call completes
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Fail with context when the status differs from the expectation
    pub fn assert_status(&self, expected: u16) -> Result<&Self> {
        if self.status != expected {
            bail!(
                "Expected status {} but got {} (body: {})",
                expected,
                self.status,
                self.body
            );
        }
        Ok(self)
    }

    /// Field lookup by JSON pointer, e.g. `/items/0/id`
    pub fn field(&self, pointer: &str) -> Option<&Value> {
        self.body.pointer(pointer)
    }

    /// Assert a field exists and equals the expected value
    pub fn assert_field(&self, pointer: &str, expected: &Value) -> Result<&Self> {
        match self.field(pointer) {
            Some(actual) if actual == expected => Ok(self),
            Some(actual) => bail!(
                "Field {} expected {} but was {}",
                pointer,
                expected,
                actual
            ),
            None => bail!("Field {} not present in response body", pointer),
        }
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into(),
            bearer_token: None,
            client,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<ApiResponse> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let mut req = self.client.request(method.clone(), &url);
        if let Some(token) = &self.bearer_token {
            req = req.bearer_auth(token);
        }
        if let Some(json) = body {
            req = req.json(json);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("{} {} failed", method, url))?;

        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> ApiResponse {
        ApiResponse {
            status: 200,
            body: serde_json::json!({
                "items": [{"id": 7, "name": "widget"}],
                "total": 1
            }),
        }
    }

    #[test]
    fn test_assert_status() {
        assert!(response().assert_status(200).is_ok());
        assert!(response().assert_status(404).is_err());
    }

    #[test]
    fn test_field_pointer_lookup() {
        let resp = response();
        assert_eq!(resp.field("/items/0/id"), Some(&serde_json::json!(7)));
        assert!(resp.field("/items/9").is_none());
    }

    #[test]
    fn test_assert_field() {
        let resp = response();
        assert!(resp.assert_field("/total", &serde_json::json!(1)).is_ok());
        assert!(resp.assert_field("/total", &serde_json::json!(2)).is_err());
        assert!(resp.assert_field("/missing", &serde_json::json!(1)).is_err());
    }
}
