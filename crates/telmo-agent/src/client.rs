//! HTTP client for the telmo backend.
//!
//! The client never surfaces errors as `Result`: every call produces an
//! [`ApiOutcome`] for the classifier, including transport failures and
//! bodies that are not JSON. The adapter must always have something to
//! classify.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::adapter::BackendApi;
use crate::classifier::ApiOutcome;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Options for constructing a [`BackendClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// API key sent as `x-api-key`, when the backend requires one.
    pub api_key: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            api_key: None,
        }
    }
}

/// Telmo backend API client.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BackendClient {
    /// Create a client with default options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen
    /// with default settings).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen
    /// with default settings).
    #[must_use]
    pub fn with_options(base_url: impl Into<String>, options: ClientOptions) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: options.api_key,
        }
    }

    /// POST a JSON body to a backend path and capture the raw outcome.
    pub async fn post(&self, path: &str, body: &Value) -> ApiOutcome {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "backend request failed");
                return ApiOutcome::transport(err.to_string());
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "failed to read backend response");
                return ApiOutcome::transport(err.to_string());
            }
        };

        let body = if text.is_empty() {
            None
        } else {
            // A body that is not JSON still reaches the classifier, as
            // a string, so the verdict can preserve it.
            Some(
                serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text)),
            )
        };

        ApiOutcome::http(status, body)
    }
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn invoke(&self, path: &str, body: &Value) -> ApiOutcome {
        self.post(path, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_json_and_parses_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkBalance"))
            .and(body_json(json!({"phone_number": "771234567"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "success", "credit_balance": 1500})),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let outcome = client
            .post("/v1/checkBalance", &json!({"phone_number": "771234567"}))
            .await;

        assert_eq!(outcome.status_code, 200);
        assert_eq!(
            outcome.body,
            Some(json!({"status": "success", "credit_balance": 1500}))
        );
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn sends_api_key_header_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transferMoney"))
            .and(header("x-api-key", "sekret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .mount(&server)
            .await;

        let client = BackendClient::with_options(
            server.uri(),
            ClientOptions {
                api_key: Some("sekret".into()),
                ..ClientOptions::default()
            },
        );
        let outcome = client.post("/v1/transferMoney", &json!({})).await;
        assert_eq!(outcome.status_code, 200);
    }

    #[tokio::test]
    async fn non_json_body_is_preserved_as_a_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkBalance"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let outcome = client.post("/v1/checkBalance", &json!({})).await;
        assert_eq!(outcome.status_code, 502);
        assert_eq!(outcome.body, Some(json!("Bad Gateway")));
    }

    #[tokio::test]
    async fn connection_failure_becomes_a_transport_outcome() {
        // Unroutable port: the server was dropped before the call.
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let client = BackendClient::new(uri);
        let outcome = client.post("/v1/checkBalance", &json!({})).await;
        assert_eq!(outcome.status_code, 502);
        assert!(outcome.error.is_some());
        assert!(outcome.body.is_none());
    }
}
