//! HTTP generation adapter - talks to the external generation service.
//!
//! Implements both generation ports against a single JSON-over-HTTP
//! service: `POST {base_url}/generate/text` and
//! `POST {base_url}/generate/image`. Authentication is a bearer token kept
//! behind `secrecy` so it never lands in logs or debug output.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::domain::journey::ImageRef;
use crate::domain::personalization::StyleProfile;
use crate::ports::{
    GeneratedText, GenerationContext, GenerationError, ImageGenerator, TextGenerator,
};

/// Configuration for the HTTP generation client.
#[derive(Debug, Clone)]
pub struct HttpGenerationConfig {
    api_key: Secret<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpGenerationConfig {
    /// Creates a configuration with the given API key.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: base_url.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// HTTP client implementing `TextGenerator` and `ImageGenerator`.
pub struct HttpGenerationClient {
    config: HttpGenerationConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct TextRequestBody<'a> {
    context: &'a GenerationContext,
}

#[derive(Debug, Deserialize)]
struct TextResponseBody {
    text: String,
    #[serde(default)]
    provider: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequestBody<'a> {
    prompt: &'a str,
    style: &'a StyleProfile,
}

#[derive(Debug, Deserialize)]
struct ImageResponseBody {
    image_ref: String,
}

impl HttpGenerationClient {
    /// Creates a client with the given configuration.
    pub fn new(config: HttpGenerationConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, GenerationError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(self.config.api_key())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else {
                    GenerationError::network(e.to_string())
                }
            })?;

        match response.status() {
            status if status.is_success() => response
                .json::<R>()
                .await
                .map_err(|e| GenerationError::network(format!("malformed response: {}", e))),
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                let detail = response.text().await.unwrap_or_default();
                Err(GenerationError::invalid_context(detail))
            }
            status if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS => {
                Err(GenerationError::unavailable(format!("HTTP {}", status)))
            }
            status => Err(GenerationError::network(format!(
                "unexpected status {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl TextGenerator for HttpGenerationClient {
    async fn generate_text(
        &self,
        context: &GenerationContext,
    ) -> Result<GeneratedText, GenerationError> {
        debug!(stage = %context.stage, "requesting text generation");
        let body: TextResponseBody = self
            .post("generate/text", &TextRequestBody { context })
            .await?;
        Ok(GeneratedText {
            text: body.text,
            provider: body.provider.unwrap_or_else(|| "http".to_string()),
        })
    }
}

#[async_trait]
impl ImageGenerator for HttpGenerationClient {
    async fn generate_image(
        &self,
        prompt: &str,
        style: &StyleProfile,
    ) -> Result<ImageRef, GenerationError> {
        debug!("requesting image generation");
        let body: ImageResponseBody = self
            .post("generate/image", &ImageRequestBody { prompt, style })
            .await?;
        ImageRef::new(body.image_ref)
            .map_err(|e| GenerationError::network(format!("empty image_ref in response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = HttpGenerationClient::new(HttpGenerationConfig::new(
            "key",
            "https://generation.example.com/",
        ));
        assert_eq!(
            client.url("generate/text"),
            "https://generation.example.com/generate/text"
        );
    }

    #[test]
    fn api_key_is_not_in_debug_output() {
        let config = HttpGenerationConfig::new("super-secret", "https://example.com");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn config_timeout_is_overridable() {
        let config = HttpGenerationConfig::new("key", "https://example.com")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
