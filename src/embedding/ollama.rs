use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Embedder;
use crate::app_config::EmbeddingConfig;
use crate::errors::{EmbeddingError, ProviderError};

/// Embedding client for a local Ollama server
#[derive(Debug)]
pub struct OllamaEmbedder {
    /// Base URL of the Ollama API
    base_url: String,
    /// Embedding model name
    model: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Embeddings request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Model name to use
    model: String,
    /// Text to embed
    prompt: String,
}

/// Embeddings response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// Embedding vector
    pub embedding: Vec<f32>,
}

impl OllamaEmbedder {
    /// Create a client from the embedding configuration
    ///
    /// Uses connection pooling for concurrent requests. Ollama speaks HTTP/1.1.
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .pool_max_idle_per_host(config.concurrent_requests.max(1))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request an embedding with retry logic
    ///
    /// Server and network errors are retried with exponential backoff; client
    /// errors fail immediately.
    pub async fn request_embedding(&self, prompt: &str) -> Result<Vec<f32>, ProviderError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
        };

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            match self.client.post(&url).json(&request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let response_text = response.text().await.map_err(|e| {
                            ProviderError::RequestFailed(format!(
                                "Failed to get response text from Ollama API: {}",
                                e
                            ))
                        })?;
                        return parse_embedding_response(&response_text);
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to get error response text".to_string());

                    if status.is_server_error() {
                        error!(
                            "Ollama API error ({}): {} - attempt {}/{}",
                            status,
                            error_text,
                            attempt + 1,
                            self.max_retries + 1
                        );
                        last_error = Some(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message: error_text,
                        });
                    } else {
                        error!("Ollama API error ({}): {}", status, error_text);
                        return Err(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message: error_text,
                        });
                    }
                }
                Err(e) => {
                    error!(
                        "Ollama API network error: {} - attempt {}/{}",
                        e,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(ProviderError::ConnectionError(format!(
                        "Failed to send request to Ollama API: {}",
                        e
                    )));
                }
            }

            attempt += 1;

            if attempt <= self.max_retries {
                let backoff_ms = self.backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(16));
                debug!("Retrying embedding request in {}ms", backoff_ms);
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RequestFailed(format!(
                "Ollama API request failed after {} attempts",
                self.max_retries + 1
            ))
        }))
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let vector = self.request_embedding(text).await?;
        if vector.is_empty() {
            return Err(EmbeddingError::Empty(text.to_string()));
        }
        Ok(vector)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Parse an embeddings response body
///
/// Falls back to a lenient read of `embedding` (or the first row of
/// `embeddings`, as returned by `/api/embed`) when strict parsing fails.
pub fn parse_embedding_response(response_text: &str) -> Result<Vec<f32>, ProviderError> {
    match serde_json::from_str::<EmbeddingResponse>(response_text) {
        Ok(response) => Ok(response.embedding),
        Err(e) => {
            error!(
                "Failed to parse Ollama API embeddings response: {}. Raw response (first 500 chars): {}",
                e,
                response_text.chars().take(500).collect::<String>()
            );

            let value = serde_json::from_str::<serde_json::Value>(response_text).map_err(|_| {
                ProviderError::ParseError(format!(
                    "Failed to parse Ollama API embeddings response: {}. Response contains invalid JSON.",
                    e
                ))
            })?;

            let array = value
                .get("embedding")
                .and_then(|v| v.as_array())
                .or_else(|| {
                    value
                        .get("embeddings")
                        .and_then(|v| v.as_array())
                        .and_then(|rows| rows.first())
                        .and_then(|row| row.as_array())
                });

            let embedding: Vec<f32> = array
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect()
                })
                .unwrap_or_default();

            if embedding.is_empty() {
                return Err(ProviderError::ParseError(
                    "Failed to extract embedding from Ollama API response".to_string(),
                ));
            }

            Ok(embedding)
        }
    }
}
