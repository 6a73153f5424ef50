//! Google Generative Language embedding provider (`embedContent`).

use crate::embeddings::provider::EmbeddingProvider;
use serde::Deserialize;
use std::time::Duration;
use venturegraph_core::{AppError, AppResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "text-embedding-004";
const DIMENSIONS: usize = 768;

/// Pause between consecutive bulk calls to stay under the rate limit.
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    #[serde(default)]
    embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

/// Client for `models/{model}:embedContent`.
pub struct GoogleEmbeddingProvider {
    base_url: String,
    model: String,
    api_key: String,
    pacing: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for GoogleEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleEmbeddingProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}

impl GoogleEmbeddingProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            pacing: DEFAULT_PACING,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for GoogleEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    fn pacing(&self) -> Duration {
        self.pacing
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}/models/{}:embedContent", self.base_url, self.model);
        let body = serde_json::json!({
            "model": format!("models/{}", self.model),
            "content": { "parts": [{ "text": text }] }
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::upstream("google-embedding", format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::upstream(
                "google-embedding",
                format!("API error ({}): {}", status, error_text),
            ));
        }

        let parsed: EmbedContentResponse = response.json().await.map_err(|e| {
            AppError::upstream("google-embedding", format!("Failed to parse response: {}", e))
        })?;

        let values = parsed.embedding.map(|e| e.values).unwrap_or_default();
        if values.is_empty() {
            return Err(AppError::upstream(
                "google-embedding",
                "Embedding generation failed: empty vector returned",
            ));
        }

        Ok(values)
    }
}
