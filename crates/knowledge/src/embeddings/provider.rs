//! Embedding provider trait and factory.

use super::providers::{GoogleEmbeddingProvider, MockProvider};
use std::sync::Arc;
use std::time::Duration;
use venturegraph_core::config::ServiceConfig;
use venturegraph_core::{AppError, AppResult};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "google", "mock")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Delay inserted between consecutive calls of a bulk run.
    fn pacing(&self) -> Duration {
        Duration::ZERO
    }

    /// Embed one text. Empty or malformed vectors are errors.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Embed texts one at a time, sleeping [`pacing`](Self::pacing) between calls.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let pacing = self.pacing();
        let mut vectors = Vec::with_capacity(texts.len());

        for (i, text) in texts.iter().enumerate() {
            if i > 0 && !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
            vectors.push(self.embed(text).await?);
        }

        Ok(vectors)
    }
}

/// Create an embedding provider from the `services.embedding` section.
pub fn create_provider(config: &ServiceConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "google" => {
            let api_key = config.resolve_api_key().ok_or_else(|| {
                AppError::Config(format!(
                    "Google embedding API key not found. Set {}",
                    config.api_key_env.as_deref().unwrap_or("GOOGLE_EMBEDDING_API_KEY")
                ))
            })?;

            let mut provider = GoogleEmbeddingProvider::new(api_key);
            if let Some(endpoint) = &config.endpoint {
                provider = provider.with_base_url(endpoint);
            }
            if let Some(model) = &config.model {
                provider = provider.with_model(model);
            }
            Ok(Arc::new(provider))
        }

        "mock" => Ok(Arc::new(MockProvider::new(MockProvider::DEFAULT_DIMENSIONS))),

        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: google, mock",
            other
        ))),
    }
}
