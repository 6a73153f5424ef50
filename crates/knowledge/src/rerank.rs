//! Cross-encoder reranking providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use venturegraph_core::{AppError, AppResult};

const DEFAULT_BASE_URL: &str = "https://api.jina.ai/v1";
const DEFAULT_MODEL: &str = "jina-reranker-v2-base-multilingual";

/// Position of a document in the submitted list, with its relevance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankHit {
    pub index: usize,
    pub relevance_score: f64,
}

/// Scores documents against a query.
///
/// Implementations return at most `top_n` hits, highest score first.
#[async_trait]
pub trait RerankProvider: Send + Sync {
    async fn rerank(&self, query: &str, documents: &[String], top_n: usize) -> AppResult<Vec<RerankHit>>;
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    #[serde(default)]
    results: Vec<RerankHit>,
}

/// Jina AI rerank API client.
pub struct JinaReranker {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl JinaReranker {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
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
}

#[async_trait]
impl RerankProvider for JinaReranker {
    async fn rerank(&self, query: &str, documents: &[String], top_n: usize) -> AppResult<Vec<RerankHit>> {
        tracing::debug!(documents = documents.len(), top_n, model = %self.model, "Reranking with Jina");

        let response = self
            .client
            .post(format!("{}/rerank", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&RerankRequest {
                model: &self.model,
                query,
                documents,
                top_n,
            })
            .send()
            .await
            .map_err(|e| AppError::upstream("jina", format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::upstream(
                "jina",
                format!("API error ({}): {}", status, error_text),
            ));
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream("jina", format!("Failed to parse response: {}", e)))?;

        let mut hits = parsed.results;
        hits.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_n);

        Ok(hits)
    }
}

/// Stand-in used when reranking is switched off; every call fails so the
/// pipeline keeps its deterministic fallback order.
#[derive(Debug, Default)]
pub struct DisabledReranker;

#[async_trait]
impl RerankProvider for DisabledReranker {
    async fn rerank(&self, _query: &str, _documents: &[String], _top_n: usize) -> AppResult<Vec<RerankHit>> {
        Err(AppError::upstream("rerank", "reranking is disabled"))
    }
}
