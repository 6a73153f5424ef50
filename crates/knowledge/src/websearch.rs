//! Web search used for corroboration and company background checks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use venturegraph_core::{AppError, AppResult};

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Results fetched for a background check.
pub const BACKGROUND_CHECK_RESULTS: usize = 5;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSnapshot {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl WebSnapshot {
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            content: content.into(),
            score: None,
        }
    }
}

/// Independent web search provider.
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<WebSnapshot>>;
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    raw_content: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

impl From<TavilyResult> for WebSnapshot {
    fn from(result: TavilyResult) -> Self {
        let content = result
            .content
            .filter(|c| !c.is_empty())
            .or(result.raw_content)
            .unwrap_or_default();

        Self {
            title: result.title.unwrap_or_default(),
            url: result.url.unwrap_or_default(),
            content,
            score: result.score,
        }
    }
}

/// Tavily search API client.
pub struct TavilyClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl WebSearchProvider for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<WebSnapshot>> {
        tracing::debug!(max_results, "Searching Tavily");

        let body = TavilyRequest {
            api_key: &self.api_key,
            query,
            search_depth: "basic",
            max_results,
            include_answer: false,
            include_raw_content: true,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::upstream("tavily", format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::upstream(
                "tavily",
                format!("API error ({}): {}", status, error_text),
            ));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream("tavily", format!("Failed to parse response: {}", e)))?;

        Ok(parsed.results.into_iter().map(WebSnapshot::from).collect())
    }
}

/// Stand-in used when web search is switched off; every call fails so
/// corroboration takes its fallback path.
#[derive(Debug, Default)]
pub struct DisabledWebSearch;

#[async_trait]
impl WebSearchProvider for DisabledWebSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> AppResult<Vec<WebSnapshot>> {
        Err(AppError::upstream("web-search", "web search is disabled"))
    }
}

/// Recent funding news about a company.
pub async fn background_check(
    provider: &dyn WebSearchProvider,
    company: &str,
) -> AppResult<Vec<WebSnapshot>> {
    let company = company.trim();
    if company.is_empty() {
        return Err(AppError::Request("Company name is required".to_string()));
    }

    let query = format!("{} startup funding news", company);
    tracing::info!(company, "Running background check");
    provider.search(&query, BACKGROUND_CHECK_RESULTS).await
}
