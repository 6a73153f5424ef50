//! Explicitly constructed collaborator set handed to the pipelines.

use crate::embeddings::{self, EmbeddingProvider};
use crate::generation::{GenerationProvider, LlmGenerator};
use crate::language::{LanguageDetector, LanguageGate, LlmTranslator, ScriptDetector, Translator};
use crate::parser::{self, DocumentParser};
use crate::rerank::{DisabledReranker, JinaReranker, RerankProvider};
use crate::store::{SqliteStore, VectorStore};
use crate::websearch::{DisabledWebSearch, TavilyClient, WebSearchProvider};
use std::sync::Arc;
use venturegraph_core::config::{AppConfig, ServiceConfig};
use venturegraph_core::{AppError, AppResult};
use venturegraph_prompt::{load_prompt, unknown_overrides, REASONING_PROMPT, TRANSLATE_PROMPT};

/// One handle per external collaborator.
///
/// Built once at startup; the pipelines never read configuration or the
/// environment themselves. Tests assemble this from fakes.
#[derive(Clone)]
pub struct Collaborators {
    pub detector: Arc<dyn LanguageDetector>,
    pub translator: Arc<dyn Translator>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub store: Arc<dyn VectorStore>,
    pub web_search: Arc<dyn WebSearchProvider>,
    pub reranker: Arc<dyn RerankProvider>,
    pub generator: Arc<dyn GenerationProvider>,
    pub parser: Arc<dyn DocumentParser>,
}

impl Collaborators {
    /// Build every collaborator from configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let endpoint = config.resolve_endpoint(&config.provider);
        let api_key = config.resolve_api_key(&config.provider);
        let llm = venturegraph_llm::create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())
            .map_err(|e| AppError::Config(format!("Failed to create LLM client: {}", e)))?;

        let translate_prompt = load_prompt(&config.workspace, TRANSLATE_PROMPT)?;
        let reasoning_prompt = load_prompt(&config.workspace, REASONING_PROMPT)?;
        for id in unknown_overrides(&config.workspace)? {
            tracing::warn!("Ignoring prompt override '{}': no prompt has that ID", id);
        }

        let store = SqliteStore::open(&config.store_path())?;

        let embedder = embeddings::create_provider(&config.services.embedding)?;

        tracing::debug!(
            provider = %config.provider,
            model = %config.model,
            embedding = %config.services.embedding.provider,
            embedding_model = embedder.model_name(),
            dimensions = embedder.dimensions(),
            rerank = %config.services.rerank.provider,
            web_search = %config.services.web_search.provider,
            parser = %config.services.parser.provider,
            "Constructing collaborators"
        );

        Ok(Self {
            detector: Arc::new(ScriptDetector),
            translator: Arc::new(LlmTranslator::new(llm.clone(), &config.model, translate_prompt)),
            embedder,
            store: Arc::new(store),
            web_search: create_web_search(&config.services.web_search)?,
            reranker: create_reranker(&config.services.rerank)?,
            generator: Arc::new(LlmGenerator::new(llm, &config.model, reasoning_prompt)),
            parser: parser::create_parser(&config.services.parser)?,
        })
    }

    pub fn language_gate(&self) -> LanguageGate {
        LanguageGate::new(self.detector.clone(), self.translator.clone())
    }
}

fn required_key(name: &str, config: &ServiceConfig) -> AppResult<String> {
    config.resolve_api_key().ok_or_else(|| {
        AppError::Config(format!(
            "{} API key not found. Set {}",
            name,
            config.api_key_env.as_deref().unwrap_or("<apiKeyEnv>")
        ))
    })
}

fn create_reranker(config: &ServiceConfig) -> AppResult<Arc<dyn RerankProvider>> {
    match config.provider.as_str() {
        "jina" => {
            let mut reranker = JinaReranker::new(required_key("Jina", config)?);
            if let Some(endpoint) = &config.endpoint {
                reranker = reranker.with_base_url(endpoint);
            }
            if let Some(model) = &config.model {
                reranker = reranker.with_model(model);
            }
            Ok(Arc::new(reranker))
        }
        "none" => Ok(Arc::new(DisabledReranker)),
        other => Err(AppError::Config(format!(
            "Unknown rerank provider: '{}'. Supported providers: jina, none",
            other
        ))),
    }
}

fn create_web_search(config: &ServiceConfig) -> AppResult<Arc<dyn WebSearchProvider>> {
    match config.provider.as_str() {
        "tavily" => {
            let api_key = required_key("Tavily", config)?;
            let client = match &config.endpoint {
                Some(endpoint) => TavilyClient::with_base_url(endpoint, api_key),
                None => TavilyClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        "none" => Ok(Arc::new(DisabledWebSearch)),
        other => Err(AppError::Config(format!(
            "Unknown web search provider: '{}'. Supported providers: tavily, none",
            other
        ))),
    }
}
