//! Configuration management for VentureGraph.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (`.venturegraph/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! Secrets never live in the config file. Every provider section names the
//! environment variable that carries its key instead.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Name of the per-workspace state directory.
pub const STATE_DIR: &str = ".venturegraph";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .venturegraph/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider used for translation and generation ("openai", "ollama")
    pub provider: String,

    /// Model identifier for the LLM provider
    pub model: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// External retrieval-side services
    pub services: ServicesConfig,

    /// Vector store settings
    pub store: StoreConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
    },
}

/// One external HTTP service (embedding, rerank, web search, document parsing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Implementation name, e.g. "google", "jina", "tavily", "llamaparse", "mock"
    pub provider: String,

    /// Base URL of the service API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Model identifier, for services that take one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl ServiceConfig {
    fn new(provider: &str, endpoint: &str, model: Option<&str>, api_key_env: &str) -> Self {
        Self {
            provider: provider.to_string(),
            endpoint: Some(endpoint.to_string()),
            model: model.map(str::to_string),
            api_key_env: Some(api_key_env.to_string()),
        }
    }

    /// Resolve the API key from the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty())
    }
}

/// Settings for every retrieval-side collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesConfig {
    #[serde(default = "default_embedding_service")]
    pub embedding: ServiceConfig,

    #[serde(default = "default_rerank_service")]
    pub rerank: ServiceConfig,

    #[serde(default = "default_web_search_service")]
    pub web_search: ServiceConfig,

    #[serde(default = "default_parser_service")]
    pub parser: ServiceConfig,
}

fn default_embedding_service() -> ServiceConfig {
    ServiceConfig::new(
        "google",
        "https://generativelanguage.googleapis.com/v1beta",
        Some("text-embedding-004"),
        "GOOGLE_EMBEDDING_API_KEY",
    )
}

fn default_rerank_service() -> ServiceConfig {
    ServiceConfig::new(
        "jina",
        "https://api.jina.ai/v1",
        Some("jina-reranker-v2-base-multilingual"),
        "JINA_API_KEY",
    )
}

fn default_web_search_service() -> ServiceConfig {
    ServiceConfig::new("tavily", "https://api.tavily.com", None, "TAVILY_API_KEY")
}

fn default_parser_service() -> ServiceConfig {
    ServiceConfig::new(
        "llamaparse",
        "https://api.cloud.llamaindex.ai/api/parsing",
        None,
        "LLAMAPARSE_API_KEY",
    )
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            embedding: default_embedding_service(),
            rerank: default_rerank_service(),
            web_search: default_web_search_service(),
            parser: default_parser_service(),
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path, relative to the workspace unless absolute
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(STATE_DIR).join("store.sqlite"),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    services: Option<ServicesConfig>,
    store: Option<StoreConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
            llm: None,
            services: ServicesConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML config file and environment variables.
    ///
    /// Environment variables:
    /// - `VENTUREGRAPH_WORKSPACE`: Override workspace path
    /// - `VENTUREGRAPH_CONFIG`: Path to config file
    /// - `VENTUREGRAPH_PROVIDER`: LLM provider
    /// - `VENTUREGRAPH_MODEL`: Model identifier
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use venturegraph_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("VENTUREGRAPH_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("VENTUREGRAPH_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.state_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("VENTUREGRAPH_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("VENTUREGRAPH_MODEL") {
            config.model = model;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> AppResult<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;
        let mut result = self.clone();

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        if let Some(services) = config_file.services {
            result.services = services;
        }

        if let Some(store) = config_file.store {
            result.store = store;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = match provider_config {
                    ProviderConfig::OpenAI { model, .. } => model.clone(),
                    ProviderConfig::Ollama { model, .. } => model.clone(),
                };
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and YAML.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        log_json: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if log_json {
            self.log_json = true;
        }

        self
    }

    /// Get the path to the .venturegraph directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(STATE_DIR)
    }

    /// Ensure the .venturegraph directory exists.
    pub fn ensure_state_dir(&self) -> AppResult<()> {
        let state_dir = self.state_dir();
        if !state_dir.exists() {
            std::fs::create_dir_all(&state_dir).map_err(|e| {
                AppError::Config(format!("Failed to create {} directory: {}", STATE_DIR, e))
            })?;
        }
        Ok(())
    }

    /// Absolute path of the SQLite vector store.
    pub fn store_path(&self) -> PathBuf {
        if self.store.path.is_absolute() {
            self.store.path.clone()
        } else {
            self.workspace.join(&self.store.path)
        }
    }

    /// Get the configuration for a named LLM provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Resolve the endpoint configured for an LLM provider, if any.
    pub fn resolve_endpoint(&self, provider: &str) -> Option<String> {
        match self.get_provider_config(provider)? {
            ProviderConfig::OpenAI { endpoint, .. } => endpoint,
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint),
        }
    }

    /// Resolve the API key for an LLM provider from its environment variable.
    ///
    /// OpenAI falls back to `OPENAI_API_KEY` when no provider section exists.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        let env_var = match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => Some(api_key_env),
            Some(ProviderConfig::Ollama { .. }) => None,
            None if provider.eq_ignore_ascii_case("openai") => Some("OPENAI_API_KEY".to_string()),
            None => None,
        }?;

        std::env::var(env_var).ok().filter(|key| !key.is_empty())
    }

    /// Validate configuration for the active provider and services.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["openai", "ollama"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.provider == "openai" && self.resolve_api_key("openai").is_none() {
            return Err(AppError::Config(
                "API key not found for provider openai (set OPENAI_API_KEY or apiKeyEnv)"
                    .to_string(),
            ));
        }

        let keyed_services = [
            ("embedding", &self.services.embedding, "google"),
            ("rerank", &self.services.rerank, "jina"),
            ("webSearch", &self.services.web_search, "tavily"),
            ("parser", &self.services.parser, "llamaparse"),
        ];

        for (name, service, keyed_provider) in keyed_services {
            if service.provider == keyed_provider && service.resolve_api_key().is_none() {
                return Err(AppError::Config(format!(
                    "API key for {} service '{}' not found in environment variable: {}",
                    name,
                    service.provider,
                    service.api_key_env.as_deref().unwrap_or("<unset>")
                )));
            }
        }

        Ok(())
    }
}
