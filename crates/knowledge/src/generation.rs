//! Grounded text generation.

use crate::types::Citation;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use venturegraph_core::AppResult;
use venturegraph_llm::{LlmClient, LlmRequest};
use venturegraph_prompt::{build_prompt, PromptDefinition};

/// Produces an answer from a question, its context and the numbered
/// citations backing that context.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, query: &str, context: &str, citations: &[Citation]) -> AppResult<String>;
}

#[derive(Serialize)]
struct NumberedCitation<'a> {
    number: usize,
    source: &'a str,
    excerpt: &'a str,
}

/// Generation over a chat-completion model with the analyst prompt.
pub struct LlmGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl LlmGenerator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
        }
    }
}

#[async_trait]
impl GenerationProvider for LlmGenerator {
    async fn generate(&self, query: &str, context: &str, citations: &[Citation]) -> AppResult<String> {
        let numbered: Vec<NumberedCitation<'_>> = citations
            .iter()
            .enumerate()
            .map(|(i, c)| NumberedCitation {
                number: i + 1,
                source: &c.source,
                excerpt: &c.excerpt,
            })
            .collect();

        let built = build_prompt(
            &self.prompt,
            &serde_json::json!({
                "question": query,
                "context": context,
                "citations": numbered,
            }),
        )?;

        let mut request = LlmRequest::new(built.user, self.model.clone());
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        if let Some(temperature) = built.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = built.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        tracing::debug!(
            model = %self.model,
            citations = citations.len(),
            "Requesting grounded generation"
        );

        let response = self.client.complete(&request).await?;
        Ok(response.content)
    }
}
