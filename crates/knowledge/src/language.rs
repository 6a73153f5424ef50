//! Language detection and translation gate.
//!
//! Detection is a pure script scan; translation goes through an LLM. The
//! pipeline works in the baseline language (English) and only leaves it to
//! hand the final answer back to the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use venturegraph_core::{AppError, AppResult};
use venturegraph_llm::{LlmClient, LlmRequest};
use venturegraph_prompt::{build_prompt, PromptDefinition};

/// Languages the gate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Ta,
}

impl Language {
    /// Language every retrieval and synthesis stage runs in.
    pub const BASELINE: Language = Language::En;

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Ta => "ta",
        }
    }

    /// English display name, used in translation instructions.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hindi",
            Self::Ta => "Tamil",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Self::En),
            "hi" | "hindi" => Some(Self::Hi),
            "ta" | "tamil" => Some(Self::Ta),
            _ => None,
        }
    }

    pub fn is_baseline(&self) -> bool {
        *self == Self::BASELINE
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Classifies text into one of the supported languages. Must be pure.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Language;
}

/// Detects Hindi and Tamil by their Unicode script blocks.
///
/// Devanagari wins when a text mixes both scripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptDetector;

const DEVANAGARI: std::ops::RangeInclusive<char> = '\u{0900}'..='\u{097F}';
const TAMIL: std::ops::RangeInclusive<char> = '\u{0B80}'..='\u{0BFF}';

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> Language {
        if text.chars().any(|c| DEVANAGARI.contains(&c)) {
            Language::Hi
        } else if text.chars().any(|c| TAMIL.contains(&c)) {
            Language::Ta
        } else {
            Language::En
        }
    }
}

/// Translates text into a target language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: Language) -> AppResult<String>;
}

/// Translator backed by a chat-completion model.
pub struct LlmTranslator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl LlmTranslator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
        }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, text: &str, target: Language) -> AppResult<String> {
        let built = build_prompt(
            &self.prompt,
            &serde_json::json!({ "language": target.display_name(), "text": text }),
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

        let response = self.client.complete(&request).await?;
        let translated = response.content.trim();

        if translated.is_empty() {
            tracing::warn!("Empty translation into {}, keeping source text", target);
            Ok(text.to_string())
        } else {
            Ok(translated.to_string())
        }
    }
}

/// Detection plus translation, with the same-language shortcut applied
/// before any provider is touched.
#[derive(Clone)]
pub struct LanguageGate {
    detector: Arc<dyn LanguageDetector>,
    translator: Arc<dyn Translator>,
}

impl LanguageGate {
    pub fn new(detector: Arc<dyn LanguageDetector>, translator: Arc<dyn Translator>) -> Self {
        Self {
            detector,
            translator,
        }
    }

    pub fn detect(&self, text: &str) -> Language {
        self.detector.detect(text)
    }

    /// Translate `text` from `source` into `target`.
    ///
    /// Same-language translation is the identity and never reaches the
    /// translator, so baseline text rendered into the baseline costs
    /// nothing. Provider errors propagate.
    pub async fn translate(&self, text: &str, source: Language, target: Language) -> AppResult<String> {
        if source == target {
            return Ok(text.to_string());
        }
        self.translator.translate(text, target).await
    }
}

/// Result of a standalone translate operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub original_text: String,
    pub detected_language: Language,
    pub translated_text: String,
    pub target_language: Language,
}

/// Detect the language of `text` and translate it into `target`.
///
/// Without a target the text is rendered into the baseline language.
/// Translating into the detected language returns the text unchanged.
pub async fn translate_request(
    gate: &LanguageGate,
    text: &str,
    target: Option<Language>,
) -> AppResult<TranslateResponse> {
    if text.trim().is_empty() {
        return Err(AppError::Request("Text is required".to_string()));
    }

    let detected = gate.detect(text);
    let target = target.unwrap_or(Language::BASELINE);

    let translated_text = gate.translate(text, detected, target).await?;

    Ok(TranslateResponse {
        original_text: text.to_string(),
        detected_language: detected,
        translated_text,
        target_language: target,
    })
}
