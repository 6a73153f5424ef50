//! Answer and report synthesis with literal fallbacks.

use super::outcome::StageOutcome;
use crate::generation::GenerationProvider;
use crate::types::{char_prefix, Chunk, Citation};

/// Terminal answer when no context survived retrieval.
pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found in the uploaded documents.";

/// Terminal report when criteria matched nothing.
pub const NO_STARTUPS_MATCHED: &str = "No startups matched the given criteria.";

const REASONING_UNAVAILABLE: &str =
    "AI reasoning is temporarily unavailable.\n\nRelevant extracted information:\n\n";
const REPORT_UNAVAILABLE: &str =
    "AI report generation unavailable.\n\nRelevant extracted information:\n\n";

/// Characters of raw context included in a fallback text.
pub const FALLBACK_CONTEXT_CHARS: usize = 1200;

/// Instruction handed to the generator for deal-flow reports.
pub const DEAL_FLOW_INSTRUCTION: &str = "Generate a deal flow report";

/// What is being synthesized; selects the literal texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Synthesis {
    Answer,
    Report,
}

impl Synthesis {
    pub fn empty_message(&self) -> &'static str {
        match self {
            Self::Answer => NO_RELEVANT_INFORMATION,
            Self::Report => NO_STARTUPS_MATCHED,
        }
    }

    fn unavailable_prefix(&self) -> &'static str {
        match self {
            Self::Answer => REASONING_UNAVAILABLE,
            Self::Report => REPORT_UNAVAILABLE,
        }
    }
}

/// Chunk contents separated by a blank line.
pub fn answer_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Chunk contents labelled `Startup N:` and separated by a blank line.
pub fn report_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, c)| format!("Startup {}:\n{}", i + 1, c.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fixed prefix followed by the head of the raw context.
pub fn fallback_text(kind: Synthesis, context: &str) -> String {
    format!(
        "{}{}",
        kind.unavailable_prefix(),
        char_prefix(context, FALLBACK_CONTEXT_CHARS)
    )
}

/// Generate text grounded in `context`.
///
/// Blank context yields the terminal literal without calling the
/// generator. A generator failure or an empty generation degrades to
/// [`fallback_text`].
pub async fn synthesize(
    generator: &dyn GenerationProvider,
    kind: Synthesis,
    instruction: &str,
    context: &str,
    citations: &[Citation],
) -> StageOutcome<String> {
    if context.trim().is_empty() {
        return StageOutcome::Succeeded(kind.empty_message().to_string());
    }

    match generator.generate(instruction, context, citations).await {
        Ok(text) if text.trim().is_empty() => {
            StageOutcome::degraded(fallback_text(kind, context), "generator returned empty text")
        }
        Ok(text) => StageOutcome::Succeeded(text),
        Err(e) => StageOutcome::degraded(
            fallback_text(kind, context),
            format!("generation failed: {}", e),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use venturegraph_core::{AppError, AppResult};

    struct CountingGenerator {
        calls: AtomicUsize,
        reply: Option<&'static str>,
    }

    impl CountingGenerator {
        fn ok(reply: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Some(reply),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: None,
            }
        }
    }

    #[async_trait]
    impl GenerationProvider for CountingGenerator {
        async fn generate(&self, _q: &str, _c: &str, _cites: &[Citation]) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .map(str::to_string)
                .ok_or_else(|| AppError::upstream("openai", "insufficient_quota"))
        }
    }

    #[test]
    fn test_contexts() {
        let chunks = vec![Chunk::new("1", "alpha"), Chunk::new("2", "beta")];
        assert_eq!(answer_context(&chunks), "alpha\n\nbeta");
        assert_eq!(report_context(&chunks), "Startup 1:\nalpha\n\nStartup 2:\nbeta");
        assert_eq!(answer_context(&[]), "");
    }

    #[tokio::test]
    async fn test_blank_context_skips_generator() {
        let generator = CountingGenerator::ok("unused");
        let outcome = synthesize(&generator, Synthesis::Answer, "q", "  \n ", &[]).await;

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value(), NO_RELEVANT_INFORMATION);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generated_text_passes_through() {
        let generator = CountingGenerator::ok("The ask is $2M [1].");
        let outcome = synthesize(&generator, Synthesis::Answer, "q", "ctx", &[]).await;
        assert_eq!(outcome.value(), "The ask is $2M [1].");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_uses_prefix_and_context_head() {
        let context = "x".repeat(2000);
        let outcome =
            synthesize(&CountingGenerator::failing(), Synthesis::Answer, "q", &context, &[]).await;

        assert!(outcome.is_degraded());
        let text = outcome.value();
        assert!(text.starts_with("AI reasoning is temporarily unavailable.\n\nRelevant extracted information:\n\n"));
        assert!(text.ends_with(&"x".repeat(FALLBACK_CONTEXT_CHARS)));
        assert_eq!(text.len(), REASONING_UNAVAILABLE.len() + FALLBACK_CONTEXT_CHARS);
    }

    #[tokio::test]
    async fn test_report_fallback_prefix() {
        let outcome = synthesize(
            &CountingGenerator::failing(),
            Synthesis::Report,
            DEAL_FLOW_INSTRUCTION,
            "Startup 1:\nAcme",
            &[],
        )
        .await;
        assert_eq!(
            outcome.value(),
            "AI report generation unavailable.\n\nRelevant extracted information:\n\nStartup 1:\nAcme"
        );
    }

    #[tokio::test]
    async fn test_empty_generation_degrades() {
        let outcome = synthesize(&CountingGenerator::ok("  "), Synthesis::Answer, "q", "ctx", &[]).await;
        assert!(outcome.is_degraded());
        assert!(outcome.value().ends_with("ctx"));
    }
}
