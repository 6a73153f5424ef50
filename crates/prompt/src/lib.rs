//! Prompt system for VentureGraph.
//!
//! This crate provides structured prompt management with:
//! - Built-in prompt definitions for answer synthesis and translation
//! - YAML overrides loaded from `.venturegraph/prompts/`
//! - Handlebars template rendering for both system and user messages

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{
    builtin_prompt, list_prompts, load_prompt, unknown_overrides, REASONING_PROMPT, TRANSLATE_PROMPT,
};
pub use types::{BuiltPrompt, PromptDefinition};
