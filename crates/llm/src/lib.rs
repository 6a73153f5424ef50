//! LLM integration crate for VentureGraph.
//!
//! This crate provides a provider-agnostic abstraction for chat-style
//! completions. Translation and answer generation in the knowledge crate
//! are built on top of [`LlmClient`].
//!
//! # Providers
//! - **OpenAI**: chat completions API (default, `gpt-4o-mini`)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use venturegraph_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use types::ProviderType;
