//! Embedding providers.
//!
//! Text goes in, a fixed-dimension vector comes out. Bulk embedding is
//! sequential with a per-provider pacing delay between calls.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{GoogleEmbeddingProvider, MockProvider};
