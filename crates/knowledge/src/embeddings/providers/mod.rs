//! Embedding provider implementations.

pub mod google;
pub mod mock;

pub use google::GoogleEmbeddingProvider;
pub use mock::MockProvider;
