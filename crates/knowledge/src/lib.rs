//! Retrieval-augmented answering over uploaded startup documents.
//!
//! Documents are parsed, windowed, embedded and stored in SQLite. Two
//! pipelines run on top: query answering (with translation, web
//! corroboration and reranking) and deal-flow matching against investor
//! criteria. Every external service sits behind a trait and is handed in
//! through [`Collaborators`].

pub mod chunker;
pub mod deps;
pub mod embeddings;
pub mod generation;
pub mod ingest;
pub mod language;
pub mod parser;
pub mod rag;
pub mod request;
pub mod rerank;
pub mod store;
pub mod types;
pub mod websearch;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use deps::Collaborators;
pub use ingest::{ingest_document, ingest_path, IngestOptions, IngestStats};
pub use language::{translate_request, Language, LanguageGate, TranslateResponse};
pub use rag::{run_deal_flow_pipeline, run_query_pipeline, DealFlowState, Degradation, QueryState, Stage};
pub use request::{DealFlowRequest, DealFlowResponse, QueryRequest, QueryResponse};
pub use types::{Chunk, ChunkMetadata, Citation, DealCriteria, StartupMatch, TicketRange};
pub use websearch::{background_check, WebSnapshot};
