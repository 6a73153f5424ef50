//! Document store: hybrid retrieval, criteria filtering and chunk storage.

pub mod scoring;
pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::types::{Chunk, ChunkMetadata, DealCriteria};
use async_trait::async_trait;
use venturegraph_core::AppResult;

/// Weight of vector similarity in the hybrid blend; lexical gets the rest.
pub const HYBRID_ALPHA: f32 = 0.7;

/// Storage engine consumed by the pipelines.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Up to `limit` chunks ordered by blended vector + lexical relevance.
    async fn hybrid_search(&self, query: &str, vector: &[f32], limit: usize) -> AppResult<Vec<Chunk>>;

    /// Up to `limit` chunks passing every predicate in `criteria`, in storage order.
    async fn criteria_search(&self, criteria: &DealCriteria, limit: usize) -> AppResult<Vec<Chunk>>;

    /// Store `chunks` with their `vectors` under `file_name`, returning how
    /// many were new. Text already stored for the same file and page is skipped.
    async fn store(&self, chunks: &[Chunk], vectors: &[Vec<f32>], file_name: &str) -> AppResult<usize>;
}

/// Apply the deal-flow predicates in order: sector, stage, ticket size.
///
/// All three always apply. A chunk passes the sector check when any
/// requested sector is among its tags; a missing ticket size counts as 0.
pub fn matches_criteria(metadata: &ChunkMetadata, criteria: &DealCriteria) -> bool {
    let in_sector = metadata
        .sector
        .as_ref()
        .is_some_and(|tags| criteria.sector.iter().any(|s| tags.contains(s)));
    if !in_sector {
        return false;
    }

    if metadata.stage.as_deref() != Some(criteria.stage.as_str()) {
        return false;
    }

    criteria
        .ticket_size
        .contains(metadata.ticket_size.unwrap_or(0.0))
}
