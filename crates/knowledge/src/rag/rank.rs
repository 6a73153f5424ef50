//! Reranking stage.

use super::citations::RankedChunks;
use super::outcome::StageOutcome;
use crate::rerank::{RerankHit, RerankProvider};
use crate::types::Chunk;
use std::collections::HashSet;

/// Maximum number of chunks the reranker returns.
pub const RERANK_TOP_N: usize = 10;

/// Chunks kept, in retrieval order, when reranking fails.
pub const FALLBACK_KEEP: usize = 5;

/// Order `candidates` by the provider's relevance ranking.
///
/// Empty input skips the provider. A provider error degrades to
/// [`fallback`]. Unresolvable indices are dropped without error, but a
/// ranking left with no chunk at all for non-empty input is treated like a
/// provider failure and also degrades to [`fallback`].
pub async fn rerank_candidates(
    provider: &dyn RerankProvider,
    query: &str,
    candidates: &[Chunk],
) -> StageOutcome<RankedChunks> {
    if candidates.is_empty() {
        return StageOutcome::Succeeded(RankedChunks::empty());
    }

    let documents: Vec<String> = candidates.iter().map(|c| c.content.clone()).collect();

    match provider.rerank(query, &documents, RERANK_TOP_N).await {
        Ok(hits) => {
            let ordered = apply_ranking(candidates, &hits);
            if ordered.is_empty() {
                return StageOutcome::degraded(
                    fallback(candidates),
                    "rerank provider returned no usable results",
                );
            }
            tracing::info!("Reranked {} candidates into {}", candidates.len(), ordered.len());
            StageOutcome::Succeeded(RankedChunks::new(ordered))
        }
        Err(e) => StageOutcome::degraded(fallback(candidates), format!("rerank failed: {}", e)),
    }
}

/// Re-index `candidates` by `hits`, dropping indices that resolve to no
/// chunk or repeat an earlier one.
pub fn apply_ranking(candidates: &[Chunk], hits: &[RerankHit]) -> Vec<Chunk> {
    let mut seen = HashSet::new();
    hits.iter()
        .filter(|hit| seen.insert(hit.index))
        .filter_map(|hit| candidates.get(hit.index).cloned())
        .collect()
}

/// The first [`FALLBACK_KEEP`] candidates in their incoming order.
pub fn fallback(candidates: &[Chunk]) -> RankedChunks {
    RankedChunks::new(candidates.iter().take(FALLBACK_KEEP).cloned().collect())
}
