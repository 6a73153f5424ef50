//! Web corroboration of retrieved chunks.

use super::outcome::StageOutcome;
use crate::types::Chunk;
use crate::websearch::{WebSearchProvider, WebSnapshot};

/// Web results fetched to corroborate one query.
pub const CORROBORATION_RESULTS: usize = 3;

/// Lowercased query words longer than three characters.
pub fn keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(' ')
        .filter(|w| w.chars().count() > 3)
        .map(str::to_string)
        .collect()
}

/// Whether some keyword occurs in both the chunk and at least one snapshot.
pub fn corroborates(content: &str, keywords: &[String], snapshots: &[WebSnapshot]) -> bool {
    let content = content.to_lowercase();
    let snapshots: Vec<String> = snapshots.iter().map(|s| s.content.to_lowercase()).collect();

    keywords.iter().any(|keyword| {
        content.contains(keyword.as_str()) && snapshots.iter().any(|s| s.contains(keyword.as_str()))
    })
}

/// Keep the chunks corroborated by a web search for `query`.
///
/// The search runs once for the whole set. When the provider fails,
/// returns nothing, or corroborates no chunk, the full retrieved set comes
/// back unchanged as a degraded outcome.
pub async fn corroborate(
    provider: &dyn WebSearchProvider,
    query: &str,
    retrieved: &[Chunk],
) -> StageOutcome<Vec<Chunk>> {
    if retrieved.is_empty() {
        return StageOutcome::Succeeded(Vec::new());
    }

    let snapshots = match provider.search(query, CORROBORATION_RESULTS).await {
        Ok(snapshots) if snapshots.is_empty() => {
            return fallback(retrieved, "web search returned no results");
        }
        Ok(snapshots) => snapshots,
        Err(e) => return fallback(retrieved, format!("web search failed: {}", e)),
    };

    let keywords = keywords(query);
    let validated: Vec<Chunk> = retrieved
        .iter()
        .filter(|chunk| corroborates(&chunk.content, &keywords, &snapshots))
        .cloned()
        .collect();

    if validated.is_empty() {
        return fallback(retrieved, "no retrieved chunk was corroborated");
    }

    tracing::info!(
        "Corroborated {} of {} retrieved chunks",
        validated.len(),
        retrieved.len()
    );
    StageOutcome::Succeeded(validated)
}

fn fallback(retrieved: &[Chunk], reason: impl Into<String>) -> StageOutcome<Vec<Chunk>> {
    StageOutcome::degraded(retrieved.to_vec(), reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websearch::DisabledWebSearch;
    use async_trait::async_trait;
    use venturegraph_core::AppResult;

    struct FixedSearch(Vec<&'static str>);

    #[async_trait]
    impl WebSearchProvider for FixedSearch {
        async fn search(&self, _query: &str, max_results: usize) -> AppResult<Vec<WebSnapshot>> {
            assert_eq!(max_results, CORROBORATION_RESULTS);
            Ok(self.0.iter().map(|c| WebSnapshot::from_content(*c)).collect())
        }
    }

    fn chunks() -> Vec<Chunk> {
        vec![
            Chunk::new("1", "Our total FUNDING requirement is $2M"),
            Chunk::new("2", "The team has ten engineers"),
            Chunk::new("3", "Funding will extend runway"),
        ]
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            keywords("What is the total funding ask?"),
            vec!["what", "total", "funding", "ask?"]
        );
        assert!(keywords("is it a go").is_empty());
    }

    #[tokio::test]
    async fn test_keeps_corroborated_chunks_in_order() {
        let provider = FixedSearch(vec!["Startup funding trends in 2024", "unrelated"]);
        let outcome = corroborate(&provider, "total funding ask", &chunks()).await;

        assert!(!outcome.is_degraded());
        let ids: Vec<&str> = outcome.value().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_nothing_corroborated_falls_back_to_all() {
        let provider = FixedSearch(vec!["recipes and gardening"]);
        let outcome = corroborate(&provider, "total funding ask", &chunks()).await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.value(), &chunks());
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back_to_all() {
        let outcome = corroborate(&DisabledWebSearch, "total funding ask", &chunks()).await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.value().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_search_falls_back_to_all() {
        let outcome = corroborate(&FixedSearch(vec![]), "total funding ask", &chunks()).await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.value().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_retrieval_stays_empty() {
        let outcome = corroborate(&DisabledWebSearch, "anything", &[]).await;
        assert!(!outcome.is_degraded());
        assert!(outcome.value().is_empty());
    }
}
