//! Document ingestion: parse, chunk, embed and store.

use crate::chunker::{chunk_text, DEFAULT_OVERLAP, DEFAULT_WINDOW};
use crate::deps::Collaborators;
use crate::embeddings::EmbeddingProvider;
use crate::types::Chunk;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use venturegraph_core::{AppError, AppResult};
use walkdir::WalkDir;

/// File extensions picked up when walking a directory.
pub const INGESTIBLE_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

/// Owner identity and optional deal metadata attached to every chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOptions {
    pub user_id: String,
    pub sector: Option<Vec<String>>,
    pub stage: Option<String>,
    pub ticket_size: Option<f64>,
}

impl IngestOptions {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    fn apply(&self, mut chunk: Chunk) -> Chunk {
        chunk = chunk.with_user_id(&self.user_id);
        if let Some(sector) = &self.sector {
            chunk = chunk.with_sector(sector.clone());
        }
        if let Some(stage) = &self.stage {
            chunk = chunk.with_stage(stage);
        }
        if let Some(ticket_size) = self.ticket_size {
            chunk = chunk.with_ticket_size(ticket_size);
        }
        chunk
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    pub file_name: String,
    pub pages: usize,
    /// Chunks newly written to the store.
    pub chunks: usize,
    /// Chunks already stored for the same file and page.
    pub skipped: usize,
}

/// Parse `bytes`, split every page into overlapping windows and store them
/// with their embeddings.
///
/// Parser, embedder and store errors propagate.
pub async fn ingest_document(
    deps: &Collaborators,
    file_name: &str,
    bytes: Vec<u8>,
    options: &IngestOptions,
) -> AppResult<IngestStats> {
    if options.user_id.trim().is_empty() {
        return Err(AppError::Auth("Caller identity is required".to_string()));
    }

    let start = Instant::now();
    let document = deps.parser.parse(file_name, bytes).await?;

    let mut chunks = Vec::new();
    for page in &document.pages {
        for window in chunk_text(&page.text, DEFAULT_WINDOW, DEFAULT_OVERLAP)? {
            if window.trim().is_empty() {
                continue;
            }
            let chunk = Chunk::new(uuid::Uuid::new_v4().to_string(), window)
                .with_page(page.page)
                .with_file_name(file_name);
            chunks.push(options.apply(chunk));
        }
    }

    let stored = if chunks.is_empty() {
        0
    } else {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = deps.embedder.embed_batch(&texts).await?;
        check_dimensions(deps.embedder.as_ref(), &vectors)?;
        deps.store.store(&chunks, &vectors, file_name).await?
    };
    let skipped = chunks.len().saturating_sub(stored);

    tracing::info!(
        "Ingested {}: {} pages, {} chunks ({} already stored) in {:.2}s",
        file_name,
        document.pages.len(),
        stored,
        skipped,
        start.elapsed().as_secs_f64()
    );

    Ok(IngestStats {
        file_name: file_name.to_string(),
        pages: document.pages.len(),
        chunks: stored,
        skipped,
    })
}

/// Every vector must have the embedder's advertised dimension.
fn check_dimensions(embedder: &dyn EmbeddingProvider, vectors: &[Vec<f32>]) -> AppResult<()> {
    let expected = embedder.dimensions();
    match vectors.iter().find(|v| v.len() != expected) {
        Some(vector) => Err(AppError::upstream(
            embedder.provider_name(),
            format!(
                "{} returned a {}-dimensional embedding, expected {}",
                embedder.model_name(),
                vector.len(),
                expected
            ),
        )),
        None => Ok(()),
    }
}

/// Ingest a file, or every ingestible file below a directory.
///
/// Files inside a directory that fail to ingest are logged and skipped; a
/// single named file that fails is an error.
pub async fn ingest_path(
    deps: &Collaborators,
    path: &Path,
    options: &IngestOptions,
) -> AppResult<Vec<IngestStats>> {
    if path.is_file() {
        return Ok(vec![ingest_file(deps, path, options).await?]);
    }
    if !path.is_dir() {
        return Err(AppError::Request(format!("Path not found: {}", path.display())));
    }

    let mut stats = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let entry_path = entry.path();
        if !entry_path.is_file() || !is_ingestible(entry_path) {
            continue;
        }
        match ingest_file(deps, entry_path, options).await {
            Ok(file_stats) => stats.push(file_stats),
            Err(e) => tracing::warn!("Skipping {:?}: {}", entry_path, e),
        }
    }

    Ok(stats)
}

async fn ingest_file(deps: &Collaborators, path: &Path, options: &IngestOptions) -> AppResult<IngestStats> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    ingest_document(deps, &file_name, bytes, options).await
}

fn is_ingestible(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| INGESTIBLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ingestible() {
        assert!(is_ingestible(Path::new("deck.PDF")));
        assert!(is_ingestible(Path::new("notes/memo.md")));
        assert!(!is_ingestible(Path::new("logo.png")));
        assert!(!is_ingestible(Path::new("Makefile")));
    }

    #[test]
    fn test_options_attach_metadata() {
        let options = IngestOptions {
            user_id: "founder-1".to_string(),
            sector: Some(vec!["FinTech".to_string()]),
            stage: Some("Seed".to_string()),
            ticket_size: Some(2_000_000.0),
        };
        let chunk = options.apply(Chunk::new("c1", "text"));

        assert_eq!(chunk.metadata.user_id.as_deref(), Some("founder-1"));
        assert_eq!(chunk.metadata.sector, Some(vec!["FinTech".to_string()]));
        assert_eq!(chunk.metadata.stage.as_deref(), Some("Seed"));
        assert_eq!(chunk.metadata.ticket_size, Some(2_000_000.0));
    }
}
