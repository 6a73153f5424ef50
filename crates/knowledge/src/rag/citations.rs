//! Citation derivation, aligned one-to-one with the ranked chunks.

use crate::types::{char_prefix, Chunk, Citation};

/// Maximum excerpt length in characters.
pub const EXCERPT_CHARS: usize = 200;

/// Source label used when a chunk has no origin file name.
pub const UNKNOWN_SOURCE: &str = "Document";

/// Project one chunk into its citation.
pub fn cite(chunk: &Chunk) -> Citation {
    Citation {
        source: chunk
            .metadata
            .file_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        page: chunk.metadata.page,
        excerpt: char_prefix(&chunk.content, EXCERPT_CHARS).to_string(),
    }
}

/// One citation per chunk, in order.
pub fn derive_citations(chunks: &[Chunk]) -> Vec<Citation> {
    chunks.iter().map(cite).collect()
}

/// The final candidate ordering together with its citations.
///
/// Citations are derived when the sequence is built and the sequence is
/// never edited afterwards, so `citations[i]` always describes `chunks[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedChunks {
    chunks: Vec<Chunk>,
    citations: Vec<Citation>,
}

impl RankedChunks {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        let citations = derive_citations(&chunks);
        Self { chunks, citations }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Whether every citation is still the projection of its chunk.
    pub fn is_aligned(&self) -> bool {
        self.citations.len() == self.chunks.len()
            && self
                .chunks
                .iter()
                .zip(&self.citations)
                .all(|(chunk, citation)| cite(chunk) == *citation)
    }

    pub fn into_parts(self) -> (Vec<Chunk>, Vec<Citation>) {
        (self.chunks, self.citations)
    }
}
