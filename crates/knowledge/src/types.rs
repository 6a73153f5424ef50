//! Core data model: chunks, citations, deal-flow criteria and matches.

use serde::{Deserialize, Serialize};

/// Provenance and deal metadata recorded for a chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// 1-based page number in the source document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Origin file name, e.g. "acme-seed-deck.pdf"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Identity of the uploader
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Sector tags, e.g. ["FinTech", "Payments"]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<Vec<String>>,

    /// Funding stage, e.g. "Seed"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    /// Ticket size the startup is raising
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_size: Option<f64>,
}

/// A bounded, citable slice of a parsed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk identifier
    pub id: String,

    /// Text content
    pub content: String,

    /// Provenance metadata
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a chunk with empty metadata.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: ChunkMetadata::default(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.metadata.page = Some(page);
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.metadata.file_name = Some(file_name.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.metadata.user_id = Some(user_id.into());
        self
    }

    pub fn with_sector(mut self, sector: Vec<String>) -> Self {
        self.metadata.sector = Some(sector);
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.metadata.stage = Some(stage.into());
        self
    }

    pub fn with_ticket_size(mut self, ticket_size: f64) -> Self {
        self.metadata.ticket_size = Some(ticket_size);
        self
    }
}

/// Where a piece of an answer came from.
///
/// Always a projection of exactly one chunk; never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    pub excerpt: String,
}

/// Inclusive ticket-size range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TicketRange {
    pub min: f64,
    pub max: f64,
}

impl TicketRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `size` lies within `[min, max]`.
    pub fn contains(&self, size: f64) -> bool {
        size >= self.min && size <= self.max
    }
}

/// Investor matching criteria for the deal-flow pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealCriteria {
    pub sector: Vec<String>,
    pub stage: String,
    pub ticket_size: TicketRange,
}

impl DealCriteria {
    /// Query text handed to the reranker for these criteria.
    pub fn rerank_query(&self) -> String {
        format!("{} {} startup", self.sector.join(" "), self.stage)
    }
}

/// One ranked startup in a deal-flow result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupMatch {
    pub id: String,
    pub name: String,
    pub sector: String,
    pub stage: String,
    pub score: f64,
    pub description: String,
    pub citations: Vec<Citation>,
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
