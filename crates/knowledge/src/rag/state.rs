//! Per-stage pipeline records.
//!
//! Every record is produced by exactly one stage and consumed by value by
//! the next one. Nothing here is shared between invocations.

use super::citations::RankedChunks;
use super::outcome::Degradation;
use crate::language::Language;
use crate::request::{DealFlowResponse, QueryResponse};
use crate::types::{Chunk, Citation, DealCriteria, StartupMatch};

/// The caller's question and its baseline-language rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHeader {
    pub query: String,
    pub original_language: Language,
    pub translated_query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedQuery {
    pub query: String,
    pub original_language: Language,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedQuery {
    pub header: QueryHeader,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedQuery {
    pub header: QueryHeader,
    pub query_vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedQuery {
    pub header: QueryHeader,
    pub retrieved: Vec<Chunk>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    pub header: QueryHeader,
    pub retrieved: Vec<Chunk>,
    pub validated: Vec<Chunk>,
    pub degradations: Vec<Degradation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedQuery {
    pub header: QueryHeader,
    pub retrieved: Vec<Chunk>,
    pub validated: Vec<Chunk>,
    pub ranked: RankedChunks,
    pub degradations: Vec<Degradation>,
}

/// Answer in the baseline language, before back-translation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnsweredQuery {
    pub header: QueryHeader,
    pub retrieved: Vec<Chunk>,
    pub validated: Vec<Chunk>,
    pub ranked: RankedChunks,
    pub answer: String,
    pub degradations: Vec<Degradation>,
}

/// Final state of a query-answering run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub header: QueryHeader,
    pub retrieved: Vec<Chunk>,
    pub validated: Vec<Chunk>,
    pub ranked: RankedChunks,
    /// Answer in the caller's language
    pub response: String,
    pub degradations: Vec<Degradation>,
}

impl QueryState {
    pub fn citations(&self) -> &[Citation] {
        self.ranked.citations()
    }

    pub fn to_response(&self) -> QueryResponse {
        QueryResponse {
            response: self.response.clone(),
            citations: self.ranked.citations().to_vec(),
            original_language: self.header.original_language,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaMatched {
    pub criteria: DealCriteria,
    pub matched: Vec<Chunk>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatches {
    pub criteria: DealCriteria,
    pub matched: Vec<Chunk>,
    pub ranked: RankedChunks,
    pub degradations: Vec<Degradation>,
}

/// Final state of a deal-flow run.
#[derive(Debug, Clone, PartialEq)]
pub struct DealFlowState {
    pub criteria: DealCriteria,
    pub matched: Vec<Chunk>,
    pub ranked: RankedChunks,
    pub report: String,
    pub matches: Vec<StartupMatch>,
    pub degradations: Vec<Degradation>,
}

impl DealFlowState {
    pub fn citations(&self) -> &[Citation] {
        self.ranked.citations()
    }

    pub fn to_response(&self) -> DealFlowResponse {
        DealFlowResponse {
            matches: self.matches.clone(),
            report: self.report.clone(),
            citations: self.ranked.citations().to_vec(),
        }
    }
}
