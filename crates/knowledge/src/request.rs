//! Caller-facing request and response shapes.
//!
//! Requests are validated before any pipeline work starts; a rejected
//! request never reaches a collaborator.

use crate::language::Language;
use crate::types::{Citation, DealCriteria, StartupMatch, TicketRange};
use serde::{Deserialize, Serialize};
use venturegraph_core::{AppError, AppResult};

fn require_identity(user_id: &Option<String>) -> AppResult<()> {
    match user_id {
        Some(id) if !id.trim().is_empty() => Ok(()),
        _ => Err(AppError::Auth("Caller identity is required".to_string())),
    }
}

/// A question about the uploaded documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user_id: Some(user_id.into()),
        }
    }

    /// Reject a missing identity, then a blank query.
    pub fn validate(&self) -> AppResult<()> {
        require_identity(&self.user_id)?;
        if self.query.trim().is_empty() {
            return Err(AppError::Request("Query is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub response: String,
    pub citations: Vec<Citation>,
    pub original_language: Language,
}

/// Investor criteria for deal-flow matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealFlowRequest {
    #[serde(default)]
    pub sector: Vec<String>,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub ticket_size: Option<TicketRange>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl DealFlowRequest {
    /// Reject a missing identity, then incomplete or inconsistent criteria.
    pub fn validate(&self) -> AppResult<()> {
        require_identity(&self.user_id)?;

        if self.sector.iter().all(|s| s.trim().is_empty()) {
            return Err(AppError::Request("Sector is required".to_string()));
        }
        if self.stage.trim().is_empty() {
            return Err(AppError::Request("Stage is required".to_string()));
        }

        let ticket = self
            .ticket_size
            .ok_or_else(|| AppError::Request("Ticket size range required".to_string()))?;
        if !ticket.min.is_finite() || !ticket.max.is_finite() {
            return Err(AppError::Request("Ticket size bounds must be numbers".to_string()));
        }
        if ticket.min < 0.0 || ticket.max <= 0.0 || ticket.min > ticket.max {
            return Err(AppError::Request(format!(
                "Invalid ticket size range: {} to {}",
                ticket.min, ticket.max
            )));
        }
        Ok(())
    }

    /// Validate and convert into pipeline criteria.
    pub fn into_criteria(self) -> AppResult<DealCriteria> {
        self.validate()?;
        let ticket_size = self
            .ticket_size
            .ok_or_else(|| AppError::Request("Ticket size range required".to_string()))?;

        Ok(DealCriteria {
            sector: self
                .sector
                .into_iter()
                .filter(|s| !s.trim().is_empty())
                .collect(),
            stage: self.stage,
            ticket_size,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealFlowResponse {
    pub matches: Vec<StartupMatch>,
    pub report: String,
    pub citations: Vec<Citation>,
}
