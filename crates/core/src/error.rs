//! Error types for VentureGraph.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! caller mistakes (bad requests, missing identity), upstream provider
//! failures, vector-store failures, prompt rendering and serialization.

use thiserror::Error;

/// Unified error type for VentureGraph.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid request fields, rejected before any pipeline work
    #[error("Invalid request: {0}")]
    Request(String),

    /// Missing caller identity, rejected before any pipeline work
    #[error("Unauthorized: {0}")]
    Auth(String),

    /// An external provider failed during a pipeline stage
    #[error("Upstream error from {service}: {message}")]
    Upstream { service: String, message: String },

    /// Vector store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Build an upstream error for the named external service.
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    /// HTTP-style status class a caller should see for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Request(_) => 400,
            AppError::Auth(_) => 401,
            _ => 500,
        }
    }

    /// Whether the caller, not the system, is at fault.
    pub fn is_caller_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
