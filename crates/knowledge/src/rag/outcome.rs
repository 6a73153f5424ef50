//! Tagged stage results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stages that may degrade instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validation,
    Rerank,
    Synthesis,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validation => "validation",
            Self::Rerank => "rerank",
            Self::Synthesis => "synthesis",
        })
    }
}

/// A stage that fell back, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Degradation {
    pub stage: Stage,
    pub reason: String,
}

/// Result of a stage with a fallback path.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Succeeded(T),
    Degraded { value: T, reason: String },
}

impl<T> StageOutcome<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Succeeded(value) | Self::Degraded { value, .. } => value,
        }
    }

    /// Split into the value and, when degraded, a [`Degradation`] for `stage`.
    ///
    /// Degradations are logged at `warn` here so every stage reports them
    /// the same way.
    pub fn settle(self, stage: Stage) -> (T, Option<Degradation>) {
        match self {
            Self::Succeeded(value) => (value, None),
            Self::Degraded { value, reason } => {
                tracing::warn!(%stage, %reason, "Stage degraded, using fallback");
                (value, Some(Degradation { stage, reason }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_succeeded() {
        let (value, degradation) = StageOutcome::Succeeded(3).settle(Stage::Rerank);
        assert_eq!(value, 3);
        assert!(degradation.is_none());
    }

    #[test]
    fn test_settle_degraded() {
        let outcome = StageOutcome::degraded(vec![1, 2], "provider down");
        assert!(outcome.is_degraded());
        assert_eq!(outcome.value(), &vec![1, 2]);

        let (value, degradation) = outcome.settle(Stage::Validation);
        assert_eq!(value, vec![1, 2]);
        assert_eq!(
            degradation,
            Some(Degradation {
                stage: Stage::Validation,
                reason: "provider down".to_string()
            })
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Synthesis.to_string(), "synthesis");
        assert_eq!(serde_json::to_string(&Stage::Rerank).unwrap(), "\"rerank\"");
    }
}
