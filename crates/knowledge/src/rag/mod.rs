//! Retrieval-augmented generation pipelines.
//!
//! Both pipelines are fixed, linear sequences of stages. Each stage takes
//! the previous stage's record by value and returns the next one. Stages
//! backed by an unreliable service return a [`StageOutcome`] and fall back
//! deterministically instead of failing the run.

pub mod citations;
pub mod deal_flow;
pub mod outcome;
pub mod query;
pub mod rank;
pub mod state;
pub mod synthesize;
pub mod validate;

pub use citations::{cite, derive_citations, RankedChunks, EXCERPT_CHARS};
pub use deal_flow::{run_deal_flow_pipeline, CRITERIA_LIMIT};
pub use outcome::{Degradation, Stage, StageOutcome};
pub use query::{run_query_pipeline, RETRIEVAL_LIMIT};
pub use state::{DealFlowState, QueryState};
