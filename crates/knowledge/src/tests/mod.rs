//! Pipeline scenario tests over fake collaborators.

mod deal_flow_pipeline;
mod query_pipeline;
