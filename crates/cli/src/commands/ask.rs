//! Ask command handler.
//!
//! Answers a question from the ingested documents, in the language it was
//! asked in.

use super::print_json;
use clap::Args;
use venturegraph_core::AppResult;
use venturegraph_knowledge::{run_query_pipeline, Collaborators, QueryRequest};

/// Ask a question about the uploaded documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask (English, Hindi or Tamil)
    pub query: String,

    /// Caller identity
    #[arg(short, long, env = "VENTUREGRAPH_USER")]
    pub user: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, deps: &Collaborators) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let request = QueryRequest {
            query: self.query.clone(),
            user_id: self.user.clone(),
        };
        request.validate()?;

        let state = run_query_pipeline(deps, &request.query).await?;
        for degradation in &state.degradations {
            tracing::debug!(stage = %degradation.stage, "Answered with fallback");
        }

        let response = state.to_response();
        if self.json {
            return print_json(&response);
        }

        println!("{}", response.response);
        if !response.citations.is_empty() {
            println!();
            println!("Sources:");
            for (i, citation) in response.citations.iter().enumerate() {
                match citation.page {
                    Some(page) => println!("  [{}] {} (p. {})", i + 1, citation.source, page),
                    None => println!("  [{}] {}", i + 1, citation.source),
                }
            }
        }

        Ok(())
    }
}
