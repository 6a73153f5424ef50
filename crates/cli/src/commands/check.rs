//! Check command handler.

use super::print_json;
use clap::Args;
use venturegraph_core::AppResult;
use venturegraph_knowledge::{background_check, Collaborators};

/// Web background check on a company
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Company name
    pub company: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckCommand {
    pub async fn execute(&self, deps: &Collaborators) -> AppResult<()> {
        tracing::info!("Executing check command for '{}'", self.company);

        let results = background_check(deps.web_search.as_ref(), &self.company).await?;

        if self.json {
            return print_json(&results);
        }

        if results.is_empty() {
            println!("No news found for {}", self.company);
        }
        for snapshot in &results {
            println!("{}\n  {}", snapshot.title, snapshot.url);
        }
        Ok(())
    }
}
