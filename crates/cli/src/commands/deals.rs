//! Deals command handler.
//!
//! Matches investor criteria against ingested pitch material and prints a
//! ranked list with a report.

use super::print_json;
use clap::Args;
use venturegraph_core::AppResult;
use venturegraph_knowledge::{run_deal_flow_pipeline, Collaborators, DealFlowRequest, TicketRange};

/// Match startups against investment criteria
#[derive(Args, Debug)]
pub struct DealsCommand {
    /// Sectors of interest (repeatable)
    #[arg(long = "sector", required = true)]
    pub sectors: Vec<String>,

    /// Funding stage, e.g. Seed
    #[arg(long)]
    pub stage: String,

    /// Minimum ticket size
    #[arg(long)]
    pub min: f64,

    /// Maximum ticket size
    #[arg(long)]
    pub max: f64,

    /// Caller identity
    #[arg(short, long, env = "VENTUREGRAPH_USER")]
    pub user: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DealsCommand {
    pub async fn execute(&self, deps: &Collaborators) -> AppResult<()> {
        tracing::info!("Executing deals command");

        let request = DealFlowRequest {
            sector: self.sectors.clone(),
            stage: self.stage.clone(),
            ticket_size: Some(TicketRange::new(self.min, self.max)),
            user_id: self.user.clone(),
        };
        let criteria = request.into_criteria()?;

        let state = run_deal_flow_pipeline(deps, criteria).await?;
        let response = state.to_response();

        if self.json {
            return print_json(&response);
        }

        if response.matches.is_empty() {
            println!("{}", response.report);
            return Ok(());
        }

        for (i, m) in response.matches.iter().enumerate() {
            println!("{:>2}. {} ({}, {}) score {:.2}", i + 1, m.name, m.sector, m.stage, m.score);
        }
        println!();
        println!("{}", response.report);

        Ok(())
    }
}
