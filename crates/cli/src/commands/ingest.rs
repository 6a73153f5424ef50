//! Ingest command handler.

use super::print_json;
use clap::Args;
use std::path::PathBuf;
use venturegraph_core::AppResult;
use venturegraph_knowledge::{ingest_path, Collaborators, IngestOptions};

/// Parse, chunk, embed and store documents
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories to ingest
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Caller identity recorded as the owner
    #[arg(short, long, env = "VENTUREGRAPH_USER")]
    pub user: Option<String>,

    /// Sector tags for deal-flow matching (repeatable)
    #[arg(long)]
    pub sector: Vec<String>,

    /// Funding stage for deal-flow matching
    #[arg(long)]
    pub stage: Option<String>,

    /// Ticket size being raised
    #[arg(long)]
    pub ticket_size: Option<f64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, deps: &Collaborators) -> AppResult<()> {
        tracing::info!("Executing ingest command for {} paths", self.paths.len());

        let options = IngestOptions {
            user_id: self.user.clone().unwrap_or_default(),
            sector: (!self.sector.is_empty()).then(|| self.sector.clone()),
            stage: self.stage.clone(),
            ticket_size: self.ticket_size,
        };

        let mut all_stats = Vec::new();
        for path in &self.paths {
            all_stats.extend(ingest_path(deps, path, &options).await?);
        }

        if self.json {
            return print_json(&all_stats);
        }

        for stats in &all_stats {
            if stats.skipped > 0 {
                println!(
                    "{}: {} pages, {} chunks ({} already stored)",
                    stats.file_name, stats.pages, stats.chunks, stats.skipped
                );
            } else {
                println!("{}: {} pages, {} chunks", stats.file_name, stats.pages, stats.chunks);
            }
        }
        let chunks: usize = all_stats.iter().map(|s| s.chunks).sum();
        println!("Ingested {} documents ({} chunks)", all_stats.len(), chunks);

        Ok(())
    }
}
