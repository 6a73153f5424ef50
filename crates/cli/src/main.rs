//! VentureGraph CLI
//!
//! Main entry point for the venturegraph command-line tool.
//! Answers questions about uploaded pitch material and matches startups
//! against investor criteria.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, CheckCommand, DealsCommand, IngestCommand, TranslateCommand};
use std::path::PathBuf;
use std::process::ExitCode;
use venturegraph_core::{config::AppConfig, logging, AppError, AppResult};
use venturegraph_knowledge::Collaborators;

/// VentureGraph - cited answers and deal flow from startup documents
#[derive(Parser, Debug)]
#[command(name = "venturegraph")]
#[command(about = "Cited answers and deal flow from startup documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "VENTUREGRAPH_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "VENTUREGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// LLM provider for translation and generation (openai, ollama)
    #[arg(short, long, global = true, env = "VENTUREGRAPH_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "VENTUREGRAPH_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question about the uploaded documents
    Ask(AskCommand),

    /// Match startups against investment criteria
    Deals(DealsCommand),

    /// Ingest documents into the vector store
    Ingest(IngestCommand),

    /// Detect language and translate text
    Translate(TranslateCommand),

    /// Web background check on a company
    Check(CheckCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ask(_) => "ask",
            Commands::Deals(_) => "deals",
            Commands::Ingest(_) => "ingest",
            Commands::Translate(_) => "translate",
            Commands::Check(_) => "check",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Load base configuration from environment and YAML
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.log_json,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::info!("VentureGraph CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;
    config.ensure_state_dir()?;

    let deps = Collaborators::from_config(&config)?;

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&deps).await,
        Commands::Deals(cmd) => cmd.execute(&deps).await,
        Commands::Ingest(cmd) => cmd.execute(&deps).await,
        Commands::Translate(cmd) => cmd.execute(&deps).await,
        Commands::Check(cmd) => cmd.execute(&deps).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!(status = e.status_code(), "Command failed: {}", e),
    }

    result
}

/// Process exit status: 2 for caller mistakes, 1 for everything else.
fn exit_status(err: &AppError) -> u8 {
    if err.is_caller_error() {
        2
    } else {
        1
    }
}
