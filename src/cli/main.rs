//! mongodb-erd command-line entry point

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use mongodb_erd::cli::commands::{GenerateArgs, handle_generate};
use mongodb_erd::cli::logging::{self, LogConfig};
use mongodb_erd::export::{OutputFormat, Theme};

/// Generate entity-relationship diagrams from document database exports
#[derive(Parser, Debug)]
#[command(name = "mongodb-erd", version, about)]
struct Cli {
    /// Directory holding the exported database (or databases, with --database)
    #[arg(short, long, env = "MONGODB_ERD_SOURCE")]
    source: PathBuf,

    /// Database directory below --source
    #[arg(short, long)]
    database: Option<String>,

    /// Output file path; "-" writes to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Mermaid theme
    #[arg(long, value_enum)]
    theme: Option<Theme>,

    /// Comma-separated list of collections to include
    #[arg(long, value_delimiter = ',')]
    include: Vec<String>,

    /// Comma-separated list of collections to exclude
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Documents sampled per collection
    #[arg(long)]
    sample_size: Option<usize>,

    /// Only use field names to find relationship targets
    #[arg(long)]
    no_existence_check: bool,

    /// Skip collections that fail instead of aborting
    #[arg(long)]
    partial: bool,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level or filter (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn generate_args(&self) -> GenerateArgs {
        let trimmed = |names: &[String]| -> Vec<String> {
            names
                .iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect()
        };
        GenerateArgs {
            source: self.source.clone(),
            database: self.database.clone(),
            output: self.output.clone(),
            format: self.format,
            theme: self.theme,
            include: trimmed(&self.include),
            exclude: trimmed(&self.exclude),
            sample_size: self.sample_size,
            no_existence_check: self.no_existence_check,
            partial: self.partial,
            config: self.config.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_cfg = LogConfig {
        level: cli.log_level.clone().or(Some("warn".to_owned())),
        json: cli.log_json,
        with_targets: false,
    };
    logging::init(&log_cfg).context("initialize logging")?;

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            watcher.cancel();
        }
    });

    let code = match handle_generate(&cli.generate_args(), cancel).await {
        Ok(outcome) => {
            eprintln!("ERD generated successfully: {}", outcome.target);
            ExitCode::SUCCESS
        }
        Err(e) if e.is_cancelled() => {
            eprintln!("{}", e.user_message());
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    };
    Ok(code)
}
