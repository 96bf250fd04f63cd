use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "metaqual",
    version,
    about = "Dataset metadata quality scoring CLI"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score every record and print the quality summary rows
    Score(ScoreCommand),
    /// Print the per-level completeness result set
    Completeness(ResultsCommand),
    /// Print the per-level schema error result set
    Errors(ResultsCommand),
    /// Break one record's score down by attribute
    Explain(ExplainCommand),
    /// Print the baseline template for the configured taxonomy
    Baseline(BaselineCommand),
    /// Load and validate configuration and inputs without scoring
    Check(CheckCommand),
}

#[derive(Args)]
pub struct ScoreCommand {
    pub path: PathBuf,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct ResultsCommand {
    pub path: PathBuf,
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct ExplainCommand {
    pub path: PathBuf,
    /// Record identifier to explain
    #[arg(long)]
    pub id: String,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct BaselineCommand {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct CheckCommand {
    pub path: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
    Csv,
}
