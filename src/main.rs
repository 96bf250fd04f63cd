mod analyze;
mod cli;
mod config;
mod error;
mod report;
mod schema;
mod types;

use crate::error::QualityError;
use crate::types::result::Measure;
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const WARNINGS: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let fallback = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn output_format(format: cli::ReportFormat) -> report::OutputFormat {
    match format {
        cli::ReportFormat::Json => report::OutputFormat::Json,
        cli::ReportFormat::Md => report::OutputFormat::Md,
        cli::ReportFormat::Csv => report::OutputFormat::Csv,
    }
}

fn score(root: &Path) -> Result<types::result::ScoreRun, QualityError> {
    let cfg = config::require_config(root)?;
    let ctx = config::load_context(root, &cfg)?;
    let corpus = config::load_corpus(root, &cfg)?;
    analyze::score_corpus(&corpus, &ctx)
}

fn completion(skipped: usize) -> i32 {
    if skipped > 0 {
        exit_code::WARNINGS
    } else {
        exit_code::SUCCESS
    }
}

fn run() -> Result<i32, QualityError> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        cli::Commands::Score(cmd) => {
            let run = score(&cmd.path)?;
            println!("{}", report::render(&run, output_format(cmd.format))?);
            if run.skipped > 0 && !cli.quiet {
                eprintln!("warning: {} record(s) without an id were skipped", run.skipped);
            }
            Ok(completion(run.skipped))
        }
        cli::Commands::Completeness(cmd) => {
            let run = score(&cmd.path)?;
            let rendered =
                report::render_results(&run, Measure::Completeness, output_format(cmd.format))?;
            println!("{rendered}");
            Ok(completion(run.skipped))
        }
        cli::Commands::Errors(cmd) => {
            let run = score(&cmd.path)?;
            let rendered =
                report::render_results(&run, Measure::Errors, output_format(cmd.format))?;
            println!("{rendered}");
            Ok(completion(run.skipped))
        }
        cli::Commands::Explain(cmd) => {
            let cfg = config::require_config(&cmd.path)?;
            let ctx = config::load_context(&cmd.path, &cfg)?;
            let corpus = config::load_corpus(&cmd.path, &cfg)?;
            let record = corpus
                .data_models
                .iter()
                .find(|record| record.id().as_deref() == Some(cmd.id.as_str()))
                .ok_or_else(|| QualityError::RecordNotFound(cmd.id.clone()))?;
            let scored = analyze::score_record(record, &ctx)?
                .ok_or_else(|| QualityError::RecordNotFound(cmd.id.clone()))?;
            println!(
                "{}",
                report::render_explain(&scored, output_format(cmd.format))?
            );
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Baseline(cmd) => {
            let cfg = config::require_config(&cmd.path)?;
            let ctx = config::load_context(&cmd.path, &cfg)?;
            println!("{}", serde_json::to_string_pretty(&ctx.baseline)?);
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Check(cmd) => {
            let cfg = config::require_config(&cmd.path)?;
            let ctx = config::load_context(&cmd.path, &cfg)?;
            let corpus = config::load_corpus(&cmd.path, &cfg)?;
            let drift = ctx.schema_drift();

            println!("project: {}", cfg.project.name);
            println!(
                "schema version: {} ({})",
                ctx.version,
                ctx.version.label()
            );
            println!(
                "taxonomy: {} level(s), {} attribute(s)",
                ctx.taxonomy.levels().len(),
                ctx.taxonomy.attribute_count()
            );
            let labels: Vec<&str> = ctx
                .bands
                .bands()
                .iter()
                .map(|band| band.label.as_str())
                .collect();
            println!("rating bands: {}", labels.join(", "));
            println!("records: {}", corpus.data_models.len());

            if drift.is_empty() {
                println!("check: ok");
                return Ok(exit_code::SUCCESS);
            }
            for attribute in &drift {
                println!("- not declared by schema: {attribute}");
            }
            Ok(exit_code::WARNINGS)
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            let code = if e.is_configuration() {
                exit_code::CONFIGURATION
            } else {
                exit_code::RUNTIME_FAILURE
            };
            std::process::exit(code);
        }
    }
}
