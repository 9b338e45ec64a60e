//! exprplan - run a JSON query request against inline tables

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use exprplan::driver::{value_to_json, EngineConfig, QueryEngine, QueryRequest};
use exprplan::error::QueryError;
use log::warn;
use std::path::PathBuf;
use std::sync::Arc;

/// Analyze, optimize and execute a query plan over in-memory tables
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON request file holding `tables` and `query`
    #[arg(short, long)]
    input: PathBuf,

    /// Skip the rule-based optimizer
    #[arg(long)]
    no_optimize: bool,

    /// Print the logical plan instead of executing it
    #[arg(short, long)]
    explain: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read request file {}", args.input.display()))?;
    let request: QueryRequest =
        serde_json::from_str(&text).context("Failed to parse query request")?;
    let storage = request
        .load_storage()
        .context("Failed to load request tables")?;

    let engine = QueryEngine::new(
        Arc::new(storage),
        EngineConfig {
            optimize: !args.no_optimize,
        },
    );

    if args.explain {
        let plan = engine.explain(&request.query).map_err(report)?;
        println!("{}", plan);
        return Ok(());
    }

    let rows = engine.execute(&request.query).map_err(report)?;
    for row in &rows {
        println!("{}", serde_json::to_string(&value_to_json(row))?);
    }
    Ok(())
}

fn report(error: QueryError) -> anyhow::Error {
    if error.is_retryable() {
        warn!("query uses a construct this engine does not support yet");
    }
    let kind = error.kind();
    anyhow::Error::new(error).context(format!("{:?} error", kind))
}
