//! siftql - command-line tool for multi-condition filter models
//!
//! Loads filter documents from disk and runs them through the engine:
//! validation, optimization, complexity scoring, SQL/Mongo compilation,
//! and evaluation against a JSON-lines dataset.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use siftql::compile;
use siftql::eval::evaluate_rows;
use siftql::model::{validate, EngineConfig, MultiFilterModel};
use siftql::optimize::optimize;
use siftql::row::Row;
use siftql::score;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-condition filter engine tool", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Maximum filter tree depth
    #[arg(long, default_value = "16")]
    max_depth: usize,

    /// Maximum filter node count
    #[arg(long, default_value = "256")]
    max_nodes: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a filter document and report every violation
    Validate { filter: PathBuf },

    /// Optimize a filter document and print the result
    Optimize {
        filter: PathBuf,
        /// Write the optimized document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the complexity score and band
    Score { filter: PathBuf },

    /// Compile to a parameterized SQL WHERE fragment
    Sql { filter: PathBuf },

    /// Compile to a MongoDB query document
    Mongo { filter: PathBuf },

    /// Evaluate against a JSON-lines row file
    Eval { filter: PathBuf, rows: PathBuf },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = EngineConfig::new(args.max_depth, args.max_nodes);

    match args.command {
        Command::Validate { filter } => run_validate(&filter, &config),
        Command::Optimize { filter, output } => run_optimize(&filter, output.as_deref(), &config),
        Command::Score { filter } => run_score(&filter, &config),
        Command::Sql { filter } => run_sql(&filter, &config),
        Command::Mongo { filter } => run_mongo(&filter, &config),
        Command::Eval { filter, rows } => run_eval(&filter, &rows, &config),
    }
}

/// Parse a filter document without validating it, so `validate` can report
/// the full violation list itself
fn parse_model(path: &Path) -> Result<MultiFilterModel> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read filter file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Malformed filter document {}", path.display()))
}

/// Parse and validate; commands that consume the tree require a valid one
fn load_model(path: &Path, config: &EngineConfig) -> Result<MultiFilterModel> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read filter file {}", path.display()))?;
    match compile::from_json_str(&text, config) {
        Ok(model) => Ok(model),
        Err(compile::ImportError::Invalid(errors)) => {
            for error in &errors {
                eprintln!("  {}", error);
            }
            bail!("Filter failed validation with {} error(s)", errors.len())
        }
        Err(err) => {
            Err(err).with_context(|| format!("Malformed filter document {}", path.display()))
        }
    }
}

fn run_validate(filter: &Path, config: &EngineConfig) -> Result<()> {
    let model = parse_model(filter)?;
    match validate(&model, config) {
        Ok(()) => {
            println!(
                "OK: {} node(s), version {}, complexity {}",
                model.node_count(),
                model.version,
                score::score(&model)
            );
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                println!("{}", error);
            }
            bail!("{} validation error(s)", errors.len())
        }
    }
}

fn run_optimize(filter: &Path, output: Option<&Path>, config: &EngineConfig) -> Result<()> {
    let model = load_model(filter, config)?;
    let optimized = optimize(&model);
    log::debug!(
        "Optimized {} node(s) down to {}",
        model.node_count(),
        optimized.node_count()
    );
    let text = compile::to_json_string(&optimized).context("Failed to serialize filter model")?;
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", text),
    }
    Ok(())
}

fn run_score(filter: &Path, config: &EngineConfig) -> Result<()> {
    let model = load_model(filter, config)?;
    let score = score::score(&model);
    println!("{} ({:?})", score, score::ComplexityBand::from_score(score));
    Ok(())
}

fn run_sql(filter: &Path, config: &EngineConfig) -> Result<()> {
    let model = load_model(filter, config)?;
    let sql = compile::to_sql(&model);
    println!("{}", sql.clause);
    for (i, param) in sql.params.iter().enumerate() {
        println!("  ${}: {:?}", i + 1, param);
    }
    report_unsupported(&sql.unsupported);
    Ok(())
}

fn run_mongo(filter: &Path, config: &EngineConfig) -> Result<()> {
    let model = load_model(filter, config)?;
    let mongo = compile::to_mongo(&model);
    println!("{}", serde_json::to_string_pretty(&mongo.document)?);
    report_unsupported(&mongo.unsupported);
    Ok(())
}

fn report_unsupported(unsupported: &[compile::UnsupportedNode]) {
    for node in unsupported {
        log::warn!(
            "Node '{}' degraded to a tautology: {}",
            node.node_id,
            node.detail
        );
    }
}

fn run_eval(filter: &Path, rows_path: &Path, config: &EngineConfig) -> Result<()> {
    let model = load_model(filter, config)?;
    let text = std::fs::read_to_string(rows_path)
        .with_context(|| format!("Failed to read rows file {}", rows_path.display()))?;

    let mut rows = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(line)
            .with_context(|| format!("Bad JSON on line {}", line_no + 1))?;
        let row = Row::from_json(&value)
            .with_context(|| format!("Bad row on line {}", line_no + 1))?;
        rows.push(row);
    }

    let results = evaluate_rows(&model, &rows, None);
    let matched = results.iter().filter(|r| **r).count();
    for (i, result) in results.iter().enumerate() {
        if *result {
            println!("row {}", i + 1);
        }
    }
    println!("{} of {} row(s) matched", matched, rows.len());
    Ok(())
}
