//! hclust - Agglomerative hierarchical clustering of JSON vectors.

mod config;
mod report;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use giztoy_hclust::{Config, Linkage, Metric, cluster, extract_vectors, log_progress};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use config::FileConfig;
use report::Report;

/// Agglomerative hierarchical clustering of JSON vectors.
///
/// Input is a JSON array of numeric arrays, or of objects holding a numeric
/// array under `--key`. Prints the partition at the elbow K unless `-k` is
/// given.
#[derive(Parser, Debug)]
#[command(name = "hclust")]
#[command(about = "Agglomerative hierarchical clustering of JSON vectors")]
#[command(version)]
struct Args {
    /// Input JSON file (default: stdin)
    #[arg(short = 'f', long = "file")]
    input: Option<PathBuf>,

    /// Config file (YAML or JSON) with metric, linkage and key
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field holding the vector when records are objects
    #[arg(long)]
    key: Option<String>,

    /// Pairwise metric: cosine, euclidean
    #[arg(long)]
    metric: Option<Metric>,

    /// Linkage: average, single, complete
    #[arg(long)]
    linkage: Option<Linkage>,

    /// Number of clusters to print (default: elbow)
    #[arg(short = 'k')]
    k: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output as JSON (for piping)
    #[arg(long)]
    json: bool,

    /// Verbose output, including progress
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let file_cfg = match &args.config {
        Some(path) => config::load(path)?,
        None => FileConfig::default(),
    };
    let settings = file_cfg.resolve(args.metric.clone(), args.linkage.clone(), args.key.clone());
    tracing::debug!(?settings, "resolved settings");

    let values = read_records(args.input.as_deref())?;
    let vectors = extract_vectors(&values, settings.key.as_deref()).context("extracting vectors")?;

    let mut cfg = Config::new()
        .with_metric(settings.metric)
        .with_linkage(settings.linkage);
    if args.verbose {
        cfg = cfg.with_progress(log_progress());
    }
    let result = cluster(&vectors, &cfg).context("clustering")?;

    let report = Report::new(&result, args.k)?;
    let text = if args.json {
        serde_json::to_string_pretty(&report)? + "\n"
    } else {
        report.to_text()
    };

    match &args.output {
        Some(path) => std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

fn read_records(path: Option<&Path>) -> Result<Vec<Value>> {
    let data = match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let value: Value = serde_json::from_str(&data)?;
    match value {
        Value::Array(values) => Ok(values),
        _ => bail!("input must be a JSON array of records"),
    }
}
