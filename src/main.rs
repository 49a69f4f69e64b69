use anyhow::{bail, Context};
use clap::Parser;
use serde_json::json;
use siftx::{records_from_json_file, SearchConfig, SearchModel};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Rank a set of JSON records against a fuzzy query
#[derive(Parser, Debug)]
#[command(name = "siftx")]
#[command(about = "Incremental fuzzy-search ranking", long_about = None)]
struct Args {
    /// JSON file holding an array of records
    #[arg(short, long)]
    items: PathBuf,

    /// JSON search configuration; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Search query
    #[arg(short, long)]
    query: Option<String>,

    /// Fields to match, comma separated
    #[arg(long, value_delimiter = ',')]
    keys: Option<Vec<String>>,

    /// Per-key weights, comma separated
    #[arg(long, value_delimiter = ',')]
    weights: Option<Vec<f64>>,

    /// Match against all keys joined into one string
    #[arg(long)]
    concat: bool,

    /// Minimum score a record must exceed to be listed
    #[arg(long)]
    cutoff: Option<f64>,

    /// Compare case sensitively
    #[arg(long)]
    case_sensitive: bool,

    /// Include each record's score in the output
    #[arg(long)]
    scores: bool,

    /// Seconds to wait for ranking to finish
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Default log level; RUST_LOG directives take precedence
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // RUST_LOG directives refine the --log-level default.
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&args)?;
    let items = records_from_json_file(&args.items)
        .with_context(|| format!("reading records from {}", args.items.display()))?;
    info!(records = items.len(), query = %config.query, "ranking");

    let started = Instant::now();
    let model = SearchModel::builder().config(config).items(items).build()?;
    if !model.wait_until_current(Duration::from_secs(args.timeout)) {
        bail!("ranking did not finish within {}s", args.timeout);
    }
    debug!(elapsed = ?started.elapsed(), stats = ?model.stats(), "ranking finished");

    let view = model.ranked_items();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (record, score) in view.iter_scored() {
        if args.scores {
            serde_json::to_writer(&mut out, &json!({ "score": score, "record": &**record }))?;
        } else {
            serde_json::to_writer(&mut out, &**record)?;
        }
        writeln!(out)?;
    }
    out.flush()?;

    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<SearchConfig> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::from_json_file(path)
            .with_context(|| format!("reading config from {}", path.display()))?,
        None => SearchConfig::default(),
    };

    if let Some(query) = &args.query {
        config.query = query.clone();
    }
    if let Some(keys) = &args.keys {
        config.keys = keys.iter().map(|k| k.trim().to_string()).collect();
    }
    if let Some(weights) = &args.weights {
        config.weights = weights.clone();
    }
    if let Some(cutoff) = args.cutoff {
        config.cutoff = cutoff;
    }
    config.concat |= args.concat;
    config.case_sensitive |= args.case_sensitive;

    config.validate()?;
    Ok(config)
}
