//! marketvol CLI binary.
//!
//! Refreshes the volatility snapshot for the B3 universe.

mod logging;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use marketvol::config::{DEFAULT_BATCH_SIZE, DEFAULT_OUTPUT_PATH};
use marketvol::data::fetch::{DEFAULT_INTERVAL, DEFAULT_LOOKBACK_DAYS};
use marketvol::data::yahoo::quotes::{DEFAULT_CONCURRENCY, YahooQuoteProvider};
use marketvol::data::FetchOptions;
use marketvol::volatility::DEFAULT_TRADING_DAYS;
use marketvol::{B3Universe, BatchOutcome, SnapshotConfig, SnapshotPipeline, Universe};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "marketvol")]
#[command(about = "Annualized volatility snapshots for B3 equities", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch quotes and write the volatility snapshot
    Refresh(RefreshArgs),

    /// List the ticker registry
    Symbols,
}

#[derive(Args)]
struct RefreshArgs {
    /// JSON snapshot path
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Also write a CSV mirror of the records to this path
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Calendar days of history to request
    #[arg(long, default_value_t = DEFAULT_LOOKBACK_DAYS)]
    lookback_days: u32,

    /// Provider sampling interval (1d, 5d, 1wk, 1mo or 3mo)
    #[arg(long, default_value = DEFAULT_INTERVAL)]
    interval: String,

    /// Bars per year used to annualize (252 for daily bars)
    #[arg(long, default_value_t = DEFAULT_TRADING_DAYS)]
    trading_days: u32,

    /// Symbols per provider batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Concurrent requests within a batch
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Pause after each request, in milliseconds
    #[arg(long, default_value_t = 0)]
    rate_limit_ms: u64,

    /// Use split/dividend adjusted closes
    #[arg(long)]
    adjusted: bool,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

impl RefreshArgs {
    fn to_config(&self) -> SnapshotConfig {
        SnapshotConfig {
            fetch: FetchOptions {
                lookback_days: self.lookback_days,
                interval: self.interval.clone(),
                adjusted: self.adjusted,
            },
            trading_days: self.trading_days,
            batch_size: self.batch_size,
            output_path: self.output.clone(),
            csv_path: self.csv.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    logging::init_logging();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Refresh(args) => refresh(&args).await?,
        Commands::Symbols => list_symbols(),
    }

    Ok(())
}

async fn refresh(args: &RefreshArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.to_config();
    let universe = B3Universe::new();
    let provider = YahooQuoteProvider::with_rate_limit(Duration::from_millis(args.rate_limit_ms))?
        .with_concurrency(args.concurrency);
    let pipeline = SnapshotPipeline::new(&provider, &universe, &config)?;

    // Timestamp marks the start of the run, before any fetch.
    let generated_at = Utc::now();

    info!(
        symbols = universe.size(),
        batches = pipeline.batches().len(),
        lookback = %config.fetch.lookback_label(),
        interval = %config.fetch.interval,
        "starting refresh"
    );

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(universe.size() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Fetching quotes...");

    let run = pipeline
        .run(generated_at, |outcome| {
            if let BatchOutcome::Failed { index, reason, .. } = outcome {
                pb.set_message(format!("batch {} failed: {}", index + 1, reason));
            }
            pb.inc(outcome.symbols() as u64);
        })
        .await;

    let summary = run.summary();
    pb.finish_with_message(format!("{} symbols processed", summary.total));

    pipeline.write(&run.snapshot)?;
    info!(%summary, "refresh complete");

    println!(
        "OK: updated {} with {} tickers.",
        config.output_path.display(),
        summary.total
    );
    if let Some(csv_path) = &config.csv_path {
        println!("   CSV mirror: {}", csv_path.display());
    }
    println!(
        "   Prices OK: {} | Vols OK: {}",
        summary.priced, summary.with_volatility
    );
    if summary.failed_batches > 0 {
        println!("   Failed batches: {}", summary.failed_batches);
    }

    Ok(())
}

fn list_symbols() {
    let universe = B3Universe::new();

    println!("Ticker Registry ({} symbols):", universe.size());
    println!("==============================\n");

    for constituent in universe.constituents() {
        println!("{:<10} {}", constituent.symbol, constituent.name);
    }
}
