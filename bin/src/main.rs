//! candlewick CLI - aggregates a trade file into session-bounded OHLC candles.

use anyhow::{Context, Result};
use candlewick_lib::prelude::*;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "candlewick")]
#[command(about = "Aggregate trades into OHLC candles per trading session", long_about = None)]
#[command(version)]
struct Cli {
    /// Trade file with `ticker,price,_,timestamp` rows and no header
    #[arg(short, long, default_value = "trades.csv")]
    file: PathBuf,

    /// Output directory. Files named candles_<minutes>m.csv
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Candle granularity (e.g. 5, 30m, 4h). Repeat for several; defaults to 5m, 30m and 240m
    #[arg(short, long = "granularity", value_name = "GRANULARITY")]
    granularities: Vec<Granularity>,

    /// Stop reading input after this many seconds (0 runs to end of input)
    #[arg(long, default_value_t = 5)]
    deadline_secs: u64,

    /// How session windows and buckets move across gaps (catch-up, single-step)
    #[arg(long, default_value = "catch-up")]
    gap_policy: GapPolicy,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let granularities = if cli.granularities.is_empty() {
        Granularity::STANDARD.to_vec()
    } else {
        cli.granularities
    };
    let config = PipelineConfig {
        granularities,
        deadline: (cli.deadline_secs > 0).then(|| Duration::from_secs(cli.deadline_secs)),
        gap_policy: cli.gap_policy,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(config).context("Invalid pipeline configuration")?;

    let trades = TradeReader::open(&cli.file)
        .await
        .with_context(|| format!("Failed to open trade file: {}", cli.file.display()))?
        .into_stream();
    let (paths, sinks) = create_sinks(&cli.output_dir, &pipeline.config().granularities).await?;

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    let report = pipeline
        .run_until(trades, sinks, shutdown)
        .await
        .with_context(|| format!("Failed to aggregate {}", cli.file.display()))?;

    for (branch, path) in report.branches.iter().zip(&paths) {
        info!(
            granularity = %branch.granularity,
            candles = branch.candles_written,
            write_errors = branch.write_errors,
            "{}",
            path.display()
        );
    }
    if report.source_failed {
        warn!("input ended early on a read error");
    }
    if report.cancelled {
        warn!("run stopped early; trailing candles were not written");
    }

    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` wins over the verbosity flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Creates one CSV sink per granularity inside `dir`, returning their paths too.
async fn create_sinks(
    dir: &Path,
    granularities: &[Granularity],
) -> Result<(Vec<PathBuf>, Vec<Box<dyn CandleSink>>)> {
    let mut paths = Vec::with_capacity(granularities.len());
    let mut sinks: Vec<Box<dyn CandleSink>> = Vec::with_capacity(granularities.len());
    for granularity in granularities {
        let sink = CsvFileSink::create_in(dir, *granularity)
            .await
            .with_context(|| format!("Failed to create {granularity} output in {}", dir.display()))?;
        debug!(%granularity, path = %sink.path().display(), "output file created");
        paths.push(sink.path().to_path_buf());
        sinks.push(Box::new(sink));
    }
    Ok((paths, sinks))
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupted, shutting down");
        shutdown.cancel();
    }
}
