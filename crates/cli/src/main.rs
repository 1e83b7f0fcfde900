//! Hourly VWAP chart for recent Kraken trades.
//!
//! Usage:
//!   kraken-vwap                       interactive pair menu
//!   kraken-vwap --pair ETHUSDT        skip the menu
//!   kraken-vwap --pair 1 --json out.json --timezone UTC

mod output;
mod pipeline;
mod selection;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vwap_chart::SvgChart;
use vwap_core::Config;
use vwap_feed::KrakenClient;

#[derive(Parser)]
#[command(name = "kraken-vwap")]
#[command(about = "Chart hourly price, VWAP and volume from recent Kraken trades")]
struct Cli {
    /// Pair to chart: a menu key or a symbol such as XBTUSDT. Prompts if omitted.
    #[arg(short, long)]
    pair: Option<String>,

    /// Display timezone for hour buckets (IANA name).
    #[arg(short, long)]
    timezone: Option<String>,

    /// SVG output path. Defaults to vwap_<PAIR>.svg.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the bucket table as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(tz) = cli.timezone {
        config.aggregation.timezone = tz;
    }
    config.validate()?;

    let pair = match &cli.pair {
        Some(arg) => selection::resolve_pair(arg, &config.pairs)?,
        None => selection::prompt_pair(&config.pairs, &mut io::stdin().lock(), &mut io::stdout())?,
    };
    println!("\nSelected pair {}", pair.symbol);

    let client = KrakenClient::new(&config.exchange)?;
    let result = pipeline::run(&client, &pair.symbol, &config.aggregation)?;

    output::print_table(&mut io::stdout(), &result.table)?;

    if let Some(path) = &cli.json {
        std::fs::write(path, output::table_to_json(&result.table)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let chart_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(format!("vwap_{}.svg", pair.symbol)));
    let title = format!(
        "Hourly quote {} (last {} trades, {})",
        pair.symbol, result.trade_count, config.aggregation.timezone
    );
    SvgChart::from_config(&config.chart)
        .write_to(&chart_path, &title, &result.table)
        .with_context(|| format!("writing chart {}", chart_path.display()))?;

    println!("Chart written to {}", chart_path.display());
    Ok(())
}
