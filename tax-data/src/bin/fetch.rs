use std::num::NonZeroUsize;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tax_data::{BracketDataProvider, HttpBracketSource, RetryPolicy, TaxDataCache};
use tracing_subscriber::EnvFilter;

/// Fetch one year of tax brackets from the upstream tax-data API.
///
/// Goes through the same retry policy the server uses, so it doubles as a
/// probe of how the upstream behaves.
#[derive(Parser, Debug)]
#[command(name = "tax-data-fetch")]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the tax-data API; the year is appended as a path segment
    #[arg(short, long)]
    url: String,

    /// Tax year to fetch
    #[arg(short, long)]
    year: i32,

    /// Total attempts before giving up on transient failures
    #[arg(short, long, default_value_t = 3)]
    max_retries: u32,

    /// Per-request timeout in seconds
    #[arg(short, long, default_value_t = 10)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();

    let args = Args::parse();

    let source = HttpBracketSource::new(&args.url, Duration::from_secs(args.timeout_secs))
        .context("Failed to build HTTP client")?;
    let provider = BracketDataProvider::new(
        source,
        TaxDataCache::new(NonZeroUsize::MIN),
        RetryPolicy::new(args.max_retries),
    );

    let data = provider
        .fetch(args.year)
        .await
        .with_context(|| format!("Failed to fetch tax brackets for {}", args.year))?;

    println!("Tax brackets for {} ({} brackets):", args.year, data.brackets.len());
    print!("{data}");

    Ok(())
}
