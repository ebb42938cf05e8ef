use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use proxycheck::{ClientConfig, LookupClient, LookupResult};

#[derive(Parser)]
#[command(name = "proxycheck")]
#[command(about = "Look up IP address reputation on proxycheck.io", long_about = None)]
struct Cli {
    /// API key (defaults to PROXYCHECK_KEY)
    #[arg(long)]
    key: Option<String>,
    /// Cache lifetime in seconds (defaults to PROXYCHECK_CACHE_SECS)
    #[arg(long)]
    cache_secs: Option<u64>,
    /// Print full results as JSON
    #[arg(long)]
    json: bool,
    /// Addresses to look up
    #[arg(required = true)]
    addresses: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(key) = cli.key {
        config.key = key;
    }
    if let Some(secs) = cli.cache_secs {
        config.cache_duration = Duration::from_secs(secs);
    }

    let client = LookupClient::new(config).context("failed to create proxycheck client")?;
    info!("Looking up {} address(es)", cli.addresses.len());

    // Duplicate addresses share one upstream request
    let handles: Vec<_> = cli
        .addresses
        .iter()
        .map(|address| (address.clone(), client.spawn_fetch(address.as_str())))
        .collect();

    let mut failures = 0usize;
    for (address, handle) in handles {
        match handle.await.context("lookup task panicked")? {
            Ok(result) => {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(result.as_ref())?);
                } else {
                    print_summary(&address, &result);
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("✗ {}: {:#}", address, anyhow::Error::new(e));
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} lookups failed", failures, cli.addresses.len());
    }

    Ok(())
}

fn print_summary(address: &str, result: &LookupResult) {
    // The client reports denied and failed queries as errors
    let Some(success) = result.as_success() else {
        return;
    };

    let record = &success.record;
    println!(
        "{:<40} proxy={:<4} type={:<12} risk={:<4} {} ({}) {}",
        address,
        record.proxy,
        record.connection_type,
        record.risk,
        record.country,
        record.iso_code,
        record.provider
    );
    if !record.operator.protocols.is_empty() {
        println!(
            "{:<40} operator={} protocols={}",
            "",
            record.operator.name,
            record.operator.protocols.join(",")
        );
    }
}
