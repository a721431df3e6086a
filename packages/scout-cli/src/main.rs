//! Scout: find which phone numbers have accounts on the directory
//! provider.
//!
//! Reads a file of raw phone numbers, authenticates a provider session
//! interactively, resolves the numbers in paced batches, and exports the
//! matches.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resolver_core::{NumberingPlan, ResolveConfig};

mod auth_flow;
mod config;
mod run;

use config::Config;

#[derive(Parser)]
#[command(
    name = "scout",
    about = "Resolve phone numbers against the directory provider"
)]
struct Cli {
    /// File with one raw phone number per line
    #[arg(long)]
    numbers: PathBuf,

    /// Numbers per contact-import request
    #[arg(long, default_value_t = 10)]
    batch_size: usize,

    /// Seconds to wait between successful batches
    #[arg(long, default_value_t = 211)]
    delay: u64,

    /// Country-code prefix applied during normalization
    #[arg(long, default_value = "+91")]
    country_prefix: String,

    /// Write matched accounts as text lines
    #[arg(long)]
    out_text: Option<PathBuf>,

    /// Write the full report as JSON
    #[arg(long)]
    out_json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,resolver_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let raw = std::fs::read_to_string(&cli.numbers)
        .with_context(|| format!("failed to read {}", cli.numbers.display()))?;
    let rows = raw.lines().count();
    let plan = NumberingPlan::new(&cli.country_prefix);
    let numbers = plan.normalize_all(raw.lines());
    if numbers.is_empty() {
        bail!(
            "no valid phone numbers in {} ({rows} rows read)",
            cli.numbers.display()
        );
    }
    println!(
        "{}",
        style(format!(
            "{} valid numbers from {} rows",
            numbers.len(),
            rows
        ))
        .bold()
    );

    let session = auth_flow::authenticate(&config).await?;

    let resolve_config = ResolveConfig {
        batch_size: cli.batch_size,
        inter_batch_delay: Duration::from_secs(cli.delay),
    };
    let report = run::execute(session, resolve_config, numbers).await?;

    run::render_summary(&report);
    if let Some(path) = &cli.out_text {
        run::export_text(&report, path)?;
    }
    if let Some(path) = &cli.out_json {
        run::export_json(&report, path)?;
    }

    Ok(())
}
