//! Resolution run driver: event rendering, cancellation, exports.

use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use tracing::warn;

use resolver_core::{
    AuthSession, BatchResolver, HttpDirectory, PhoneNumber, ResolutionReport, ResolveConfig,
    ResolveEvent,
};

/// Run the resolver over an authenticated session, rendering progress
/// until completion. Ctrl-C cancels between submissions; the partial
/// report is still returned.
pub async fn execute(
    session: AuthSession<HttpDirectory>,
    config: ResolveConfig,
    numbers: Vec<PhoneNumber>,
) -> Result<ResolutionReport> {
    let mut resolver = BatchResolver::new(session, config)?;
    let mut events = resolver.subscribe();
    let cancel = resolver.cancellation_token();

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{}", style("Cancelling after the current batch...").yellow());
            ctrl_c_cancel.cancel();
        }
    });

    let renderer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            render_event(&event);
        }
    });

    let report = resolver.run(&numbers).await;

    // Hand the connection back to the provider; a failed logout is not a
    // run failure.
    let session = resolver.into_session();
    if let Err(e) = session.disconnect().await {
        warn!(error = %e, "disconnect failed");
    }

    let _ = renderer.await;
    Ok(report)
}

fn render_event(event: &ResolveEvent) {
    match event {
        ResolveEvent::RunStarted {
            total_numbers,
            total_batches,
            ..
        } => {
            println!(
                "Resolving {} numbers in {} batches",
                style(total_numbers).bold(),
                style(total_batches).bold()
            );
        }
        ResolveEvent::BatchStarted {
            index,
            total_batches,
            size,
        } => {
            println!(
                "Batch {}/{}: submitting {} numbers",
                index + 1,
                total_batches,
                size
            );
        }
        ResolveEvent::BatchSucceeded {
            index,
            total_batches,
            accounts_found,
        } => {
            if *accounts_found > 0 {
                println!(
                    "Batch {}/{}: {}",
                    index + 1,
                    total_batches,
                    style(format!("{accounts_found} accounts found")).green()
                );
            } else {
                println!("Batch {}/{}: no matches", index + 1, total_batches);
            }
        }
        ResolveEvent::BatchFailed {
            index,
            total_batches,
            error,
        } => {
            println!(
                "Batch {}/{}: {}",
                index + 1,
                total_batches,
                style(format!("failed: {error}")).red()
            );
        }
        ResolveEvent::Throttled { index, wait_secs } => {
            println!(
                "{}",
                style(format!(
                    "Rate limit hit on batch {}; waiting {}s before resubmitting",
                    index + 1,
                    wait_secs
                ))
                .yellow()
            );
        }
        ResolveEvent::Waiting { remaining_secs } => {
            print!(
                "\r{}",
                style(format!(
                    "Waiting {remaining_secs}s before the next batch...  "
                ))
                .dim()
            );
            let _ = std::io::stdout().flush();
            if *remaining_secs <= 1 {
                println!();
            }
        }
        ResolveEvent::Cancelled => {
            println!("{}", style("Run cancelled.").yellow());
        }
        ResolveEvent::RunCompleted {
            matched,
            total_numbers,
        } => {
            println!(
                "{}",
                style(format!("Done: {matched} of {total_numbers} matched")).bold()
            );
        }
    }
}

/// Print the closing statistics block.
pub fn render_summary(report: &ResolutionReport) {
    println!();
    println!("{}", style("Results").bold());
    println!("  Numbers checked: {}", report.total_submitted);
    println!("  Accounts found:  {}", report.matched());
    println!(
        "  Success rate:    {:.1}%",
        report.success_rate() * 100.0
    );
    let failed = report
        .batches
        .iter()
        .filter(|b| b.error.is_some())
        .count();
    if failed > 0 {
        println!(
            "  {}",
            style(format!("Failed batches:  {failed}")).yellow()
        );
    }

    for account in &report.accounts {
        let handle = account
            .username
            .as_deref()
            .map(|u| format!("@{u}"))
            .unwrap_or_else(|| "no handle".to_string());
        println!(
            "  {} — {} — {}",
            account.display_name(),
            handle,
            account.phone
        );
    }
}

/// Export matched accounts as text lines: `name — handle — phone`.
pub fn export_text(report: &ResolutionReport, path: &Path) -> Result<()> {
    let mut lines = Vec::with_capacity(report.accounts.len());
    for account in &report.accounts {
        let handle = account
            .username
            .as_deref()
            .map(|u| format!("@{u}"))
            .unwrap_or_else(|| "no handle".to_string());
        lines.push(format!(
            "{} — {} — {}",
            account.display_name(),
            handle,
            account.phone
        ));
    }
    std::fs::write(path, lines.join("\n"))
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {} lines to {}", report.accounts.len(), path.display());
    Ok(())
}

/// Export the full report (per-batch detail included) as JSON.
pub fn export_json(report: &ResolutionReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote report to {}", path.display());
    Ok(())
}
