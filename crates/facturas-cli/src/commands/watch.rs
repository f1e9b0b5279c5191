//! Watch command - poll the invoice directory for new PDFs.

use std::collections::HashSet;
use std::time::Duration;

use clap::Args;
use console::style;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use facturas_core::models::config::FacturasConfig;
use facturas_core::pdf::list_pdfs;

use super::pass::{full_pass, print_pass};
use super::{Context, open_store};

/// Arguments for the watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Seconds between scans (overrides the config file)
    #[arg(short, long)]
    interval: Option<u64>,
}

fn pdf_names(config: &FacturasConfig) -> anyhow::Result<HashSet<String>> {
    Ok(list_pdfs(&config.paths.invoice_dir)?
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect())
}

/// Decides which ticks run a pass.
///
/// A pass is pending from start-up until one succeeds, so a failed pass is
/// retried on every tick. Otherwise only new PDFs trigger a pass.
struct PassSchedule {
    pending: bool,
}

impl PassSchedule {
    fn new() -> Self {
        Self { pending: true }
    }

    fn due(&self, new_pdfs: usize) -> bool {
        self.pending || new_pdfs > 0
    }

    fn finished(&mut self, succeeded: bool) {
        self.pending = !succeeded;
    }
}

pub async fn run(args: WatchArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let secs = args.interval.unwrap_or(config.watch.interval_secs).max(1);

    // Fail fast on a missing directory or an unusable database.
    let mut seen = pdf_names(&config)?;
    open_store(&config)?;

    println!(
        "{} Watching {} every {}s (Ctrl-C to stop)",
        style("ℹ").blue(),
        config.paths.invoice_dir.display(),
        secs
    );

    let mut ticker = interval(Duration::from_secs(secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut schedule = PassSchedule::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                println!("{} Stopped", style("✓").green());
                return Ok(());
            }
        }

        let current = match pdf_names(&config) {
            Ok(names) => names,
            Err(e) => {
                error!("Cannot scan {}: {}", config.paths.invoice_dir.display(), e);
                continue;
            }
        };

        let new: Vec<&String> = current.difference(&seen).collect();
        if !schedule.due(new.len()) {
            continue;
        }
        if !new.is_empty() {
            info!("{} new PDFs: {:?}", new.len(), new);
        }

        // PDF, CSV and SQLite work blocks; keep it off the runtime threads.
        let pass_config = config.clone();
        let mut pass = tokio::task::spawn_blocking(move || full_pass(&pass_config));
        let outcome = tokio::select! {
            joined = &mut pass => joined,
            _ = tokio::signal::ctrl_c() => {
                println!(
                    "{} Stopping after the current pass",
                    style("ℹ").blue()
                );
                let joined = pass.await;
                if let Ok(Ok(report)) = &joined {
                    print_pass(report);
                }
                println!("{} Stopped", style("✓").green());
                return joined?.map(|_| ());
            }
        };

        let result = outcome?;
        schedule.finished(result.is_ok());
        match result {
            Ok(report) => {
                print_pass(&report);
                seen = current;
            }
            Err(e) => error!("Pass failed: {:#}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_always_runs() {
        assert!(PassSchedule::new().due(0));
    }

    #[test]
    fn test_idle_tick_after_success_is_skipped() {
        let mut schedule = PassSchedule::new();
        schedule.finished(true);
        assert!(!schedule.due(0));
        assert!(schedule.due(2));
    }

    #[test]
    fn test_failed_first_pass_is_retried_without_new_files() {
        let mut schedule = PassSchedule::new();
        schedule.finished(false);
        assert!(schedule.due(0));

        schedule.finished(true);
        assert!(!schedule.due(0));
    }

    #[test]
    fn test_failure_after_success_is_retried() {
        let mut schedule = PassSchedule::new();
        schedule.finished(true);
        schedule.finished(false);
        assert!(schedule.due(0));
    }
}
