//! rules-worker — periodic scheduling passes over due rules.
//!
//! The engine defines what "due" means; this binary supplies the external
//! trigger cadence. Each tick runs every due rule once, with per-rule
//! failure isolation, and logs the pass counters. Failed rules keep their
//! previous last-run stamp and are retried on a later tick.

use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info};

use feedloop_core::config::{load_dotenv, Config};
use feedloop_rules::run_due;
use feedloop_storage::PgRuleStore;

// ── CLI ─────────────────────────────────────────────────────────────

/// Feedloop rules worker — runs due rules on a fixed tick.
#[derive(Parser, Debug)]
#[command(name = "rules-worker", version, about)]
struct Cli {
    /// Seconds between scheduling passes (overrides WORKER_TICK_SECONDS).
    #[arg(long)]
    tick: Option<u64>,

    /// Run a single scheduling pass and exit.
    #[arg(long)]
    once: bool,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let store = PgRuleStore::connect(&config.postgres).await?;
    let tick = Duration::from_secs(cli.tick.unwrap_or(config.worker.tick_seconds));

    info!(tick_seconds = tick.as_secs(), "rules-worker starting");

    loop {
        if let Err(e) = run_due(&store, Utc::now()).await {
            // The pass itself failed before any rule ran (e.g. the due-rules
            // query); individual rule failures are already folded into the
            // pass counters inside run_due.
            error!(error = %e, "scheduling pass failed");
        }

        if cli.once {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(tick) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        }
    }

    info!("rules-worker exited cleanly");
    Ok(())
}
