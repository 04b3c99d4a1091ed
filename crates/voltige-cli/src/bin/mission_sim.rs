//! Replay a mission file on a paced telemetry loop.
//!
//! Telemetry snapshots and events are logged to stderr while the run
//! progresses; the final report, including the event log, goes to stdout.
//! Ctrl-C cancels the run and still prints the report.
//!
//! Usage:
//!   VOLTIGE_TICK_MS=10 cargo run -p voltige-cli --bin mission_sim -- demos/lake_rescue.json

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::sync::broadcast;

use voltige_cli::{init_tracing, load_session, run_telemetry_loop, Config};

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulate a mission and print the final report")]
struct Args {
    /// Mission input JSON file
    input: PathBuf,

    /// Milliseconds between steps; overrides VOLTIGE_TICK_MS
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(tick_ms) = args.tick_ms {
        config.tick_ms = tick_ms;
    }

    let session = load_session(&args.input, config.engine_config())?;
    let mut engine = session.simulator()?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c_tx.send(());
        }
    });

    tracing::info!(tick_ms = config.tick_ms, "Starting simulation...");
    engine.start()?;
    let outcome = run_telemetry_loop(&mut engine, &config, shutdown_rx).await;
    drop(shutdown_tx);

    match outcome {
        voltige_core::SimOutcome::Completed => tracing::info!("Simulation completed"),
        other => tracing::warn!(outcome = ?other, "Simulation did not complete"),
    }

    let report = session.report(Some(&engine))?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}
