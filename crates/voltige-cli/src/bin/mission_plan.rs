//! Plan a mission file and print the report as JSON.
//!
//! Usage:
//!   cargo run -p voltige-cli --bin mission_plan -- demos/lake_rescue.json --pretty

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use voltige_cli::{init_tracing, load_session, Config};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan a mission and print its energy report")]
struct Args {
    /// Mission input JSON file
    input: PathBuf,

    /// Print only the segment rows
    #[arg(long)]
    segments: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    init_tracing()?;
    let args = Args::parse();
    let config = Config::from_env();

    let session = load_session(&args.input, config.engine_config())?;
    let report = session.report(None)?;

    tracing::info!(
        status = ?report.status,
        distance_km = format_args!("{:.2}", report.total_distance_km),
        battery_used = format_args!("{:.1}%", report.battery_used_percent),
        "mission planned"
    );
    for risk in &report.risks {
        tracing::warn!(?risk, "environmental risk");
    }

    let json = match (args.segments, args.pretty) {
        (true, true) => serde_json::to_string_pretty(&report.segments)?,
        (true, false) => serde_json::to_string(&report.segments)?,
        (false, true) => serde_json::to_string_pretty(&report)?,
        (false, false) => serde_json::to_string(&report)?,
    };
    println!("{json}");
    Ok(())
}
