//! Mission input files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use voltige_core::{EngineConfig, MissionInput, MissionSession};

/// Read a `MissionInput` JSON file into a validated session.
pub fn load_session(path: &Path, config: EngineConfig) -> Result<MissionSession> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read mission file {}", path.display()))?;
    parse_session(&raw, config).with_context(|| format!("Invalid mission file {}", path.display()))
}

pub fn parse_session(raw: &str, config: EngineConfig) -> Result<MissionSession> {
    let input: MissionInput = serde_json::from_str(raw).context("Malformed mission JSON")?;
    let session = MissionSession::from_input(input)?.with_config(config);
    tracing::debug!(
        waypoints = session.waypoints().len(),
        drone = ?session.drone(),
        "mission loaded"
    );
    Ok(session)
}
