//! Voltige CLI - command line host for the mission engine.
//!
//! Binaries:
//! - mission_plan: plan a mission file and print its report
//! - mission_sim: replay a mission file on a paced telemetry loop

pub mod config;
pub mod input;
pub mod logging;
pub mod loops;

pub use config::Config;
pub use input::{load_session, parse_session};
pub use logging::init_tracing;
pub use loops::telemetry_loop::run_telemetry_loop;
