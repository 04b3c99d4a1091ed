//! Paced loops driving the simulation engine.

pub mod telemetry_loop;
