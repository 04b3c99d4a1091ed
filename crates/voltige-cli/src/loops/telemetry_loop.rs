//! Telemetry replay loop.
//!
//! Steps the engine once per interval tick and logs a dashboard snapshot at a
//! fixed simulated-time cadence. A shutdown signal cancels the run between
//! steps.

use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, Interval, MissedTickBehavior};

use voltige_core::{
    drive_observed, Immediate, SimOutcome, StepClock, TelemetryEngine, TelemetryState,
};

use crate::config::Config;

/// Wall-clock pacing on a tokio interval.
pub struct IntervalClock(Interval);

impl IntervalClock {
    /// `period` must be non-zero.
    pub fn new(period: Duration) -> Self {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self(ticker)
    }
}

impl StepClock for IntervalClock {
    fn tick(&mut self) -> impl Future<Output = ()> + Send {
        async move {
            self.0.tick().await;
        }
    }
}

fn log_snapshot(state: &TelemetryState, every: u32) {
    if state.simulated_time_s % every != 0 {
        return;
    }
    let dash = state.dashboard();
    tracing::info!(
        clock = %dash.clock,
        phase = ?dash.phase,
        battery_percent = format_args!("{:.1}", dash.battery_percent),
        distance_km = format_args!("{:.2}", dash.distance_traveled_km),
        remaining_km = format_args!("{:.2}", dash.distance_remaining_km),
        waypoint = dash.current_waypoint,
        "telemetry"
    );
}

fn log_new_events(state: &TelemetryState, seen: &mut usize) {
    for event in &state.events[*seen..] {
        tracing::info!(clock = %event.clock(), kind = ?event.kind, "{}", event.message);
    }
    *seen = state.events.len();
}

/// Replay a started engine at `config.tick_ms` pacing until it halts or
/// `shutdown` fires.
pub async fn run_telemetry_loop(
    engine: &mut TelemetryEngine,
    config: &Config,
    mut shutdown: broadcast::Receiver<()>,
) -> SimOutcome {
    let every = config.snapshot_every.max(1);
    let mut seen = 0;
    let observe = move |state: &TelemetryState| {
        log_new_events(state, &mut seen);
        log_snapshot(state, every);
    };

    if config.tick_ms == 0 {
        return drive_observed(engine, &mut Immediate, observe).await;
    }

    let mut clock = IntervalClock::new(Duration::from_millis(config.tick_ms));
    let cancel = engine.cancel_token();

    let finished = tokio::select! {
        biased;
        _ = shutdown.recv() => None,
        outcome = drive_observed(engine, &mut clock, observe) => Some(outcome),
    };

    match finished {
        Some(outcome) => outcome,
        None => {
            tracing::info!("Telemetry loop shutting down");
            cancel.cancel();
            engine.step();
            engine.state().outcome()
        }
    }
}
