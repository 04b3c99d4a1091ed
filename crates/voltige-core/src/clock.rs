//! Step scheduling for the telemetry engine.
//!
//! The engine never sleeps. A [`StepClock`] decides when the next step is
//! due, so hosts can pace the replay with a real timer while tests run it
//! back to back.

use std::future::{ready, Future};

use crate::simulation::{SimOutcome, TelemetryEngine, TelemetryState};

/// Source of step ticks.
pub trait StepClock {
    /// Resolve when the next step should run.
    fn tick(&mut self) -> impl Future<Output = ()> + Send;
}

/// Fires immediately; replays as fast as the engine can step.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl StepClock for Immediate {
    fn tick(&mut self) -> impl Future<Output = ()> + Send {
        ready(())
    }
}

/// Counts ticks without waiting.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingClock {
    pub ticks: u64,
}

impl StepClock for CountingClock {
    fn tick(&mut self) -> impl Future<Output = ()> + Send {
        self.ticks += 1;
        ready(())
    }
}

/// Step a started engine until it halts, waiting on `clock` between steps.
pub async fn drive<C: StepClock>(engine: &mut TelemetryEngine, clock: &mut C) -> SimOutcome {
    drive_observed(engine, clock, |_| {}).await
}

/// Like [`drive`], calling `observe` with the state after every step.
pub async fn drive_observed<C, F>(
    engine: &mut TelemetryEngine,
    clock: &mut C,
    mut observe: F,
) -> SimOutcome
where
    C: StepClock,
    F: FnMut(&TelemetryState),
{
    loop {
        let outcome = engine.step();
        observe(engine.state());
        if !outcome.is_continue() {
            break;
        }
        clock.tick().await;
    }
    engine.state().outcome()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::models::{ActionAssignment, EnvironmentalConditions, Waypoint};

    fn engine() -> TelemetryEngine {
        let route = vec![
            Waypoint::home(47.32, 5.04),
            Waypoint::transit(1, 47.33, 5.04, 50.0, 50.0),
        ];
        TelemetryEngine::new(
            &route,
            &ActionAssignment::default(),
            &EnvironmentalConditions::calm(),
            &EngineConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn immediate_clock_runs_to_completion() {
        let mut sim = engine();
        sim.start().unwrap();
        let outcome = drive(&mut sim, &mut Immediate).await;
        assert_eq!(outcome, SimOutcome::Completed);
    }

    #[tokio::test]
    async fn one_tick_between_each_step() {
        let mut sim = engine();
        sim.start().unwrap();
        let mut clock = CountingClock::default();
        let mut observed = 0u32;
        drive_observed(&mut sim, &mut clock, |_| observed += 1).await;

        let steps = sim.state().simulated_time_s;
        assert_eq!(observed, steps);
        assert_eq!(clock.ticks, u64::from(steps) - 1);
    }

    #[tokio::test]
    async fn unstarted_engine_halts_without_ticking() {
        let mut sim = engine();
        let mut clock = CountingClock::default();
        let outcome = drive(&mut sim, &mut clock).await;
        assert_eq!(outcome, SimOutcome::NotStarted);
        assert_eq!(clock.ticks, 0);
    }
}
