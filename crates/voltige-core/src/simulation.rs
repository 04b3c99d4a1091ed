//! Fixed-step telemetry simulation.
//!
//! Replays a planned mission one simulated second per [`TelemetryEngine::step`]
//! call. The engine owns all mutable telemetry; a host drives it through a
//! [`crate::clock::StepClock`] or calls `step` directly.
//!
//! Phase flow:
//! `Idle -> Departing -> EnRoute(1) -> AtWaypoint(1) -> EnRoute(2) -> ...
//! -> Returning -> Completed`, with `Aborted` reachable from any moving phase.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::actions::{actions_for, ScheduledAction};
use crate::config::EngineConfig;
use crate::error::MissionError;
use crate::geometry::{along_leg, distance_km, GeoPoint};
use crate::models::{ActionAssignment, EnvironmentalConditions, TravelMode, Waypoint};
use crate::power::travel_power;

/// Tolerance when comparing traveled distance to leg boundaries (km).
const ARRIVAL_EPS_KM: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    BatteryCritical,
    TimeLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "detail", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Departing,
    EnRoute(usize),
    AtWaypoint(usize),
    Returning,
    Completed,
    Aborted(AbortReason),
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Aborted(_))
    }
}

/// How a run ended, or that it has not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimOutcome {
    NotStarted,
    Running,
    Completed,
    Aborted(AbortReason),
    /// Stopped from outside before reaching a terminal phase
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Info,
    Success,
    Warning,
    Action,
}

/// Log entry emitted by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub simulated_time_s: u32,
    pub message: String,
    pub kind: EventKind,
    pub battery_percent: f64,
    pub distance_km: f64,
}

impl Event {
    /// Event time as `HH:MM:SS`.
    pub fn clock(&self) -> String {
        format_clock(self.simulated_time_s)
    }
}

/// Render simulated seconds as `HH:MM:SS`.
pub fn format_clock(seconds: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Live mission state, mutated only by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryState {
    pub phase: Phase,
    pub simulated_time_s: u32,
    pub current_waypoint: usize,
    pub battery_wh: f64,
    pub battery_percent: f64,
    pub distance_traveled_km: f64,
    pub distance_remaining_km: f64,
    pub speed_kmh: f64,
    pub altitude_m: f64,
    /// Interpolated position along the active leg
    pub position: GeoPoint,
    pub events: Vec<Event>,
    pub running: bool,
}

impl TelemetryState {
    fn initial(battery_wh: f64, total_km: f64, home: GeoPoint) -> Self {
        Self {
            phase: Phase::Idle,
            simulated_time_s: 0,
            current_waypoint: 0,
            battery_wh,
            battery_percent: 100.0,
            distance_traveled_km: 0.0,
            distance_remaining_km: total_km,
            speed_kmh: 0.0,
            altitude_m: 0.0,
            position: home,
            events: Vec::new(),
            running: false,
        }
    }

    pub fn outcome(&self) -> SimOutcome {
        match self.phase {
            Phase::Idle => SimOutcome::NotStarted,
            Phase::Completed => SimOutcome::Completed,
            Phase::Aborted(reason) => SimOutcome::Aborted(reason),
            _ if self.running => SimOutcome::Running,
            _ => SimOutcome::Cancelled,
        }
    }

    /// Dashboard fields without the event log.
    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            phase: self.phase,
            clock: format_clock(self.simulated_time_s),
            battery_percent: self.battery_percent,
            battery_wh: self.battery_wh,
            speed_kmh: self.speed_kmh,
            altitude_m: self.altitude_m,
            distance_traveled_km: self.distance_traveled_km,
            distance_remaining_km: self.distance_remaining_km,
            current_waypoint: self.current_waypoint,
            position: self.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub phase: Phase,
    pub clock: String,
    pub battery_percent: f64,
    pub battery_wh: f64,
    pub speed_kmh: f64,
    pub altitude_m: f64,
    pub distance_traveled_km: f64,
    pub distance_remaining_km: f64,
    pub current_waypoint: usize,
    pub position: GeoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Halted,
}

impl StepOutcome {
    pub fn is_continue(self) -> bool {
        self == StepOutcome::Continue
    }
}

/// Cooperative cancellation flag shared with the host.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
struct SimLeg {
    to: usize,
    from_pos: GeoPoint,
    to_pos: GeoPoint,
    speed_kmh: f64,
    altitude_m: f64,
    mode: TravelMode,
    start_km: f64,
    end_km: f64,
}

#[derive(Debug, Clone)]
struct RunningAction {
    action: ScheduledAction,
    remaining_s: u32,
}

/// Time-stepped replay of one mission.
pub struct TelemetryEngine {
    legs: Vec<SimLeg>,
    actions: Vec<Vec<ScheduledAction>>,
    conditions: EnvironmentalConditions,
    config: EngineConfig,
    total_km: f64,
    home: GeoPoint,
    leg: usize,
    queue: VecDeque<RunningAction>,
    cancel: CancelToken,
    state: TelemetryState,
}

impl TelemetryEngine {
    /// Prepare a run over `waypoints` (home first, at least one more).
    pub fn new(
        waypoints: &[Waypoint],
        assignment: &ActionAssignment,
        conditions: &EnvironmentalConditions,
        config: &EngineConfig,
    ) -> Result<Self, MissionError> {
        if waypoints.len() < 2 {
            return Err(MissionError::TooFewWaypoints(waypoints.len()));
        }

        let mut legs = Vec::with_capacity(waypoints.len());
        let mut cumulative = 0.0;
        let mut push_leg = |from: &Waypoint, to: &Waypoint, speed_kmh, altitude_m, mode| {
            let from_pos = from.position();
            let to_pos = to.position();
            let start_km = cumulative;
            cumulative += distance_km(from_pos, to_pos);
            legs.push(SimLeg {
                to: to.index,
                from_pos,
                to_pos,
                speed_kmh,
                altitude_m,
                mode,
                start_km,
                end_km: cumulative,
            });
        };

        for pair in waypoints.windows(2) {
            push_leg(&pair[0], &pair[1], pair[1].speed_kmh, pair[1].altitude_m, pair[1].mode);
        }
        let home = &waypoints[0];
        let last = &waypoints[waypoints.len() - 1];
        push_leg(last, home, config.return_speed_kmh, last.altitude_m, TravelMode::Air);

        let actions = (0..waypoints.len())
            .map(|index| actions_for(assignment, index))
            .collect();

        let battery_wh = config.battery.usable_wh();
        Ok(Self {
            legs,
            actions,
            conditions: conditions.clone(),
            config: config.clone(),
            total_km: cumulative,
            home: home.position(),
            leg: 0,
            queue: VecDeque::new(),
            cancel: CancelToken::default(),
            state: TelemetryState::initial(battery_wh, cumulative, home.position()),
        })
    }

    pub fn state(&self) -> &TelemetryState {
        &self.state
    }

    pub fn events(&self) -> &[Event] {
        &self.state.events
    }

    /// Handle the host can use to stop the run between steps.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Leave `Idle`: emit the departure event and head for waypoint 1.
    pub fn start(&mut self) -> Result<(), MissionError> {
        if self.state.phase != Phase::Idle {
            return Err(MissionError::AlreadyStarted);
        }

        self.state.running = true;
        self.state.phase = Phase::Departing;
        self.emit(EventKind::Info, "Departure from home base");

        self.leg = 0;
        self.enter_leg();
        self.state.phase = Phase::EnRoute(1);
        tracing::debug!(total_km = self.total_km, "simulation started");
        Ok(())
    }

    /// Back to `Idle` with a full pack and an empty log.
    pub fn reset(&mut self) {
        self.cancel.clear();
        self.leg = 0;
        self.queue.clear();
        self.state = TelemetryState::initial(self.config.battery.usable_wh(), self.total_km, self.home);
    }

    /// Advance one simulated second.
    pub fn step(&mut self) -> StepOutcome {
        if self.cancel.is_cancelled() && self.state.running {
            self.state.running = false;
            tracing::info!(time_s = self.state.simulated_time_s, "simulation cancelled");
        }
        if !self.state.running || self.state.phase.is_terminal() {
            return StepOutcome::Halted;
        }

        self.state.simulated_time_s += 1;
        match self.state.phase {
            Phase::EnRoute(_) | Phase::Returning => self.fly_one_second(),
            Phase::AtWaypoint(_) => self.work_one_second(),
            _ => {}
        }

        let usable = self.config.battery.usable_wh();
        self.state.battery_percent = if usable > 0.0 {
            self.state.battery_wh / usable * 100.0
        } else {
            0.0
        };
        self.state.distance_remaining_km =
            (self.total_km - self.state.distance_traveled_km).max(0.0);

        if self.state.battery_percent < self.config.critical_battery_percent {
            return self.abort(AbortReason::BatteryCritical, "Battery critical, mission aborted");
        }

        match self.state.phase {
            Phase::EnRoute(index) => {
                if self.state.distance_traveled_km + ARRIVAL_EPS_KM >= self.legs[self.leg].end_km {
                    self.arrive(index);
                }
            }
            Phase::AtWaypoint(index) => self.advance_actions(index),
            Phase::Returning => {
                if self.state.distance_traveled_km + ARRIVAL_EPS_KM >= self.total_km {
                    return self.complete();
                }
            }
            _ => {}
        }

        if self.state.simulated_time_s >= self.config.max_simulated_seconds {
            return self.abort(AbortReason::TimeLimit, "Simulated time limit reached, mission aborted");
        }

        StepOutcome::Continue
    }

    /// Step until the run halts.
    pub fn run_to_end(&mut self) -> SimOutcome {
        while self.step().is_continue() {}
        self.state.outcome()
    }

    fn fly_one_second(&mut self) {
        let leg = &self.legs[self.leg];
        if leg.speed_kmh <= 0.0 {
            // Planned as a zero-time, zero-energy leg: snap to its end.
            self.state.distance_traveled_km = self.state.distance_traveled_km.max(leg.end_km);
            self.state.speed_kmh = 0.0;
            self.state.altitude_m = leg.altitude_m;
            self.state.position = leg.to_pos;
            return;
        }
        let power_w = travel_power(leg.mode, leg.speed_kmh, &self.conditions);
        self.state.battery_wh -= power_w / 3600.0;
        self.state.distance_traveled_km += leg.speed_kmh / 3600.0;
        self.state.speed_kmh = leg.speed_kmh;
        self.state.altitude_m = leg.altitude_m;
        self.state.position = along_leg(
            leg.from_pos,
            leg.to_pos,
            self.state.distance_traveled_km - leg.start_km,
        );
    }

    fn work_one_second(&mut self) {
        self.state.speed_kmh = 0.0;
        if let Some(running) = self.queue.front_mut() {
            self.state.battery_wh -= running.action.power_w / 3600.0;
            running.remaining_s = running.remaining_s.saturating_sub(1);
        }
    }

    fn enter_leg(&mut self) {
        let leg = &self.legs[self.leg];
        self.state.current_waypoint = leg.to;
        self.state.speed_kmh = leg.speed_kmh;
        self.state.altitude_m = leg.altitude_m;
    }

    fn arrive(&mut self, index: usize) {
        self.state.phase = Phase::AtWaypoint(index);
        self.state.current_waypoint = index;
        self.state.position = self.legs[self.leg].to_pos;
        self.emit(EventKind::Success, format!("Arrived at WP{index}"));
        tracing::debug!(waypoint = index, time_s = self.state.simulated_time_s, "waypoint reached");

        self.queue = self
            .actions
            .get(index)
            .into_iter()
            .flatten()
            .filter(|a| a.duration_s > 0)
            .map(|a| RunningAction {
                action: a.clone(),
                remaining_s: a.duration_s,
            })
            .collect();

        match self.queue.front() {
            Some(first) => {
                let action = first.action.clone();
                self.emit_action(&action);
            }
            None => self.depart(index),
        }
    }

    fn advance_actions(&mut self, index: usize) {
        let finished = self.queue.front().is_some_and(|a| a.remaining_s == 0);
        if !finished && !self.queue.is_empty() {
            return;
        }
        self.queue.pop_front();
        match self.queue.front() {
            Some(next) => {
                let action = next.action.clone();
                self.emit_action(&action);
            }
            None => self.depart(index),
        }
    }

    fn depart(&mut self, index: usize) {
        self.leg += 1;
        let returning = self.leg + 1 == self.legs.len();
        self.enter_leg();
        if returning {
            self.state.phase = Phase::Returning;
            self.emit(EventKind::Info, "Returning to home (RTH)");
        } else {
            self.state.phase = Phase::EnRoute(index + 1);
        }
    }

    fn complete(&mut self) -> StepOutcome {
        self.state.phase = Phase::Completed;
        self.state.current_waypoint = 0;
        self.state.speed_kmh = 0.0;
        self.state.position = self.home;
        self.state.distance_remaining_km = 0.0;
        self.emit(EventKind::Success, "Mission complete, landed at home");
        self.state.running = false;
        tracing::info!(
            time_s = self.state.simulated_time_s,
            battery_percent = self.state.battery_percent,
            "simulation completed"
        );
        StepOutcome::Halted
    }

    fn abort(&mut self, reason: AbortReason, message: &str) -> StepOutcome {
        self.state.phase = Phase::Aborted(reason);
        self.emit(EventKind::Warning, message);
        self.state.running = false;
        tracing::warn!(
            ?reason,
            time_s = self.state.simulated_time_s,
            battery_percent = self.state.battery_percent,
            "simulation aborted"
        );
        StepOutcome::Halted
    }

    fn emit_action(&mut self, action: &ScheduledAction) {
        let spec = action.action.spec();
        self.emit(
            EventKind::Action,
            format!("{} - {}s at WP{}", spec.label, spec.duration_s, action.waypoint),
        );
    }

    fn emit(&mut self, kind: EventKind, message: impl Into<String>) {
        let event = Event {
            simulated_time_s: self.state.simulated_time_s,
            message: message.into(),
            kind,
            battery_percent: self.state.battery_percent,
            distance_km: self.state.distance_traveled_km,
        };
        tracing::debug!(time = %event.clock(), kind = ?event.kind, message = %event.message, "telemetry event");
        self.state.events.push(event);
    }
}
