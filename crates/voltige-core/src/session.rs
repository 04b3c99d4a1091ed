//! Planning session: the single owner of one mission's inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::MissionError;
use crate::models::{
    ActionAssignment, ActionKind, DroneModel, EnvironmentalConditions, Payload, PayloadSelection,
    TravelMode, Waypoint, WaypointRole,
};
use crate::profile::{build_profile, MissionProfile};
use crate::report::{build_report, MissionReport};
use crate::simulation::TelemetryEngine;

/// Accepted speed range for airborne waypoints (km/h).
pub const SPEED_RANGE_KMH: (f64, f64) = (20.0, 160.0);
/// Accepted speed range for water legs, matching the water power calibration (km/h).
pub const WATER_SPEED_RANGE_KMH: (f64, f64) = (9.0, 28.0);
/// Accepted altitude range for user waypoints (m).
pub const ALTITUDE_RANGE_M: (f64, f64) = (0.0, 150.0);

const DEFAULT_SPEED_KMH: f64 = 50.0;
const DEFAULT_ALTITUDE_M: f64 = 50.0;

/// Validated input set handed over by a planning front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionInput {
    pub waypoints: Vec<Waypoint>,
    #[serde(default)]
    pub conditions: EnvironmentalConditions,
    #[serde(default)]
    pub drone: DroneModel,
    #[serde(default)]
    pub payloads: PayloadSelection,
    #[serde(default)]
    pub actions: BTreeMap<usize, Vec<ActionKind>>,
}

/// Edits applied to an existing waypoint; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct WaypointEdit {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub altitude_m: Option<f64>,
    pub mode: Option<TravelMode>,
}

/// Everything one planning session owns.
#[derive(Debug, Clone)]
pub struct MissionSession {
    waypoints: Vec<Waypoint>,
    actions: ActionAssignment,
    conditions: EnvironmentalConditions,
    drone: DroneModel,
    payloads: PayloadSelection,
    config: EngineConfig,
}

impl MissionSession {
    /// New session with only the home waypoint.
    pub fn new(home_lat: f64, home_lon: f64) -> Self {
        Self {
            waypoints: vec![Waypoint::home(home_lat, home_lon)],
            actions: ActionAssignment::default(),
            conditions: EnvironmentalConditions::default(),
            drone: DroneModel::default(),
            payloads: PayloadSelection::default(),
            config: EngineConfig::default(),
        }
    }

    /// Rebuild a session from a front end's input set.
    pub fn from_input(input: MissionInput) -> Result<Self, MissionError> {
        validate_waypoints(&input.waypoints)?;

        let mut actions = ActionAssignment::default();
        for (&index, kinds) in &input.actions {
            if index == 0 || index >= input.waypoints.len() {
                return Err(MissionError::UnknownWaypoint(index));
            }
            for &kind in kinds {
                actions.assign(index, kind);
            }
        }

        let mut waypoints = input.waypoints;
        waypoints[0].speed_kmh = 0.0;
        waypoints[0].altitude_m = 0.0;
        for wp in waypoints.iter_mut().skip(1) {
            wp.speed_kmh = clamp(wp.speed_kmh, speed_range(wp.mode));
            wp.altitude_m = clamp(wp.altitude_m, ALTITUDE_RANGE_M);
        }

        Ok(Self {
            waypoints,
            actions,
            conditions: input.conditions,
            drone: input.drone,
            payloads: input.payloads,
            config: EngineConfig::default(),
        })
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn actions(&self) -> &ActionAssignment {
        &self.actions
    }

    pub fn conditions(&self) -> &EnvironmentalConditions {
        &self.conditions
    }

    pub fn drone(&self) -> DroneModel {
        self.drone
    }

    pub fn payloads(&self) -> &PayloadSelection {
        &self.payloads
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Append a transit waypoint with default speed and altitude. Returns its index.
    pub fn add_waypoint(&mut self, lat: f64, lon: f64) -> usize {
        let index = self.waypoints.len();
        self.waypoints.push(Waypoint::transit(
            index,
            lat,
            lon,
            DEFAULT_ALTITUDE_M,
            DEFAULT_SPEED_KMH,
        ));
        index
    }

    /// Edit a transit waypoint, clamping speed and altitude to accepted ranges.
    pub fn edit_waypoint(&mut self, index: usize, edit: WaypointEdit) -> Result<(), MissionError> {
        if index == 0 {
            return Err(MissionError::HomeImmutable);
        }
        let wp = self
            .waypoints
            .get_mut(index)
            .ok_or(MissionError::UnknownWaypoint(index))?;

        if let Some(lat) = edit.lat {
            wp.lat = lat;
        }
        if let Some(lon) = edit.lon {
            wp.lon = lon;
        }
        if let Some(mode) = edit.mode {
            wp.mode = mode;
        }
        let speed = edit.speed_kmh.unwrap_or(wp.speed_kmh);
        wp.speed_kmh = clamp(speed, speed_range(wp.mode));
        if let Some(altitude) = edit.altitude_m {
            wp.altitude_m = clamp(altitude, ALTITUDE_RANGE_M);
        }
        Ok(())
    }

    /// Remove a transit waypoint and re-index everything after it.
    pub fn delete_waypoint(&mut self, index: usize) -> Result<Waypoint, MissionError> {
        if index == 0 {
            return Err(MissionError::HomeImmutable);
        }
        if index >= self.waypoints.len() {
            return Err(MissionError::UnknownWaypoint(index));
        }

        let removed = self.waypoints.remove(index);
        for (i, wp) in self.waypoints.iter_mut().enumerate() {
            wp.index = i;
        }
        self.actions.remove_waypoint(index);
        tracing::debug!(index, remaining = self.waypoints.len(), "waypoint deleted");
        Ok(removed)
    }

    /// Toggle an action at a transit waypoint. Returns whether it is now assigned.
    pub fn toggle_action(&mut self, index: usize, action: ActionKind) -> Result<bool, MissionError> {
        if index == 0 {
            return Err(MissionError::HomeImmutable);
        }
        if index >= self.waypoints.len() {
            return Err(MissionError::UnknownWaypoint(index));
        }
        Ok(self.actions.toggle(index, action))
    }

    pub fn set_conditions(&mut self, conditions: EnvironmentalConditions) {
        self.conditions = conditions;
    }

    pub fn select_drone(&mut self, drone: DroneModel) {
        self.drone = drone;
    }

    pub fn toggle_payload(&mut self, payload: Payload) -> bool {
        self.payloads.toggle(payload)
    }

    fn ensure_plannable(&self) -> Result<(), MissionError> {
        if self.waypoints.len() < 2 {
            return Err(MissionError::TooFewWaypoints(self.waypoints.len()));
        }
        Ok(())
    }

    /// Compute the mission profile.
    pub fn plan(&self) -> Result<MissionProfile, MissionError> {
        self.ensure_plannable()?;
        Ok(build_profile(
            &self.waypoints,
            &self.actions,
            &self.conditions,
            self.drone,
            &self.config,
        ))
    }

    /// Fresh, idle telemetry engine for the current plan.
    pub fn simulator(&self) -> Result<TelemetryEngine, MissionError> {
        self.ensure_plannable()?;
        TelemetryEngine::new(&self.waypoints, &self.actions, &self.conditions, &self.config)
    }

    /// Report for the current plan, folding in a finished run when given.
    pub fn report(&self, run: Option<&TelemetryEngine>) -> Result<MissionReport, MissionError> {
        let profile = self.plan()?;
        Ok(build_report(self, &profile, run.map(TelemetryEngine::state)))
    }

    /// Drop every waypoint but home and clear all assignments.
    pub fn reset(&mut self) {
        self.waypoints.truncate(1);
        self.actions = ActionAssignment::default();
    }
}

fn speed_range(mode: TravelMode) -> (f64, f64) {
    match mode {
        TravelMode::Air => SPEED_RANGE_KMH,
        TravelMode::Water => WATER_SPEED_RANGE_KMH,
    }
}

fn clamp(value: f64, (min, max): (f64, f64)) -> f64 {
    value.clamp(min, max)
}

fn validate_waypoints(waypoints: &[Waypoint]) -> Result<(), MissionError> {
    if waypoints.len() < 2 {
        return Err(MissionError::TooFewWaypoints(waypoints.len()));
    }
    if waypoints[0].role != WaypointRole::Home {
        return Err(MissionError::MissingHome);
    }
    for (position, wp) in waypoints.iter().enumerate() {
        if wp.index != position {
            return Err(MissionError::NonContiguousIndex {
                position,
                index: wp.index,
            });
        }
        if position > 0 && wp.role == WaypointRole::Home {
            return Err(MissionError::MisplacedHome(position));
        }
    }
    Ok(())
}
