//! Final mission summary for export layers.

use serde::{Deserialize, Serialize};

use crate::actions::{waypoint_action_energy_wh, waypoint_action_seconds};
use crate::config::{EngineConfig, RiskThresholds};
use crate::detection::{conditions_detection, drift_m, is_night};
use crate::models::{DroneModel, EnvironmentalConditions, Payload};
use crate::profile::{MissionProfile, TimelineEntry};
use crate::route::Segment;
use crate::session::MissionSession;
use crate::simulation::{format_clock, Event, SimOutcome, TelemetryState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    /// Feasible with comfortable margins
    Ready,
    /// Feasible, but battery or autonomy margin is thin
    MarginTight,
    Infeasible,
    /// The simulated run aborted
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    HighWind,
    LowVisibility,
    HighWaves,
    ColdWater,
    /// Take-off mass above the airframe limit
    Overweight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadSummary {
    pub drone_weight_kg: f64,
    pub payload_weight_kg: f64,
    pub total_mass_kg: f64,
    pub max_mass_kg: f64,
    pub within_limit: bool,
    pub mission_autonomy_min: f64,
}

/// Action load at one waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointActions {
    pub waypoint: usize,
    pub count: usize,
    pub duration_s: u32,
    pub energy_wh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub outcome: SimOutcome,
    pub duration_s: u32,
    pub clock: String,
    pub distance_traveled_km: f64,
    pub battery_percent: f64,
    pub battery_wh: f64,
    pub events: Vec<Event>,
}

impl SimulationSummary {
    fn from_state(state: &TelemetryState) -> Self {
        Self {
            outcome: state.outcome(),
            duration_s: state.simulated_time_s,
            clock: format_clock(state.simulated_time_s),
            distance_traveled_km: state.distance_traveled_km,
            battery_percent: state.battery_percent,
            battery_wh: state.battery_wh,
            events: state.events.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionReport {
    pub status: MissionStatus,
    pub feasible: bool,
    pub drone: DroneModel,
    pub drone_name: String,
    pub conditions: EnvironmentalConditions,
    pub total_distance_km: f64,
    pub total_time_min: f64,
    /// Energy the plan calls for
    pub planned_energy_wh: f64,
    /// Drawn by the simulated run when one was supplied, otherwise planned
    pub energy_used_wh: f64,
    pub energy_remaining_wh: f64,
    pub battery_used_percent: f64,
    pub battery_remaining_percent: f64,
    pub autonomy_min: f64,
    pub autonomy_margin_min: f64,
    pub risks: Vec<RiskFlag>,
    pub detection_probability: f64,
    pub night: bool,
    pub drift_m: f64,
    pub payload: PayloadSummary,
    pub waypoint_actions: Vec<WaypointActions>,
    pub segments: Vec<Segment>,
    pub timeline: Vec<TimelineEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationSummary>,
}

/// Environmental conditions beyond the configured limits.
pub fn risk_flags(conditions: &EnvironmentalConditions, limits: &RiskThresholds) -> Vec<RiskFlag> {
    let mut risks = Vec::new();
    if conditions.wind_kmh > limits.max_wind_kmh {
        risks.push(RiskFlag::HighWind);
    }
    if conditions.visibility_m < limits.min_visibility_m {
        risks.push(RiskFlag::LowVisibility);
    }
    if conditions.wave_height_m > limits.max_wave_height_m {
        risks.push(RiskFlag::HighWaves);
    }
    if conditions.water_temp_c < limits.min_water_temp_c {
        risks.push(RiskFlag::ColdWater);
    }
    risks
}

/// Classify the plan, letting an aborted run override the planned verdict.
/// An airframe over its mass limit is never flyable.
pub fn classify(
    profile: &MissionProfile,
    within_mass_limit: bool,
    outcome: Option<SimOutcome>,
    config: &EngineConfig,
) -> MissionStatus {
    if matches!(outcome, Some(SimOutcome::Aborted(_))) {
        return MissionStatus::Aborted;
    }
    if !profile.feasible || !within_mass_limit {
        return MissionStatus::Infeasible;
    }
    if profile.battery_remaining_percent <= config.tight_battery_margin_percent
        || profile.autonomy_margin_min() < config.tight_autonomy_margin_min
    {
        return MissionStatus::MarginTight;
    }
    MissionStatus::Ready
}

/// Assemble the report. Pure: no rendering, no I/O.
pub fn build_report(
    session: &MissionSession,
    profile: &MissionProfile,
    telemetry: Option<&TelemetryState>,
) -> MissionReport {
    let config = session.config();
    let conditions = session.conditions();
    let drone = session.drone();
    let payloads = session.payloads();

    let payload = PayloadSummary {
        drone_weight_kg: drone.spec().base_weight_kg,
        payload_weight_kg: payloads.weight_kg(),
        total_mass_kg: payloads.total_mass_kg(drone),
        max_mass_kg: drone.spec().max_payload_weight_kg,
        within_limit: payloads.is_within_limit(drone),
        mission_autonomy_min: payloads.mission_autonomy_min(drone),
    };

    let usable_wh = config.battery.usable_wh();
    let (energy_used_wh, energy_remaining_wh) = match telemetry {
        Some(state) if state.outcome() != SimOutcome::NotStarted => {
            (usable_wh - state.battery_wh, state.battery_wh)
        }
        _ => (profile.total_energy_wh, usable_wh - profile.total_energy_wh),
    };

    let mut risks = risk_flags(conditions, &config.risk);
    if !payload.within_limit {
        risks.push(RiskFlag::Overweight);
    }

    let actions = session.actions();
    let waypoint_actions = actions
        .waypoints()
        .map(|waypoint| WaypointActions {
            waypoint,
            count: actions.actions_at(waypoint).count(),
            duration_s: waypoint_action_seconds(actions, waypoint),
            energy_wh: waypoint_action_energy_wh(actions, waypoint),
        })
        .collect();

    MissionReport {
        status: classify(
            profile,
            payload.within_limit,
            telemetry.map(TelemetryState::outcome),
            config,
        ),
        feasible: profile.feasible && payload.within_limit,
        drone,
        drone_name: drone.spec().name.to_string(),
        conditions: conditions.clone(),
        total_distance_km: profile.total_distance_km,
        total_time_min: profile.total_time_min,
        planned_energy_wh: profile.total_energy_wh,
        energy_used_wh,
        energy_remaining_wh,
        battery_used_percent: profile.battery_used_percent,
        battery_remaining_percent: profile.battery_remaining_percent,
        autonomy_min: profile.autonomy_min,
        autonomy_margin_min: profile.autonomy_margin_min(),
        risks,
        detection_probability: conditions_detection(conditions, payloads.contains(Payload::Thermal)),
        night: is_night(conditions.time_of_day),
        drift_m: drift_m(conditions.current_kmh, profile.total_distance_km),
        payload,
        waypoint_actions,
        segments: profile.segments.clone(),
        timeline: profile.timeline.clone(),
        simulation: telemetry.map(SimulationSummary::from_state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionKind, TimeOfDay, Weather};

    fn session() -> MissionSession {
        let mut s = MissionSession::new(47.32, 5.04);
        s.add_waypoint(47.33, 5.04);
        s.set_conditions(EnvironmentalConditions::calm());
        s
    }

    #[test]
    fn short_calm_mission_is_ready() {
        let s = session();
        let report = s.report(None).unwrap();
        assert_eq!(report.status, MissionStatus::Ready);
        assert!(report.feasible);
        assert!(report.risks.is_empty());
        assert!(report.simulation.is_none());
        assert_eq!(report.segments.len(), 2);
        assert!((report.energy_used_wh + report.energy_remaining_wh - 345.6).abs() < 1e-9);
    }

    #[test]
    fn thin_autonomy_margin_is_tight() {
        // 11.1 km out and back at 50 km/h on drone A: 26.7 of 28 minutes
        let mut s = session();
        s.select_drone(DroneModel::A);
        s.edit_waypoint(
            1,
            crate::session::WaypointEdit {
                lat: Some(47.42),
                ..Default::default()
            },
        )
        .unwrap();
        let report = s.report(None).unwrap();
        assert!(report.feasible);
        assert!(report.autonomy_margin_min < 5.0);
        assert_eq!(report.status, MissionStatus::MarginTight);
    }

    #[test]
    fn infeasible_plan_is_flagged() {
        let mut s = session();
        s.edit_waypoint(
            1,
            crate::session::WaypointEdit {
                lat: Some(47.62),
                ..Default::default()
            },
        )
        .unwrap();
        let report = s.report(None).unwrap();
        assert_eq!(report.status, MissionStatus::Infeasible);
        assert!(report.battery_remaining_percent < 0.0);
        assert!(report.energy_remaining_wh < 0.0);
    }

    #[test]
    fn aborted_run_overrides_plan_verdict() {
        let mut s = session();
        s.edit_waypoint(
            1,
            crate::session::WaypointEdit {
                lat: Some(47.62),
                speed_kmh: Some(160.0),
                ..Default::default()
            },
        )
        .unwrap();
        let mut sim = s.simulator().unwrap();
        sim.start().unwrap();
        sim.run_to_end();

        let report = s.report(Some(&sim)).unwrap();
        assert_eq!(report.status, MissionStatus::Aborted);
        assert!((report.energy_remaining_wh - sim.state().battery_wh).abs() < 1e-9);
        assert!((report.energy_used_wh + report.energy_remaining_wh - 345.6).abs() < 1e-9);
        // The run stopped short, so it drew less than the plan asked for
        assert!(report.energy_used_wh < report.planned_energy_wh);
        let summary = report.simulation.unwrap();
        assert!(matches!(summary.outcome, SimOutcome::Aborted(_)));
        assert_eq!(
            summary.events.last().map(|e| e.kind),
            Some(crate::simulation::EventKind::Warning)
        );
    }

    #[test]
    fn overweight_airframe_is_infeasible() {
        let mut s = session();
        s.select_drone(DroneModel::A);
        s.toggle_payload(Payload::Thermal);
        s.toggle_payload(Payload::Beacon);

        let report = s.report(None).unwrap();
        assert!(!report.payload.within_limit);
        assert!((report.payload.total_mass_kg - 2.45).abs() < 1e-9);
        assert!(!report.feasible);
        assert_eq!(report.status, MissionStatus::Infeasible);
        assert!(report.risks.contains(&RiskFlag::Overweight));

        s.select_drone(DroneModel::B);
        let report = s.report(None).unwrap();
        assert!(report.payload.within_limit);
        assert_eq!(report.status, MissionStatus::Ready);
    }

    #[test]
    fn completed_run_reports_drawn_energy() {
        let s = session();
        let mut sim = s.simulator().unwrap();
        sim.start().unwrap();
        sim.run_to_end();

        let report = s.report(Some(&sim)).unwrap();
        assert_eq!(report.status, MissionStatus::Ready);
        assert!((report.energy_used_wh - (345.6 - sim.state().battery_wh)).abs() < 1e-9);
        // Whole-second arrival adds at most a couple of seconds of draw
        assert!((report.energy_used_wh - report.planned_energy_wh).abs() < 0.5);
    }

    #[test]
    fn per_waypoint_action_load() {
        let mut s = session();
        s.add_waypoint(47.34, 5.04);
        s.toggle_action(2, ActionKind::Photo).unwrap();
        s.toggle_action(2, ActionKind::Hover).unwrap();

        let report = s.report(None).unwrap();
        assert_eq!(report.waypoint_actions.len(), 1);
        let load = &report.waypoint_actions[0];
        assert_eq!(load.waypoint, 2);
        assert_eq!(load.count, 2);
        assert_eq!(load.duration_s, 31);
        assert!((load.energy_wh - (585.0 * 30.0 + 80.0) / 3600.0).abs() < 1e-9);
    }

    #[test]
    fn environmental_risks() {
        let conditions = EnvironmentalConditions {
            wind_kmh: 25.0,
            visibility_m: 30.0,
            wave_height_m: 3.0,
            water_temp_c: 4.0,
            weather: Weather::HeavyRain,
            time_of_day: TimeOfDay::hm(22, 0).unwrap(),
            ..EnvironmentalConditions::default()
        };
        let flags = risk_flags(&conditions, &RiskThresholds::default());
        assert_eq!(
            flags,
            vec![
                RiskFlag::HighWind,
                RiskFlag::LowVisibility,
                RiskFlag::HighWaves,
                RiskFlag::ColdWater
            ]
        );

        let mut s = session();
        s.set_conditions(conditions);
        let report = s.report(None).unwrap();
        assert!(report.night);
        assert_eq!(report.risks.len(), 4);
    }

    #[test]
    fn thresholds_are_strict() {
        let conditions = EnvironmentalConditions {
            wind_kmh: 20.0,
            visibility_m: 50.0,
            wave_height_m: 2.5,
            water_temp_c: 5.0,
            ..EnvironmentalConditions::default()
        };
        assert!(risk_flags(&conditions, &RiskThresholds::default()).is_empty());
    }
}
