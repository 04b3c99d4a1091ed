//! End-to-end mission tests: plan, simulate, report.

use voltige_core::{
    drive, AbortReason, ActionKind, EngineConfig, EnvironmentalConditions, EventKind, Immediate,
    MissionInput, MissionSession, MissionStatus, Phase, SegmentKind, SimOutcome, WaypointEdit,
};

fn reference_session() -> MissionSession {
    let mut session = MissionSession::new(47.32, 5.04);
    session.add_waypoint(47.33, 5.04);
    session.set_conditions(EnvironmentalConditions::calm());
    session
}

#[test]
fn test_reference_mission_profile() {
    let profile = reference_session().plan().unwrap();

    assert_eq!(profile.segments.len(), 2);
    let out = &profile.segments[0];
    assert!((out.distance_km - 1.11).abs() < 0.01);
    assert!((out.duration_min - 1.33).abs() < 0.01);
    assert_eq!(out.power_w, 600.0);
    assert!((out.energy_wh - 13.3).abs() < 0.1);
    assert!((out.battery_percent - 3.85).abs() < 0.02);

    let back = &profile.segments[1];
    assert_eq!(back.kind, SegmentKind::ReturnHome);
    assert!((back.distance_km - out.distance_km).abs() < 1e-9);

    assert!((profile.battery_used_percent - 7.7).abs() < 0.05);
    assert!(profile.feasible);
}

#[test]
fn test_wind_raises_leg_power() {
    let mut session = reference_session();
    session.set_conditions(EnvironmentalConditions {
        wind_kmh: 40.0,
        ..EnvironmentalConditions::calm()
    });
    let profile = session.plan().unwrap();
    assert!((profile.segments[0].power_w - 696.0).abs() < 1e-9);
}

#[test]
fn test_timeline_energy_sums_to_total() {
    let mut session = reference_session();
    session.add_waypoint(47.34, 5.05);
    session.toggle_action(1, ActionKind::Photo).unwrap();
    session.toggle_action(2, ActionKind::ThermalScan).unwrap();
    session.toggle_action(2, ActionKind::WaterSampling).unwrap();

    let profile = session.plan().unwrap();
    let from_timeline: f64 = profile.timeline.iter().map(|e| e.energy_wh).sum();
    assert!((from_timeline - profile.total_energy_wh).abs() < 1e-9);

    let from_segments: f64 = profile.segments.iter().map(|s| s.energy_wh).sum();
    assert!(from_segments < profile.total_energy_wh);
}

#[test]
fn test_simulation_matches_plan_distance() {
    let session = reference_session();
    let profile = session.plan().unwrap();

    let mut sim = session.simulator().unwrap();
    sim.start().unwrap();
    assert_eq!(sim.run_to_end(), SimOutcome::Completed);

    let state = sim.state();
    assert_eq!(state.phase, Phase::Completed);
    // Arrival is detected on whole seconds, so each leg may overshoot slightly.
    assert!((state.distance_traveled_km - profile.total_distance_km).abs() < 0.05);
    assert!((100.0 - state.battery_percent - profile.battery_used_percent).abs() < 0.5);
}

#[tokio::test]
async fn test_battery_critical_abort_before_final_waypoint() {
    let mut session = reference_session();
    session.add_waypoint(47.62, 5.04);
    session
        .edit_waypoint(
            2,
            WaypointEdit {
                speed_kmh: Some(20.0),
                ..WaypointEdit::default()
            },
        )
        .unwrap();

    let mut sim = session.simulator().unwrap();
    sim.start().unwrap();
    let outcome = drive(&mut sim, &mut Immediate).await;

    assert_eq!(outcome, SimOutcome::Aborted(AbortReason::BatteryCritical));
    let state = sim.state();
    assert!(!state.running);
    assert!(state.events.iter().any(|e| e.message == "Arrived at WP1"));
    assert!(!state.events.iter().any(|e| e.message == "Arrived at WP2"));

    let last = state.events.last().unwrap();
    assert_eq!(last.kind, EventKind::Warning);
    assert_eq!(last.simulated_time_s, state.simulated_time_s);

    // No step after the abort changes anything.
    let events = state.events.len();
    sim.step();
    assert_eq!(sim.events().len(), events);

    let report = session.report(Some(&sim)).unwrap();
    assert_eq!(report.status, MissionStatus::Aborted);
}

#[test]
fn test_json_input_round_trip() {
    let raw = r#"{
        "waypoints": [
            { "index": 0, "lat": 47.32, "lon": 5.04, "altitude_m": 0, "speed_kmh": 0, "role": "home" },
            { "index": 1, "lat": 47.33, "lon": 5.04, "altitude_m": 60, "speed_kmh": 70 },
            { "index": 2, "lat": 47.33, "lon": 5.05, "altitude_m": 0, "speed_kmh": 18, "mode": "water" }
        ],
        "conditions": { "wind_kmh": 10, "time_of_day": "21:30", "weather": "light-rain" },
        "drone": "C",
        "payloads": ["thermal", "beacon"],
        "actions": { "1": ["photo"], "2": ["waterSampling", "beacon"] }
    }"#;

    let input: MissionInput = serde_json::from_str(raw).unwrap();
    let session = MissionSession::from_input(input)
        .unwrap()
        .with_config(EngineConfig::default());

    assert_eq!(session.waypoints().len(), 3);
    assert!(session.actions().is_assigned(2, ActionKind::WaterSampling));

    let report = session.report(None).unwrap();
    assert!(report.night);
    assert!(report.feasible);
    assert_eq!(report.segments.len(), 3);
    assert!(report.segments[1].power_w < report.segments[0].power_w);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["drone"], "C");
    assert!(json.get("simulation").is_none());
    assert_eq!(json["timeline"][1]["item"]["type"], "action");
}

#[test]
fn test_rejected_edits_leave_session_untouched() {
    let mut session = reference_session();
    let before = session.waypoints().to_vec();

    assert!(session.delete_waypoint(0).is_err());
    assert!(session.edit_waypoint(7, WaypointEdit::default()).is_err());
    assert!(session.toggle_action(3, ActionKind::Hover).is_err());

    assert_eq!(session.waypoints(), before.as_slice());
    assert!(session.actions().is_empty());
}
