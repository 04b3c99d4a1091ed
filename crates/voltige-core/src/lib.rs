pub mod actions;
pub mod battery;
pub mod clock;
pub mod config;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod models;
pub mod power;
pub mod profile;
pub mod report;
pub mod route;
pub mod session;
pub mod simulation;

pub use actions::{action_energy_wh, actions_for, ScheduledAction};
pub use battery::{battery_percent, energy_wh, travel_minutes};
pub use clock::{drive, drive_observed, Immediate, StepClock};
pub use config::{BatteryPack, EngineConfig, RiskThresholds};
pub use error::MissionError;
pub use geometry::{distance_km, GeoPoint};
pub use models::{
    ActionAssignment, ActionKind, DroneModel, EnvironmentalConditions, Payload, PayloadSelection,
    TimeOfDay, TravelMode, WaterType, Waypoint, WaypointRole, Weather,
};
pub use power::{adjusted_power, base_power, travel_power};
pub use profile::{build_profile, MissionProfile, TimelineEntry, TimelineItem};
pub use report::{build_report, MissionReport, MissionStatus, RiskFlag, WaypointActions};
pub use route::{plan_route, RoutePlan, Segment, SegmentKind};
pub use session::{MissionInput, MissionSession, WaypointEdit};
pub use simulation::{
    AbortReason, CancelToken, Dashboard, Event, EventKind, Phase, SimOutcome, StepOutcome,
    TelemetryEngine, TelemetryState,
};
