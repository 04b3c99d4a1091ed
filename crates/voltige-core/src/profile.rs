//! Mission profile: legs and actions merged into one timeline with running battery.

use serde::{Deserialize, Serialize};

use crate::actions::{actions_for, ScheduledAction};
use crate::battery::battery_percent;
use crate::config::EngineConfig;
use crate::models::{ActionAssignment, DroneModel, EnvironmentalConditions, Waypoint};
use crate::route::{plan_route, Segment, SegmentKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineItem {
    Transit(Segment),
    Action(ScheduledAction),
    ReturnHome(Segment),
}

/// A timeline step and the battery left once it is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub item: TimelineItem,
    pub duration_min: f64,
    pub energy_wh: f64,
    pub battery_percent: f64,
    pub battery_after_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionProfile {
    pub segments: Vec<Segment>,
    pub timeline: Vec<TimelineEntry>,
    pub total_distance_km: f64,
    pub total_time_min: f64,
    pub total_energy_wh: f64,
    pub battery_used_percent: f64,
    pub battery_remaining_percent: f64,
    pub autonomy_min: f64,
    pub feasible: bool,
}

impl MissionProfile {
    /// Minutes left on the airframe's autonomy after the mission.
    pub fn autonomy_margin_min(&self) -> f64 {
        self.autonomy_min - self.total_time_min
    }
}

/// Build the profile for a validated waypoint list.
pub fn build_profile(
    waypoints: &[Waypoint],
    assignment: &ActionAssignment,
    conditions: &EnvironmentalConditions,
    drone: DroneModel,
    config: &EngineConfig,
) -> MissionProfile {
    let autonomy_min = drone.spec().nominal_autonomy_min;
    let route = plan_route(waypoints, conditions, autonomy_min, config);

    let mut items = Vec::with_capacity(route.segments.len());
    for segment in &route.segments {
        match segment.kind {
            SegmentKind::Transit => {
                items.push(TimelineItem::Transit(segment.clone()));
                items.extend(
                    actions_for(assignment, segment.to)
                        .into_iter()
                        .map(TimelineItem::Action),
                );
            }
            SegmentKind::ReturnHome => items.push(TimelineItem::ReturnHome(segment.clone())),
        }
    }

    let mut running = 100.0;
    let timeline: Vec<TimelineEntry> = items
        .into_iter()
        .map(|item| {
            let (duration_min, energy_wh) = match &item {
                TimelineItem::Transit(s) | TimelineItem::ReturnHome(s) => (s.duration_min, s.energy_wh),
                TimelineItem::Action(a) => (a.duration_min(), a.energy_wh),
            };
            let percent = battery_percent(&config.battery, energy_wh);
            running -= percent;
            TimelineEntry {
                item,
                duration_min,
                energy_wh,
                battery_percent: percent,
                battery_after_percent: running,
            }
        })
        .collect();

    let total_time_min = timeline.iter().map(|e| e.duration_min).sum();
    let total_energy_wh = timeline.iter().map(|e| e.energy_wh).sum();
    let battery_used_percent = battery_percent(&config.battery, total_energy_wh);
    let battery_remaining_percent = 100.0 - battery_used_percent;

    MissionProfile {
        total_distance_km: route.total_distance_km,
        segments: route.segments,
        timeline,
        total_time_min,
        total_energy_wh,
        battery_used_percent,
        battery_remaining_percent,
        autonomy_min,
        feasible: total_time_min <= autonomy_min && battery_remaining_percent >= 0.0,
    }
}
