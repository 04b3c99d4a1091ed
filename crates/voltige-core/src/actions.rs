//! Per-waypoint action schedule.

use serde::{Deserialize, Serialize};

use crate::battery::energy_wh;
use crate::models::{ActionAssignment, ActionKind};

/// One scheduled action with its draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub waypoint: usize,
    pub action: ActionKind,
    pub power_w: f64,
    pub duration_s: u32,
    pub energy_wh: f64,
}

impl ScheduledAction {
    pub fn new(waypoint: usize, action: ActionKind) -> Self {
        let spec = action.spec();
        Self {
            waypoint,
            action,
            power_w: spec.power_w,
            duration_s: spec.duration_s,
            energy_wh: action_energy_wh(action),
        }
    }

    pub fn duration_min(&self) -> f64 {
        f64::from(self.duration_s) / 60.0
    }
}

/// Energy of a single action run (Wh).
pub fn action_energy_wh(action: ActionKind) -> f64 {
    let spec = action.spec();
    energy_wh(spec.power_w, f64::from(spec.duration_s) / 60.0)
}

/// Actions at `waypoint`, executed sequentially in catalog order.
pub fn actions_for(assignment: &ActionAssignment, waypoint: usize) -> Vec<ScheduledAction> {
    assignment
        .actions_at(waypoint)
        .map(|action| ScheduledAction::new(waypoint, action))
        .collect()
}

/// Total action energy at `waypoint` (Wh).
pub fn waypoint_action_energy_wh(assignment: &ActionAssignment, waypoint: usize) -> f64 {
    assignment.actions_at(waypoint).map(action_energy_wh).sum()
}

/// Total time spent on actions at `waypoint` (seconds).
pub fn waypoint_action_seconds(assignment: &ActionAssignment, waypoint: usize) -> u32 {
    assignment
        .actions_at(waypoint)
        .map(|action| action.spec().duration_s)
        .sum()
}
