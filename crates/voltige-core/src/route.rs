//! Route planning: per-leg distance, time and energy, plus the return-to-home leg.

use serde::{Deserialize, Serialize};

use crate::battery::{battery_percent, energy_wh, travel_minutes};
use crate::config::EngineConfig;
use crate::geometry::distance_km;
use crate::models::{EnvironmentalConditions, TravelMode, Waypoint};
use crate::power::travel_power;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Transit,
    ReturnHome,
}

/// One planned leg of the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: usize,
    pub to: usize,
    pub kind: SegmentKind,
    pub distance_km: f64,
    pub duration_min: f64,
    pub speed_kmh: f64,
    pub altitude_m: f64,
    pub mode: TravelMode,
    pub power_w: f64,
    pub energy_wh: f64,
    /// Share of usable capacity this leg consumes
    pub battery_percent: f64,
    /// Remaining battery after the leg, counting legs only
    pub battery_percent_after: f64,
}

/// Segments for an ordered waypoint list with aggregate totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub segments: Vec<Segment>,
    pub total_distance_km: f64,
    pub total_duration_min: f64,
    pub total_energy_wh: f64,
    pub battery_used_percent: f64,
    /// Flight time fits the autonomy and the pack covers every leg
    pub feasible: bool,
}

struct Leg<'a> {
    from: &'a Waypoint,
    to: &'a Waypoint,
    kind: SegmentKind,
    speed_kmh: f64,
    altitude_m: f64,
    mode: TravelMode,
}

/// Plan every leg of the route, appending the return-to-home leg.
///
/// Expects `waypoints[0]` to be home. Infeasibility is reported through
/// [`RoutePlan::feasible`], never as an error.
pub fn plan_route(
    waypoints: &[Waypoint],
    conditions: &EnvironmentalConditions,
    autonomy_min: f64,
    config: &EngineConfig,
) -> RoutePlan {
    let mut legs: Vec<Leg<'_>> = waypoints
        .windows(2)
        .map(|pair| Leg {
            from: &pair[0],
            to: &pair[1],
            kind: SegmentKind::Transit,
            speed_kmh: pair[1].speed_kmh,
            altitude_m: pair[1].altitude_m,
            mode: pair[1].mode,
        })
        .collect();

    if let (Some(home), Some(last)) = (waypoints.first(), waypoints.last()) {
        legs.push(Leg {
            from: last,
            to: home,
            kind: SegmentKind::ReturnHome,
            speed_kmh: config.return_speed_kmh,
            altitude_m: last.altitude_m,
            mode: TravelMode::Air,
        });
    }

    let mut remaining = 100.0;
    let segments: Vec<Segment> = legs
        .into_iter()
        .map(|leg| {
            let segment = plan_leg(&leg, conditions, config, remaining);
            remaining = segment.battery_percent_after;
            segment
        })
        .collect();

    let total_distance_km = segments.iter().map(|s| s.distance_km).sum();
    let total_duration_min: f64 = segments.iter().map(|s| s.duration_min).sum();
    let total_energy_wh = segments.iter().map(|s| s.energy_wh).sum();
    let battery_used_percent: f64 = segments.iter().map(|s| s.battery_percent).sum();

    RoutePlan {
        segments,
        total_distance_km,
        total_duration_min,
        total_energy_wh,
        battery_used_percent,
        feasible: total_duration_min <= autonomy_min && battery_used_percent <= 100.0,
    }
}

fn plan_leg(
    leg: &Leg<'_>,
    conditions: &EnvironmentalConditions,
    config: &EngineConfig,
    battery_before: f64,
) -> Segment {
    let distance_km = distance_km(leg.from.position(), leg.to.position());
    let duration_min = travel_minutes(distance_km, leg.speed_kmh);
    let power_w = travel_power(leg.mode, leg.speed_kmh, conditions);
    let energy_wh = energy_wh(power_w, duration_min);
    let battery_percent = battery_percent(&config.battery, energy_wh);

    Segment {
        from: leg.from.index,
        to: leg.to.index,
        kind: leg.kind,
        distance_km,
        duration_min,
        speed_kmh: leg.speed_kmh,
        altitude_m: leg.altitude_m,
        mode: leg.mode,
        power_w,
        energy_wh,
        battery_percent,
        battery_percent_after: battery_before - battery_percent,
    }
}
