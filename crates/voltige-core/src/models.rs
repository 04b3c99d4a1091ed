//! Core data models for mission planning.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::MissionError;
use crate::geometry::GeoPoint;

/// Role of a waypoint in the mission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointRole {
    /// Launch and recovery point, always index 0
    Home,
    #[default]
    Transit,
}

/// How the drone travels on the leg into a waypoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Air,
    /// Surface/submersible travel
    Water,
}

/// An ordered position in the mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub index: usize,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
    pub speed_kmh: f64,
    #[serde(default)]
    pub role: WaypointRole,
    #[serde(default)]
    pub mode: TravelMode,
}

impl Waypoint {
    /// Home waypoint: index 0, speed and altitude pinned to zero.
    pub fn home(lat: f64, lon: f64) -> Self {
        Self {
            index: 0,
            lat,
            lon,
            altitude_m: 0.0,
            speed_kmh: 0.0,
            role: WaypointRole::Home,
            mode: TravelMode::Air,
        }
    }

    pub fn transit(index: usize, lat: f64, lon: f64, altitude_m: f64, speed_kmh: f64) -> Self {
        Self {
            index,
            lat,
            lon,
            altitude_m,
            speed_kmh,
            role: WaypointRole::Transit,
            mode: TravelMode::Air,
        }
    }

    pub fn with_mode(mut self, mode: TravelMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    pub fn is_home(&self) -> bool {
        self.role == WaypointRole::Home
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Weather {
    Clear,
    #[default]
    Cloudy,
    LightRain,
    HeavyRain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterType {
    Fresh,
    #[default]
    Coastal,
    Ocean,
}

/// Local time of day, serialized as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }
}

impl Default for TimeOfDay {
    fn default() -> Self {
        Self(NaiveTime::from_hms_opt(14, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl FromStr for TimeOfDay {
    type Err = MissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| MissionError::InvalidTimeOfDay(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = MissionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.0.format("%H:%M").to_string()
    }
}

/// Weather and water state for the planning session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentalConditions {
    pub wind_kmh: f64,
    pub visibility_m: f64,
    pub wave_height_m: f64,
    pub water_temp_c: f64,
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
    pub water_type: WaterType,
    pub current_kmh: f64,
}

impl Default for EnvironmentalConditions {
    fn default() -> Self {
        Self {
            wind_kmh: 5.0,
            visibility_m: 200.0,
            wave_height_m: 1.0,
            water_temp_c: 12.0,
            weather: Weather::Cloudy,
            time_of_day: TimeOfDay::default(),
            water_type: WaterType::Coastal,
            current_kmh: 0.5,
        }
    }
}

impl EnvironmentalConditions {
    /// Still air at 20 °C; no adjustment applies to power.
    pub fn calm() -> Self {
        Self {
            wind_kmh: 0.0,
            water_temp_c: 20.0,
            ..Self::default()
        }
    }
}

/// Airframe variants offered by the builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DroneModel {
    A,
    #[default]
    B,
    C,
}

/// Immutable airframe characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DroneSpec {
    pub name: &'static str,
    pub base_weight_kg: f64,
    /// Maximum take-off mass including payload
    pub max_payload_weight_kg: f64,
    pub nominal_autonomy_min: f64,
    pub water_autonomy_min: f64,
    pub base_power_w: f64,
}

const DRONE_A: DroneSpec = DroneSpec {
    name: "CONFIG A (light)",
    base_weight_kg: 2.05,
    max_payload_weight_kg: 2.05,
    nominal_autonomy_min: 28.0,
    water_autonomy_min: 45.0,
    base_power_w: 600.0,
};

const DRONE_B: DroneSpec = DroneSpec {
    name: "CONFIG B (standard)",
    base_weight_kg: 2.1,
    max_payload_weight_kg: 3.0,
    nominal_autonomy_min: 35.0,
    water_autonomy_min: 55.0,
    base_power_w: 650.0,
};

const DRONE_C: DroneSpec = DroneSpec {
    name: "CONFIG C (heavy)",
    base_weight_kg: 2.6,
    max_payload_weight_kg: 4.5,
    nominal_autonomy_min: 45.0,
    water_autonomy_min: 75.0,
    base_power_w: 700.0,
};

impl DroneModel {
    pub const ALL: [DroneModel; 3] = [DroneModel::A, DroneModel::B, DroneModel::C];

    pub fn spec(self) -> &'static DroneSpec {
        match self {
            DroneModel::A => &DRONE_A,
            DroneModel::B => &DRONE_B,
            DroneModel::C => &DRONE_C,
        }
    }
}

/// Optional payload items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Payload {
    /// Locator beacon with water ballast
    Beacon,
    /// 4K camera
    Camera,
    /// Six-parameter water sensor pack
    Sensors,
    /// 320x256 infrared camera
    Thermal,
    /// Extra 2000 lm spotlight
    LedExtra,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayloadSpec {
    pub weight_kg: f64,
    pub power_w: f64,
}

impl Payload {
    pub const ALL: [Payload; 5] = [
        Payload::Beacon,
        Payload::Camera,
        Payload::Sensors,
        Payload::Thermal,
        Payload::LedExtra,
    ];

    pub fn spec(self) -> PayloadSpec {
        let (weight_kg, power_w) = match self {
            Payload::Beacon => (0.2, 0.0),
            Payload::Camera => (0.15, 80.0),
            Payload::Sensors => (0.1, 0.0),
            Payload::Thermal => (0.2, 0.0),
            Payload::LedExtra => (0.05, 40.0),
        };
        PayloadSpec { weight_kg, power_w }
    }
}

/// Selected payload items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadSelection(BTreeSet<Payload>);

impl PayloadSelection {
    pub fn new(items: impl IntoIterator<Item = Payload>) -> Self {
        Self(items.into_iter().collect())
    }

    /// Flip one payload on or off. Returns whether it is now selected.
    pub fn toggle(&mut self, payload: Payload) -> bool {
        if !self.0.remove(&payload) {
            self.0.insert(payload);
            return true;
        }
        false
    }

    pub fn contains(&self, payload: Payload) -> bool {
        self.0.contains(&payload)
    }

    pub fn iter(&self) -> impl Iterator<Item = Payload> + '_ {
        self.0.iter().copied()
    }

    pub fn weight_kg(&self) -> f64 {
        self.iter().map(|p| p.spec().weight_kg).sum()
    }

    /// Airframe plus payload mass.
    pub fn total_mass_kg(&self, drone: DroneModel) -> f64 {
        drone.spec().base_weight_kg + self.weight_kg()
    }

    /// Take-off mass stays within the airframe limit.
    pub fn is_within_limit(&self, drone: DroneModel) -> bool {
        self.total_mass_kg(drone) <= drone.spec().max_payload_weight_kg + 1e-9
    }

    /// Rough endurance after payload: two minutes lost per kilogram carried.
    pub fn mission_autonomy_min(&self, drone: DroneModel) -> f64 {
        (drone.spec().nominal_autonomy_min - self.weight_kg() * 2.0)
            .round()
            .max(0.0)
    }
}

/// Scripted payload operations available at a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Hover,
    Photo,
    Video,
    WaterSampling,
    Beacon,
    ThermalScan,
    LedSpotlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActionSpec {
    pub label: &'static str,
    pub power_w: f64,
    pub duration_s: u32,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::Hover,
        ActionKind::Photo,
        ActionKind::Video,
        ActionKind::WaterSampling,
        ActionKind::Beacon,
        ActionKind::ThermalScan,
        ActionKind::LedSpotlight,
    ];

    pub fn spec(self) -> ActionSpec {
        let (label, power_w, duration_s) = match self {
            ActionKind::Hover => ("Hover", 585.0, 30),
            ActionKind::Photo => ("Photo 4K", 80.0, 1),
            ActionKind::Video => ("Video 15s", 90.0, 15),
            ActionKind::WaterSampling => ("Water sampling", 15.0, 20),
            ActionKind::Beacon => ("Beacon 2min", 50.0, 120),
            ActionKind::ThermalScan => ("Thermal scan", 80.0, 30),
            ActionKind::LedSpotlight => ("LED 5min", 40.0, 300),
        };
        ActionSpec {
            label,
            power_w,
            duration_s,
        }
    }
}

/// Waypoint index → actions scheduled there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionAssignment(BTreeMap<usize, BTreeSet<ActionKind>>);

impl ActionAssignment {
    /// Flip one action at a waypoint. Returns whether it is now assigned.
    pub fn toggle(&mut self, waypoint: usize, action: ActionKind) -> bool {
        let set = self.0.entry(waypoint).or_default();
        let assigned = if set.remove(&action) {
            false
        } else {
            set.insert(action);
            true
        };
        if set.is_empty() {
            self.0.remove(&waypoint);
        }
        assigned
    }

    pub fn assign(&mut self, waypoint: usize, action: ActionKind) {
        self.0.entry(waypoint).or_default().insert(action);
    }

    /// Actions at a waypoint in catalog order.
    pub fn actions_at(&self, waypoint: usize) -> impl Iterator<Item = ActionKind> + '_ {
        self.0.get(&waypoint).into_iter().flatten().copied()
    }

    pub fn is_assigned(&self, waypoint: usize, action: ActionKind) -> bool {
        self.0.get(&waypoint).is_some_and(|set| set.contains(&action))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop a deleted waypoint's actions and shift later waypoints down by one.
    pub fn remove_waypoint(&mut self, waypoint: usize) {
        let shifted = std::mem::take(&mut self.0)
            .into_iter()
            .filter(|(index, _)| *index != waypoint)
            .map(|(index, set)| if index > waypoint { (index - 1, set) } else { (index, set) })
            .collect();
        self.0 = shifted;
    }

    pub fn waypoints(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }
}
