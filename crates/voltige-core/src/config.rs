//! Engine constants and thresholds.

use serde::{Deserialize, Serialize};

/// Battery pack description.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BatteryPack {
    /// Nameplate capacity in watt-hours
    pub nominal_capacity_wh: f64,
    /// Fraction of nominal capacity the mission may draw (0..=1)
    pub usable_fraction: f64,
}

impl BatteryPack {
    /// Energy available to the mission, in watt-hours.
    pub fn usable_wh(&self) -> f64 {
        self.nominal_capacity_wh * self.usable_fraction
    }
}

impl Default for BatteryPack {
    fn default() -> Self {
        Self {
            nominal_capacity_wh: 345.6,
            usable_fraction: 1.0,
        }
    }
}

/// Environmental thresholds that raise report risk flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Wind above this is flagged (km/h)
    pub max_wind_kmh: f64,
    /// Visibility below this is flagged (m)
    pub min_visibility_m: f64,
    /// Waves above this are flagged (m)
    pub max_wave_height_m: f64,
    /// Water temperature below this is flagged (°C)
    pub min_water_temp_c: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            max_wind_kmh: 20.0,
            min_visibility_m: 50.0,
            max_wave_height_m: 2.5,
            min_water_temp_c: 5.0,
        }
    }
}

/// Configuration shared by the planner, the simulation loop and the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub battery: BatteryPack,
    /// Speed of the synthesized return-to-home leg (km/h)
    pub return_speed_kmh: f64,
    /// Simulation aborts once battery percent drops below this
    pub critical_battery_percent: f64,
    /// Hard ceiling on simulated time (seconds)
    pub max_simulated_seconds: u32,
    /// Remaining battery at or below this marks the margin as tight (%)
    pub tight_battery_margin_percent: f64,
    /// Autonomy slack below this marks the margin as tight (minutes)
    pub tight_autonomy_margin_min: f64,
    pub risk: RiskThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            battery: BatteryPack::default(),
            return_speed_kmh: 50.0,
            critical_battery_percent: 5.0,
            max_simulated_seconds: 3600,
            tight_battery_margin_percent: 30.0,
            tight_autonomy_margin_min: 5.0,
            risk: RiskThresholds::default(),
        }
    }
}
