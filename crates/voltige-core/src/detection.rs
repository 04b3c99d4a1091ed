//! Victim-detection and drift estimates derived from the environment.

use crate::models::{EnvironmentalConditions, TimeOfDay, Weather};

/// Probability (0..=100 %) that the payload spots a target under these conditions.
pub fn detection_probability(visibility_m: f64, weather: Weather, has_thermal: bool) -> f64 {
    let mut prob: f64 = 0.5;

    if visibility_m > 500.0 {
        prob += 0.3;
    } else if visibility_m > 200.0 {
        prob += 0.15;
    } else if visibility_m > 100.0 {
        prob += 0.05;
    }

    prob += match weather {
        Weather::Clear => 0.25,
        Weather::Cloudy => 0.1,
        Weather::LightRain => -0.15,
        Weather::HeavyRain => -0.3,
    };

    if has_thermal {
        prob += 0.2;
    }

    prob.clamp(0.0, 1.0) * 100.0
}

/// Night hours run from 20:00 to 05:59.
pub fn is_night(time: TimeOfDay) -> bool {
    let hour = time.hour();
    hour >= 20 || hour < 6
}

/// Lateral drift (m) a surface current induces over the mission distance.
pub fn drift_m(current_kmh: f64, distance_km: f64) -> f64 {
    current_kmh * distance_km * 1000.0 / 100.0
}

/// Detection probability for a session's conditions.
pub fn conditions_detection(conditions: &EnvironmentalConditions, has_thermal: bool) -> f64 {
    detection_probability(conditions.visibility_m, conditions.weather, has_thermal)
}
