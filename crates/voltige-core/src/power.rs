//! Propulsion power model.
//!
//! Calibrated speed→power curves for the air and water modes, plus the
//! environmental multipliers applied on top of them.

use crate::models::{EnvironmentalConditions, TravelMode};

/// Air-mode calibration points: (speed km/h, power W).
const AIR_CURVE: [(f64, f64); 4] = [(50.0, 600.0), (70.0, 700.0), (100.0, 800.0), (160.0, 900.0)];

/// Water/submersible calibration points: (speed km/h, power W).
const WATER_CURVE: [(f64, f64); 3] = [(9.0, 112.0), (18.0, 225.0), (28.0, 382.0)];

/// Every 20 km/h of wind adds 8% draw.
const WIND_STEP_KMH: f64 = 20.0;
const WIND_STEP_PENALTY: f64 = 0.08;

/// Cold batteries deliver ~92% of their rated efficiency below this temperature.
const COLD_BATTERY_BELOW_C: f64 = 15.0;
const COLD_BATTERY_EFFICIENCY: f64 = 0.92;

/// Piecewise-linear lookup, clamped to the first/last calibration point.
fn interpolate(curve: &[(f64, f64)], speed_kmh: f64) -> f64 {
    let (first_speed, first_power) = curve[0];
    let (last_speed, last_power) = curve[curve.len() - 1];

    if speed_kmh <= first_speed {
        return first_power;
    }
    if speed_kmh >= last_speed {
        return last_power;
    }

    for pair in curve.windows(2) {
        let (s1, p1) = pair[0];
        let (s2, p2) = pair[1];
        if speed_kmh <= s2 {
            return p1 + (speed_kmh - s1) * (p2 - p1) / (s2 - s1);
        }
    }

    last_power
}

/// Propulsion power in air mode (W).
pub fn air_power(speed_kmh: f64) -> f64 {
    interpolate(&AIR_CURVE, speed_kmh)
}

/// Propulsion power in water mode (W).
pub fn water_power(speed_kmh: f64) -> f64 {
    interpolate(&WATER_CURVE, speed_kmh)
}

/// Base power for the given travel mode.
pub fn base_power(mode: TravelMode, speed_kmh: f64) -> f64 {
    match mode {
        TravelMode::Air => air_power(speed_kmh),
        TravelMode::Water => water_power(speed_kmh),
    }
}

/// Apply headwind penalty.
pub fn wind_adjust(power_w: f64, wind_kmh: f64) -> f64 {
    power_w * (1.0 + (wind_kmh / WIND_STEP_KMH) * WIND_STEP_PENALTY)
}

/// Apply cold-battery penalty.
pub fn temp_adjust(power_w: f64, temp_c: f64) -> f64 {
    if temp_c < COLD_BATTERY_BELOW_C {
        power_w / COLD_BATTERY_EFFICIENCY
    } else {
        power_w
    }
}

/// Apply every environmental adjustment: temperature first, then wind.
pub fn adjusted_power(base_w: f64, conditions: &EnvironmentalConditions) -> f64 {
    wind_adjust(temp_adjust(base_w, conditions.water_temp_c), conditions.wind_kmh)
}

/// Adjusted draw for travelling at `speed_kmh` in `mode` under `conditions`.
pub fn travel_power(mode: TravelMode, speed_kmh: f64, conditions: &EnvironmentalConditions) -> f64 {
    adjusted_power(base_power(mode, speed_kmh), conditions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_power_clamps_outside_calibration() {
        assert_eq!(air_power(0.0), 600.0);
        assert_eq!(air_power(20.0), 600.0);
        assert_eq!(air_power(50.0), 600.0);
        assert_eq!(air_power(160.0), 900.0);
        assert_eq!(air_power(250.0), 900.0);
    }

    #[test]
    fn water_power_clamps_outside_calibration() {
        assert_eq!(water_power(3.0), 112.0);
        assert_eq!(water_power(9.0), 112.0);
        assert_eq!(water_power(28.0), 382.0);
        assert_eq!(water_power(40.0), 382.0);
    }

    #[test]
    fn air_power_interpolates_between_points() {
        assert!((air_power(60.0) - 650.0).abs() < 1e-9);
        assert!((air_power(85.0) - 750.0).abs() < 1e-9);
        assert!((air_power(130.0) - 850.0).abs() < 1e-9);
        assert_eq!(air_power(70.0), 700.0);
        assert_eq!(air_power(100.0), 800.0);
    }

    #[test]
    fn water_power_hits_calibration_points() {
        assert_eq!(water_power(18.0), 225.0);
        assert!((water_power(23.0) - 303.5).abs() < 1e-9);
    }

    #[test]
    fn curves_are_monotonic() {
        let mut prev_air = air_power(40.0);
        let mut prev_water = water_power(5.0);
        let mut speed = 40.0;
        while speed <= 170.0 {
            let p = air_power(speed);
            assert!(p >= prev_air, "air power dropped at {speed}");
            prev_air = p;
            speed += 0.5;
        }
        let mut speed = 5.0;
        while speed <= 30.0 {
            let p = water_power(speed);
            assert!(p >= prev_water, "water power dropped at {speed}");
            prev_water = p;
            speed += 0.25;
        }
    }

    #[test]
    fn wind_adjust_identity_and_growth() {
        assert_eq!(wind_adjust(600.0, 0.0), 600.0);
        assert!((wind_adjust(600.0, 40.0) - 696.0).abs() < 1e-9);
        assert!(wind_adjust(600.0, 10.0) < wind_adjust(600.0, 11.0));
    }

    #[test]
    fn temp_adjust_only_penalizes_cold() {
        assert_eq!(temp_adjust(600.0, 15.0), 600.0);
        assert_eq!(temp_adjust(600.0, 30.0), 600.0);
        assert!(temp_adjust(600.0, 14.9) > 600.0);
        assert!((temp_adjust(920.0, 4.0) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn adjustment_order_does_not_change_value() {
        let a = wind_adjust(temp_adjust(700.0, 8.0), 35.0);
        let b = temp_adjust(wind_adjust(700.0, 35.0), 8.0);
        assert!((a - b).abs() < 1e-9);
    }
}
