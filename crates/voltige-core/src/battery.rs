//! Energy and state-of-charge accounting.

use crate::config::BatteryPack;

/// Energy drawn by `power_w` sustained for `duration_min` minutes (Wh).
pub fn energy_wh(power_w: f64, duration_min: f64) -> f64 {
    power_w * duration_min / 60.0
}

/// Energy expressed as a percentage of the pack's usable capacity.
///
/// Not clamped: values above 100 mean the pack cannot supply the energy.
pub fn battery_percent(pack: &BatteryPack, energy_wh: f64) -> f64 {
    let usable = pack.usable_wh();
    if usable <= 0.0 {
        return f64::INFINITY;
    }
    energy_wh / usable * 100.0
}

/// Travel time in minutes for `distance_km` at `speed_kmh`; zero when not moving.
pub fn travel_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    if speed_kmh <= 0.0 || distance_km <= 0.0 {
        return 0.0;
    }
    distance_km / (speed_kmh / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_for_one_hour_equals_power() {
        assert_eq!(energy_wh(600.0, 60.0), 600.0);
        assert_eq!(energy_wh(585.0, 0.0), 0.0);
    }

    #[test]
    fn percent_against_nominal_pack() {
        let pack = BatteryPack::default();
        assert!((battery_percent(&pack, 34.56) - 10.0).abs() < 1e-9);
        assert!(battery_percent(&pack, 400.0) > 100.0);
    }

    #[test]
    fn zero_speed_gives_zero_time() {
        assert_eq!(travel_minutes(3.0, 0.0), 0.0);
        assert_eq!(travel_minutes(0.0, 50.0), 0.0);
        assert!((travel_minutes(1.0, 60.0) - 1.0).abs() < 1e-12);
    }
}
