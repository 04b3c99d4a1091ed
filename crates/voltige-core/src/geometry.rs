//! Great-circle math for route legs and the telemetry position proxy.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Calculate distance between two points in kilometers using the haversine formula.
///
/// Inputs are not range checked; out-of-range coordinates propagate NaN.
///
/// # Arguments
/// * `a`, `b` - Point coordinates in decimal degrees
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Calculate bearing from `a` to `b` in radians (0 = north, π/2 = east).
pub fn bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_lambda = (b.lon - a.lon).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Offset a position by a distance in kilometers along a bearing in radians.
pub fn offset_by_bearing(origin: GeoPoint, distance_km: f64, bearing_rad: f64) -> GeoPoint {
    if distance_km.abs() <= f64::EPSILON {
        return origin;
    }

    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let angular_distance = distance_km / EARTH_RADIUS_KM;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let lon2 = (lon1 + y.atan2(x) + PI).rem_euclid(2.0 * PI) - PI;

    GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Position reached after covering `progress_km` of the great-circle leg `from -> to`.
///
/// Progress is clamped to the leg, so overshoot reports the leg end.
pub fn along_leg(from: GeoPoint, to: GeoPoint, progress_km: f64) -> GeoPoint {
    let leg_km = distance_km(from, to);
    if leg_km <= f64::EPSILON || progress_km <= 0.0 {
        return from;
    }
    if progress_km >= leg_km {
        return to;
    }
    offset_by_bearing(from, progress_km, bearing(from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((dist - 111.195).abs() < 0.1);
    }

    #[test]
    fn test_haversine_same_point() {
        let p = GeoPoint::new(47.32, 5.04);
        assert_eq!(distance_km(p, p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(47.32, 5.04);
        let b = GeoPoint::new(47.401, 5.173);
        assert_eq!(distance_km(a, b), distance_km(b, a));
    }

    #[test]
    fn home_to_first_waypoint_is_about_one_point_one_km() {
        let dist = distance_km(GeoPoint::new(47.32, 5.04), GeoPoint::new(47.33, 5.04));
        assert!((dist - 1.112).abs() < 0.005, "got {dist}");
    }

    #[test]
    fn along_leg_halfway_is_equidistant() {
        let a = GeoPoint::new(47.32, 5.04);
        let b = GeoPoint::new(47.36, 5.10);
        let leg = distance_km(a, b);
        let mid = along_leg(a, b, leg / 2.0);
        let d1 = distance_km(a, mid);
        let d2 = distance_km(mid, b);
        assert!((d1 - d2).abs() < 1e-3, "d1={d1} d2={d2}");
    }

    #[test]
    fn along_leg_clamps_to_endpoints() {
        let a = GeoPoint::new(47.32, 5.04);
        let b = GeoPoint::new(47.33, 5.04);
        assert_eq!(along_leg(a, b, -1.0), a);
        assert_eq!(along_leg(a, b, 10.0), b);
    }
}
