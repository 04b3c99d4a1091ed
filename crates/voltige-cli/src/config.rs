//! Runner configuration from environment.

use std::env;

use voltige_core::EngineConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Wall-clock milliseconds between simulation steps; 0 replays without pacing
    pub tick_ms: u64,
    /// Log a dashboard snapshot every N simulated seconds
    pub snapshot_every: u32,
    pub max_simulated_seconds: u32,
    pub critical_battery_percent: f64,
    pub usable_fraction: f64,
}

impl Default for Config {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            tick_ms: 50,
            snapshot_every: 30,
            max_simulated_seconds: engine.max_simulated_seconds,
            critical_battery_percent: engine.critical_battery_percent,
            usable_fraction: engine.battery.usable_fraction,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            tick_ms: lookup("VOLTIGE_TICK_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.tick_ms),
            snapshot_every: lookup("VOLTIGE_SNAPSHOT_EVERY")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.snapshot_every),
            max_simulated_seconds: lookup("VOLTIGE_MAX_SIM_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_simulated_seconds),
            critical_battery_percent: lookup("VOLTIGE_CRITICAL_BATTERY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.critical_battery_percent),
            usable_fraction: lookup("VOLTIGE_USABLE_FRACTION")
                .and_then(|s| s.parse::<f64>().ok())
                .map(|f| f.clamp(0.0, 1.0))
                .unwrap_or(defaults.usable_fraction),
        }
    }

    /// Engine configuration with this runner's overrides applied.
    pub fn engine_config(&self) -> EngineConfig {
        let mut engine = EngineConfig::default();
        engine.max_simulated_seconds = self.max_simulated_seconds;
        engine.critical_battery_percent = self.critical_battery_percent;
        engine.battery.usable_fraction = self.usable_fraction;
        engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.snapshot_every, 30);
        assert_eq!(config.max_simulated_seconds, 3600);
        assert_eq!(config.critical_battery_percent, 5.0);
        assert_eq!(config.usable_fraction, 1.0);
    }

    #[test]
    fn overrides_flow_into_engine_config() {
        let config = Config::from_lookup(lookup(&[
            ("VOLTIGE_TICK_MS", "0"),
            ("VOLTIGE_MAX_SIM_SECONDS", "900"),
            ("VOLTIGE_CRITICAL_BATTERY", "10"),
            ("VOLTIGE_USABLE_FRACTION", "0.8"),
        ]));
        assert_eq!(config.tick_ms, 0);

        let engine = config.engine_config();
        assert_eq!(engine.max_simulated_seconds, 900);
        assert_eq!(engine.critical_battery_percent, 10.0);
        assert!((engine.battery.usable_wh() - 276.48).abs() < 1e-9);
    }

    #[test]
    fn bad_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("VOLTIGE_TICK_MS", "fast"),
            ("VOLTIGE_SNAPSHOT_EVERY", "0"),
            ("VOLTIGE_USABLE_FRACTION", "1.7"),
        ]));
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.snapshot_every, 30);
        assert_eq!(config.usable_fraction, 1.0);
    }
}
