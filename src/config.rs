use std::time::Duration;

use crate::error::SimulationError;
use crate::pipeline::interpolate::MotionConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub osrm_base_url: String,
    pub bus_speed_mps: f64,
    pub step_interval_ms: u64,
    /// How long the page keeps its loading overlay up before revealing the map.
    pub loader_delay_ms: u64,
    pub trip_ttl: Duration,
    pub route_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            osrm_base_url: "https://router.project-osrm.org".to_string(),
            bus_speed_mps: 10.0,
            step_interval_ms: 50,
            loader_delay_ms: 4000,
            trip_ttl: Duration::from_secs(3600),
            route_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env_parse("PORT").unwrap_or(defaults.port);
        let osrm_base_url = std::env::var("OSRM_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.osrm_base_url);
        let bus_speed_mps = env_parse("BUS_SPEED_MPS").unwrap_or(defaults.bus_speed_mps);
        let step_interval_ms = env_parse("STEP_INTERVAL_MS").unwrap_or(defaults.step_interval_ms);
        let loader_delay_ms = env_parse("LOADER_DELAY_MS").unwrap_or(defaults.loader_delay_ms);
        let trip_ttl_seconds = env_parse("TRIP_TTL_SECONDS").unwrap_or(defaults.trip_ttl.as_secs());
        let route_timeout_seconds =
            env_parse("ROUTE_TIMEOUT_SECONDS").unwrap_or(defaults.route_timeout.as_secs());

        Self {
            port,
            osrm_base_url,
            bus_speed_mps,
            step_interval_ms,
            loader_delay_ms,
            trip_ttl: Duration::from_secs(trip_ttl_seconds),
            route_timeout: Duration::from_secs(route_timeout_seconds),
        }
    }

    pub fn motion(&self) -> Result<MotionConfig, SimulationError> {
        MotionConfig::new(self.bus_speed_mps, self.step_interval_ms)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
