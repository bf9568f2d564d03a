use std::env;
use std::str::FromStr;

use schema::Speed;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

/// Settings for a simulated day of dispatching
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub hospitals_csv_path: String,
    pub orders_csv_path: String,
    /// Number of aircraft based at the nest
    pub num_aircraft: usize,
    /// Ground speed of every aircraft in meters per second
    pub aircraft_speed_mps: u64,
    /// Round-trip range of a fully charged aircraft in meters
    pub aircraft_range_m: u64,
    /// Seconds between dispatch ticks
    pub launch_interval_s: u64,
    pub speed: Speed,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hospitals_csv_path: schema::SAMPLE_HOSPITALS_CSV_PATH.to_string(),
            orders_csv_path: schema::SAMPLE_ORDERS_CSV_PATH.to_string(),
            num_aircraft: 10,
            aircraft_speed_mps: 30,
            aircraft_range_m: 160 * 1000,
            launch_interval_s: 60,
            // run demo in fast-forward
            speed: Speed::fast_forward(200),
        }
    }
}

impl Config {
    /// Reads the process environment; call `dotenv::dotenv()` first to pick up a `.env` file
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from `lookup`, falling back to the defaults for unset keys
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            hospitals_csv_path: lookup("HOSPITALS_CSV").unwrap_or(defaults.hospitals_csv_path),
            orders_csv_path: lookup("ORDERS_CSV").unwrap_or(defaults.orders_csv_path),
            num_aircraft: parse(&lookup, "NUM_AIRCRAFT", defaults.num_aircraft)?,
            aircraft_speed_mps: parse(&lookup, "AIRCRAFT_SPEED_MPS", defaults.aircraft_speed_mps)?,
            aircraft_range_m: parse(&lookup, "AIRCRAFT_RANGE_M", defaults.aircraft_range_m)?,
            launch_interval_s: parse(&lookup, "LAUNCH_INTERVAL_S", defaults.launch_interval_s)?,
            speed: match lookup("FAST_FORWARD") {
                Some(_) => Speed::fast_forward(parse(&lookup, "FAST_FORWARD", 0)?),
                None => defaults.speed,
            },
        };

        if config.aircraft_speed_mps == 0 {
            return Err(ConfigError::Zero {
                key: "AIRCRAFT_SPEED_MPS",
            });
        }
        if config.launch_interval_s == 0 {
            return Err(ConfigError::Zero {
                key: "LAUNCH_INTERVAL_S",
            });
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
