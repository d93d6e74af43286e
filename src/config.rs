//! Check configuration and argument validation

use std::time::Duration;

use thiserror::Error;

use crate::metrics::Counter;

/// Default configuration values
pub const DEFAULT_URI: &str = "/ocs/v2.php/apps/serverinfo/api/v1/info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Warning must be smaller than Critical")]
    InvalidThresholds,
    #[error("Unknown Counter {0:?} (expected one of {names})", names = Counter::NAMES.join(", "))]
    UnknownCounter(String),
}

/// Inputs for a single check run
#[derive(Debug, Clone)]
pub struct Config {
    pub hostname: String,
    pub uri: String,
    pub username: String,
    pub password: String,
    /// Counter name as given on the command line
    pub counter: String,
    pub warning: i64,
    pub critical: i64,
    pub timeout: Option<Duration>,
    pub debug: bool,
    pub perfdata: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hostname: String::new(),
            uri: DEFAULT_URI.to_string(),
            username: String::new(),
            password: String::new(),
            counter: String::new(),
            warning: 0,
            critical: 0,
            timeout: None,
            debug: false,
            perfdata: false,
        }
    }
}

impl Config {
    /// Check thresholds and counter name before anything touches the network.
    ///
    /// Thresholds are checked first, so a config that is wrong on both counts
    /// reports the threshold problem.
    pub fn validate(&self) -> Result<Counter, ConfigError> {
        if self.warning >= self.critical {
            return Err(ConfigError::InvalidThresholds);
        }
        self.counter
            .parse::<Counter>()
            .map_err(|_| ConfigError::UnknownCounter(self.counter.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(counter: &str, warning: i64, critical: i64) -> Config {
        Config {
            counter: counter.to_string(),
            warning,
            critical,
            ..Config::default()
        }
    }

    #[test]
    fn test_default_uri() {
        assert_eq!(Config::default().uri, "/ocs/v2.php/apps/serverinfo/api/v1/info");
    }

    #[test]
    fn test_validate_accepts_known_counter() {
        let counter = config("share-count", 10, 20).validate().unwrap();
        assert_eq!(counter, Counter::ShareCount);
    }

    #[test]
    fn test_validate_rejects_unordered_thresholds() {
        for (warning, critical) in [(20, 10), (10, 10), (0, 0), (-1, -5)] {
            assert_eq!(
                config("free-space", warning, critical).validate(),
                Err(ConfigError::InvalidThresholds)
            );
        }
    }

    #[test]
    fn test_validate_rejects_unknown_counter() {
        let err = config("load-average", 1, 2).validate().unwrap_err();
        assert_eq!(err, ConfigError::UnknownCounter("load-average".to_string()));
        assert!(err.to_string().contains("load-average"));
        assert!(err.to_string().contains("active-users-5min"));
    }

    #[test]
    fn test_thresholds_checked_before_counter() {
        assert_eq!(
            config("bogus", 5, 5).validate(),
            Err(ConfigError::InvalidThresholds)
        );
    }
}
