//! Scheduler and service configuration.
//!
//! Defaults reproduce the reference school week: six days, four named
//! periods, and level 3 as the only specialized level. A JSON file named by
//! `TIMETABLE_CONFIG` can override any field; `TIMETABLE_BIND` and
//! `TIMETABLE_TIME_LIMIT_SECS` override the most common knobs.

use crate::error::{ConfigurationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "TIMETABLE_CONFIG";
pub const BIND_ENV: &str = "TIMETABLE_BIND";
pub const TIME_LIMIT_ENV: &str = "TIMETABLE_TIME_LIMIT_SECS";

/// What to report when the solver stops at its time limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Report the best feasible timetable found before the limit.
    #[default]
    BestEffort,
    /// Only accept proven-optimal timetables; anything else is `no_solution`.
    Strict,
}

/// Per-run scheduling parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ordered day names. Availability vectors are aligned to `periods`, one per day.
    pub days: Vec<String>,
    pub periods: Vec<String>,
    /// Levels where subjects and period controls must also match the class's field of study.
    pub specialized_levels: BTreeSet<i32>,
    /// `None` lets the solver run to completion.
    pub time_limit_secs: Option<f64>,
    pub timeout_policy: TimeoutPolicy,
    pub threads: i32,
    pub random_seed: i32,
    pub solver_log: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            days: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
                .into_iter()
                .map(String::from)
                .collect(),
            periods: ["1st_period", "2nd_period", "3rd_period", "4th_period"]
                .into_iter()
                .map(String::from)
                .collect(),
            specialized_levels: BTreeSet::from([3]),
            time_limit_secs: Some(30.0),
            timeout_policy: TimeoutPolicy::BestEffort,
            threads: 1,
            random_seed: 1234,
            solver_log: false,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_enumeration("days", &self.days)?;
        check_enumeration("periods", &self.periods)?;
        if let Some(secs) = self.time_limit_secs {
            // Must also fit in a `Duration`.
            if secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err() {
                return Err(ConfigurationError::InvalidTimeLimit(secs));
            }
        }
        Ok(())
    }

    pub fn is_specialized(&self, level: i32) -> bool {
        self.specialized_levels.contains(&level)
    }

    pub fn day_index(&self, day: &str) -> Option<usize> {
        self.days.iter().position(|d| d == day)
    }

    pub fn period_index(&self, period: &str) -> Option<usize> {
        self.periods.iter().position(|p| p == period)
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

fn check_enumeration(name: &'static str, values: &[String]) -> Result<(), ConfigurationError> {
    if values.is_empty() {
        return Err(ConfigurationError::EmptyEnumeration(name));
    }
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(ConfigurationError::DuplicateEnumerationValue {
                name,
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// Configuration of the HTTP service wrapping the scheduler.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind: String,
    /// Default `env_logger` filter, overridden by `RUST_LOG`.
    pub log_level: String,
    /// Upper bound on requests solved at the same time.
    pub max_concurrent_solves: usize,
    pub scheduler: SchedulerConfig,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            log_level: "info".to_string(),
            max_concurrent_solves: 4,
            scheduler: SchedulerConfig::default(),
            source: None,
        }
    }
}

impl ServiceConfig {
    /// Loads the file named by `TIMETABLE_CONFIG` (defaults otherwise), then
    /// applies environment overrides and validates the result.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.scheduler.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&raw)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigurationError> {
        if let Some(bind) = lookup(BIND_ENV) {
            self.bind = bind;
        }
        if let Some(raw) = lookup(TIME_LIMIT_ENV) {
            self.scheduler.time_limit_secs = match raw.trim() {
                "" | "none" => None,
                value => Some(value.parse().map_err(|_| ConfigurationError::InvalidEnv {
                    name: TIME_LIMIT_ENV,
                    value: raw.clone(),
                })?),
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_reference_week() {
        let config = SchedulerConfig::default();
        assert_eq!(config.days.len(), 6);
        assert_eq!(config.periods.len(), 4);
        assert!(config.is_specialized(3));
        assert!(!config.is_specialized(2));
        assert_eq!(config.day_index("Sat"), Some(5));
        assert_eq!(config.period_index("4th_period"), Some(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_and_empty_enumerations() {
        let mut config = SchedulerConfig::default();
        config.periods.push("1st_period".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::DuplicateEnumerationValue { name: "periods", .. })
        ));

        config.periods.clear();
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::EmptyEnumeration("periods"))
        );
    }

    #[test]
    fn rejects_non_positive_time_limit() {
        let config = SchedulerConfig {
            time_limit_secs: Some(0.0),
            ..SchedulerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigurationError::InvalidTimeLimit(0.0)));
    }

    #[test]
    fn rejects_time_limit_beyond_duration_range() {
        for secs in [1e20, f64::INFINITY] {
            let config = SchedulerConfig {
                time_limit_secs: Some(secs),
                ..SchedulerConfig::default()
            };
            assert_eq!(config.validate(), Err(ConfigurationError::InvalidTimeLimit(secs)));
        }
        let nan = SchedulerConfig {
            time_limit_secs: Some(f64::NAN),
            ..SchedulerConfig::default()
        };
        assert!(matches!(nan.validate(), Err(ConfigurationError::InvalidTimeLimit(_))));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ServiceConfig = serde_json::from_str(
            r#"{"bind": "0.0.0.0:9000", "scheduler": {"specialized_levels": [3, 4], "time_limit_secs": null, "timeout_policy": "strict"}}"#,
        )
        .unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.scheduler.days.len(), 6);
        assert!(config.scheduler.is_specialized(4));
        assert_eq!(config.scheduler.time_limit(), None);
        assert_eq!(config.scheduler.timeout_policy, TimeoutPolicy::Strict);
    }

    #[test]
    fn from_file_remembers_its_source() {
        let path = std::env::temp_dir().join(format!("timetable-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"log_level": "debug"}"#).unwrap();
        let config = ServiceConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        assert_eq!(ServiceConfig::default().source, None);
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([(BIND_ENV, "0.0.0.0:1"), (TIME_LIMIT_ENV, "2.5")]);
        let mut config = ServiceConfig::default();
        config
            .apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.bind, "0.0.0.0:1");
        assert_eq!(config.scheduler.time_limit(), Some(Duration::from_millis(2500)));

        let err = config
            .apply_overrides(|name| (name == TIME_LIMIT_ENV).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidEnv { .. }));
    }
}
