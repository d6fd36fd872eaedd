//! Input validation for scheduling runs.
//!
//! Runs before any model is built and stops at the first problem found:
//! - empty or duplicate class, teacher and subject ids
//! - availability entries on unknown days, or whose period vector does not
//!   match the configured period count
//! - period-control entries on unknown days or periods

use crate::config::SchedulerConfig;
use crate::data::SchedulingInput;
use crate::error::ConfigurationError;
use std::collections::HashSet;

type Result<T = ()> = std::result::Result<T, ConfigurationError>;

fn unique_ids<'a>(kind: &'static str, field: &'static str, ids: impl Iterator<Item = &'a str>) -> Result {
    let mut seen = HashSet::new();
    for (position, id) in ids.enumerate() {
        if id.trim().is_empty() {
            return Err(ConfigurationError::MissingField {
                kind,
                id: format!("#{position}"),
                field,
            });
        }
        if !seen.insert(id) {
            return Err(ConfigurationError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

/// Validates `input` against the enumerations of `config`.
pub fn validate_input(input: &SchedulingInput, config: &SchedulerConfig) -> Result {
    unique_ids("class", "class_id", input.classes.iter().map(|c| c.class_id.as_str()))?;
    unique_ids("teacher", "user_id", input.teachers.iter().map(|t| t.user_id.as_str()))?;
    unique_ids("subject", "subject_id", input.subjects.iter().map(|s| s.subject_id.as_str()))?;

    for (position, record) in input.availabilities.iter().enumerate() {
        if record.user_id.trim().is_empty() {
            return Err(ConfigurationError::MissingField {
                kind: "availability",
                id: format!("#{position}"),
                field: "user_id",
            });
        }
        for entry in &record.entries {
            if config.day_index(&entry.day).is_none() {
                return Err(ConfigurationError::UnknownDay {
                    owner: format!("availability of {}", record.user_id),
                    day: entry.day.clone(),
                });
            }
            if entry.periods.len() != config.periods.len() {
                return Err(ConfigurationError::PeriodVectorLength {
                    user_id: record.user_id.clone(),
                    day: entry.day.clone(),
                    expected: config.periods.len(),
                    actual: entry.periods.len(),
                });
            }
        }
    }

    for control in &input.period_controls {
        let owner = || {
            format!(
                "period control for level {} section {}",
                control.level, control.section
            )
        };
        for entry in &control.entries {
            if config.day_index(&entry.day).is_none() {
                return Err(ConfigurationError::UnknownDay {
                    owner: owner(),
                    day: entry.day.clone(),
                });
            }
            if let Some(period) = entry
                .periods
                .keys()
                .find(|p| config.period_index(p).is_none())
            {
                return Err(ConfigurationError::UnknownPeriod {
                    owner: owner(),
                    period: period.clone(),
                });
            }
        }
    }

    Ok(())
}
