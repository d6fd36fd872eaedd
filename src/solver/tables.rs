//! Dense (day, period) lookup tables with explicit defaults.
//!
//! Availability is closed-world: anything not marked available is not.
//! Period controls are open-world: anything not explicitly disallowed is allowed.

use crate::config::SchedulerConfig;
use crate::data::SchedulingInput;
use crate::solver::eligibility::scope_matches;
use log::{debug, trace};
use std::collections::HashMap;

/// A days × periods grid of flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekGrid {
    periods: usize,
    cells: Vec<bool>,
}

impl WeekGrid {
    pub fn filled(days: usize, periods: usize, value: bool) -> Self {
        Self {
            periods,
            cells: vec![value; days * periods],
        }
    }

    pub fn get(&self, day: usize, period: usize) -> bool {
        self.cells[day * self.periods + period]
    }

    fn set(&mut self, day: usize, period: usize, value: bool) {
        self.cells[day * self.periods + period] = value;
    }

    pub fn count(&self, value: bool) -> usize {
        self.cells.iter().filter(|c| **c == value).count()
    }
}

/// Availability of every teacher, aligned with `SchedulingInput::teachers`.
#[derive(Debug, Clone)]
pub struct AvailabilityTable {
    teachers: Vec<WeekGrid>,
}

impl AvailabilityTable {
    /// Merges all availability records; a slot is available if any record marks it so.
    ///
    /// Expects input already validated against `config`.
    pub fn build(input: &SchedulingInput, config: &SchedulerConfig) -> Self {
        let (days, periods) = (config.days.len(), config.periods.len());
        let index: HashMap<&str, usize> = input
            .teachers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.user_id.as_str(), i))
            .collect();
        let mut teachers = vec![WeekGrid::filled(days, periods, false); input.teachers.len()];

        for record in &input.availabilities {
            let Some(&t) = index.get(record.user_id.as_str()) else {
                debug!("Availability for unknown teacher {} ignored.", record.user_id);
                continue;
            };
            for entry in &record.entries {
                let Some(day) = config.day_index(&entry.day) else {
                    continue;
                };
                for (period, available) in entry.periods.iter().enumerate().take(periods) {
                    if *available {
                        teachers[t].set(day, period, true);
                    }
                }
            }
        }

        for (teacher, grid) in input.teachers.iter().zip(&teachers) {
            trace!(
                "Teacher {} is available in {} of {} slots.",
                teacher.user_id,
                grid.count(true),
                days * periods
            );
        }
        Self { teachers }
    }

    pub fn is_available(&self, teacher: usize, day: usize, period: usize) -> bool {
        self.teachers[teacher].get(day, period)
    }
}

/// Allowed (day, period) cells of every class, aligned with `SchedulingInput::classes`.
#[derive(Debug, Clone)]
pub struct BlackoutTable {
    classes: Vec<WeekGrid>,
}

impl BlackoutTable {
    /// Any matching control that explicitly disallows a cell closes it.
    ///
    /// Expects input already validated against `config`.
    pub fn build(input: &SchedulingInput, config: &SchedulerConfig) -> Self {
        let (days, periods) = (config.days.len(), config.periods.len());
        let classes = input
            .classes
            .iter()
            .map(|class| {
                let mut grid = WeekGrid::filled(days, periods, true);
                for control in &input.period_controls {
                    if !scope_matches(
                        config,
                        class,
                        control.level,
                        &control.section,
                        control.field_of_study.as_deref(),
                    ) {
                        continue;
                    }
                    for entry in &control.entries {
                        let Some(day) = config.day_index(&entry.day) else {
                            continue;
                        };
                        for (name, allowed) in &entry.periods {
                            if let (false, Some(period)) = (*allowed, config.period_index(name)) {
                                grid.set(day, period, false);
                            }
                        }
                    }
                }
                let closed = grid.count(false);
                if closed > 0 {
                    debug!("Class {} has {} blacked-out slots.", class.class_id, closed);
                }
                grid
            })
            .collect();
        Self { classes }
    }

    pub fn is_allowed(&self, class: usize, day: usize, period: usize) -> bool {
        self.classes[class].get(day, period)
    }
}
