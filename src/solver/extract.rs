//! Turns solved slot values back into a day → period → entries timetable.

use crate::config::SchedulerConfig;
use crate::data::{
    DaySchedule, Gender, PeriodSchedule, SchedulingInput, Teacher, Timetable, TimetableEntry,
};
use crate::error::{Result, SchedulerError};
use crate::solver::adapter::SolveOutcome;
use crate::solver::eligibility::Eligibility;
use crate::solver::model::{SENTINEL, SlotGrid};
use log::trace;

/// "Mr./Ms. {last name}" when the gender is known, "{first} {last}" otherwise.
pub fn teacher_display_name(teacher: &Teacher) -> String {
    match teacher.gender.unwrap_or_default() {
        Gender::Male => format!("Mr. {}", teacher.last_name),
        Gender::Female => format!("Ms. {}", teacher.last_name),
        Gender::Other => format!("{} {}", teacher.first_name, teacher.last_name),
    }
}

/// Builds the timetable from a solved outcome and returns it with the number
/// of filled slots.
///
/// Entries within one (day, period) follow the input class order. Any slot
/// value that is neither the sentinel nor an eligible teacher is an error:
/// a timetable is never returned partially.
pub(crate) fn build_timetable(
    input: &SchedulingInput,
    config: &SchedulerConfig,
    eligibility: &Eligibility,
    grid: &SlotGrid,
    outcome: &SolveOutcome,
) -> Result<(Timetable, usize)> {
    let mut cells: Vec<Vec<Vec<TimetableEntry>>> =
        vec![vec![Vec::new(); config.periods.len()]; config.days.len()];
    let mut filled = 0;

    for (key, slot) in grid.slots() {
        let class = &input.classes[key.class];
        let value = outcome.value_of(slot).ok_or_else(|| {
            SchedulerError::Solver(format!("no value for a slot of class {}", class.class_id))
        })?;
        if value == SENTINEL {
            continue;
        }

        let eligible = eligibility.class(key.class);
        let teacher_index = usize::try_from(value)
            .ok()
            .filter(|t| eligible.is_eligible(*t))
            .ok_or_else(|| {
                SchedulerError::Solver(format!(
                    "value {value} is not an eligible teacher of class {}",
                    class.class_id
                ))
            })?;
        let teacher = &input.teachers[teacher_index];
        // Unresolved subjects are left blank.
        let subject = eligible
            .subject_of(teacher_index)
            .map(|s| &input.subjects[s]);

        trace!(
            "{} {} {}: {} teaches {}",
            config.days[key.day],
            config.periods[key.period],
            class.class_id,
            teacher.user_id,
            subject.map_or("-", |s| s.subject_id.as_str())
        );
        cells[key.day][key.period].push(TimetableEntry {
            class_id: class.class_id.clone(),
            class_label: class.display_label().to_string(),
            teacher_id: teacher.user_id.clone(),
            teacher_name: teacher_display_name(teacher),
            subject_id: subject.map(|s| s.subject_id.clone()).unwrap_or_default(),
            subject_name: subject.map(|s| s.name.clone()).unwrap_or_default(),
        });
        filled += 1;
    }

    let days = config
        .days
        .iter()
        .zip(cells)
        .filter_map(|(day, periods)| {
            let periods: Vec<PeriodSchedule> = config
                .periods
                .iter()
                .zip(periods)
                .filter(|(_, entries)| !entries.is_empty())
                .map(|(period, entries)| PeriodSchedule {
                    period: period.clone(),
                    entries,
                })
                .collect();
            (!periods.is_empty()).then(|| DaySchedule {
                day: day.clone(),
                periods,
            })
        })
        .collect();

    Ok((Timetable { days }, filled))
}
