//! The three hard-constraint families of the timetable model.

use crate::config::SchedulerConfig;
use crate::data::SchedulingInput;
use crate::solver::adapter::SolverAdapter;
use crate::solver::eligibility::Eligibility;
use crate::solver::model::{SENTINEL, SlotGrid, SlotKey, teacher_value};
use crate::solver::tables::{AvailabilityTable, BlackoutTable};
use itertools::Itertools;
use log::{debug, info, trace};

/// A teacher holds at most one slot per (day, period), across all classes.
///
/// Posts one indicator per (teacher, class, day, period) where the teacher
/// is eligible for the class, and caps their sum at 1. Returns the number of
/// indicators created.
pub(crate) fn post_no_double_booking<A: SolverAdapter>(
    adapter: &mut A,
    input: &SchedulingInput,
    config: &SchedulerConfig,
    eligibility: &Eligibility,
    grid: &SlotGrid,
) -> usize {
    info!("Adding 'no teacher double-booking' constraints...");
    let classes_by_teacher = eligibility
        .iter()
        .enumerate()
        .flat_map(|(c, e)| e.teachers().iter().map(move |t| (*t, c)))
        .into_group_map();

    let mut indicators = 0;
    let mut rows = 0;
    for (day, day_name) in config.days.iter().enumerate() {
        for (period, period_name) in config.periods.iter().enumerate() {
            for (t, teacher) in input.teachers.iter().enumerate() {
                // Only classes where `t` is eligible get an indicator: in every
                // other class the slot domain excludes `t`, so its indicator is 0.
                let Some(classes) = classes_by_teacher.get(&t) else {
                    continue;
                };
                // One candidate class: the sum holds at most one indicator, so it is always <= 1.
                if classes.len() < 2 {
                    continue;
                }
                let assigned: Vec<_> = classes
                    .iter()
                    .map(|&class| {
                        let indicator = adapter.new_bool_var(&format!(
                            "is_{}_assigned_{}_{}_{}",
                            teacher.user_id, input.classes[class].class_id, day_name, period_name
                        ));
                        let slot = grid.var(SlotKey { class, day, period });
                        adapter.add_reified_eq(indicator, slot, teacher_value(t));
                        indicator
                    })
                    .collect();
                adapter.add_sum_leq(&assigned, 1);
                indicators += assigned.len();
                rows += 1;
            }
        }
    }
    debug!("Posted {rows} double-booking rows over {indicators} indicators.");
    indicators
}

/// An eligible teacher may only take slots their availability marks true.
///
/// Returns the number of forbidden (slot, teacher) pairs.
pub(crate) fn post_availability<A: SolverAdapter>(
    adapter: &mut A,
    input: &SchedulingInput,
    eligibility: &Eligibility,
    availability: &AvailabilityTable,
    grid: &SlotGrid,
) -> usize {
    info!("Adding 'teacher availability' constraints...");
    let mut forbidden = 0;
    for (key, slot) in grid.slots() {
        for &t in eligibility.class(key.class).teachers() {
            if !availability.is_available(t, key.day, key.period) {
                trace!(
                    "Teacher {} unavailable for class {} at {:?}",
                    input.teachers[t].user_id,
                    input.classes[key.class].class_id,
                    (key.day, key.period)
                );
                adapter.add_neq(slot, teacher_value(t));
                forbidden += 1;
            }
        }
    }
    debug!("Forbade {forbidden} unavailable (slot, teacher) pairs.");
    forbidden
}

/// Slots closed by a matching period control must stay unassigned.
///
/// Returns the number of slots forced to the sentinel.
pub(crate) fn post_period_control<A: SolverAdapter>(
    adapter: &mut A,
    input: &SchedulingInput,
    blackout: &BlackoutTable,
    grid: &SlotGrid,
) -> usize {
    info!("Adding 'period control' constraints...");
    let mut closed = 0;
    for (key, slot) in grid.slots() {
        if !blackout.is_allowed(key.class, key.day, key.period) {
            trace!(
                "Slot {:?} of class {} is blacked out",
                (key.day, key.period),
                input.classes[key.class].class_id
            );
            adapter.add_eq(slot, SENTINEL);
            closed += 1;
        }
    }
    debug!("Forced {closed} blacked-out slots to unassigned.");
    closed
}
