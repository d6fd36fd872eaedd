//! Timetable model construction, solving and extraction.
//!
//! One call to [`solve`] builds an independent model: eligibility → slot
//! variables → hard constraints → objective → backend → timetable.

pub mod adapter;
mod constraints;
pub mod eligibility;
mod extract;
pub mod highs;
pub mod model;
mod objective;
pub mod tables;

pub use adapter::{ObjectiveSense, SolveOutcome, SolveStatus, SolverAdapter, Value, Var};
pub use eligibility::{ClassEligibility, Eligibility};
pub use extract::teacher_display_name;
pub use highs::HighsAdapter;
pub use model::{SENTINEL, SlotGrid, SlotKey};

use crate::config::{SchedulerConfig, TimeoutPolicy};
use crate::data::{ScheduleStatus, ScheduleSummary, SchedulingInput, SchedulingOutput};
use crate::error::Result;
use crate::validation::validate_input;
use log::{debug, info};
use std::time::Instant;
use tables::{AvailabilityTable, BlackoutTable};

/// Solves the timetable using the HiGHS backend.
pub fn solve(input: &SchedulingInput, config: &SchedulerConfig) -> Result<SchedulingOutput> {
    solve_with(input, config, HighsAdapter::new(config))
}

/// Solves the timetable on the given (fresh) solver adapter.
pub fn solve_with<A: SolverAdapter>(
    input: &SchedulingInput,
    config: &SchedulerConfig,
    mut adapter: A,
) -> Result<SchedulingOutput> {
    let start_time = Instant::now();
    config.validate()?;
    validate_input(input, config)?;

    //model setup
    info!(
        "Setting up timetable model with {} classes, {} teachers, {} days and {} periods...",
        input.classes.len(),
        input.teachers.len(),
        config.days.len(),
        config.periods.len()
    );
    let eligibility = Eligibility::resolve(input, config);
    let availability = AvailabilityTable::build(input, config);
    let blackout = BlackoutTable::build(input, config);
    let grid = SlotGrid::build(&mut adapter, input, config, &eligibility);
    debug!("Created {} slot variables.", grid.len());

    // hard constraints
    constraints::post_no_double_booking(&mut adapter, input, config, &eligibility, &grid);
    constraints::post_availability(&mut adapter, input, &eligibility, &availability, &grid);
    constraints::post_period_control(&mut adapter, input, &blackout, &grid);

    objective::maximize_filled_slots(&mut adapter, input, config, &grid);

    //solve
    let outcome = adapter.solve(config.time_limit())?;
    let accepted = match outcome.status() {
        SolveStatus::Optimal => true,
        SolveStatus::Feasible => config.timeout_policy == TimeoutPolicy::BestEffort,
        SolveStatus::Infeasible | SolveStatus::Unknown => false,
    };
    if !accepted {
        info!(
            "No timetable reported (solver status {:?}, policy {:?}).",
            outcome.status(),
            config.timeout_policy
        );
        return Ok(SchedulingOutput::no_solution());
    }

    let (timetable, filled_slots) =
        extract::build_timetable(input, config, &eligibility, &grid, &outcome)?;
    debug_assert_eq!(outcome.objective(), Some(filled_slots as i64));

    let elapsed = start_time.elapsed();
    info!(
        "Timetable built: {}/{} slots filled in {:.2?}",
        filled_slots,
        grid.len(),
        elapsed
    );
    Ok(SchedulingOutput {
        status: ScheduleStatus::Ok,
        timetable,
        summary: Some(ScheduleSummary {
            filled_slots,
            total_slots: grid.len(),
            solver_status: outcome.status(),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }),
    })
}
