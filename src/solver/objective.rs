use crate::config::SchedulerConfig;
use crate::data::SchedulingInput;
use crate::solver::adapter::{ObjectiveSense, SolverAdapter, Var};
use crate::solver::model::{SENTINEL, SlotGrid};
use log::info;

/// Maximizes the number of slots holding a teacher.
///
/// No weighting: every filled slot counts 1.
pub(crate) fn maximize_filled_slots<A: SolverAdapter>(
    adapter: &mut A,
    input: &SchedulingInput,
    config: &SchedulerConfig,
    grid: &SlotGrid,
) {
    let filled: Vec<Var> = grid
        .slots()
        .map(|(key, slot)| {
            let indicator = adapter.new_bool_var(&format!(
                "assigned_{}_{}_{}",
                input.classes[key.class].class_id, config.days[key.day], config.periods[key.period]
            ));
            adapter.add_reified_neq(indicator, slot, SENTINEL);
            indicator
        })
        .collect();
    info!("Objective: maximize filled slots over {} indicators.", filled.len());
    adapter.set_objective(ObjectiveSense::Maximize, &filled);
}
