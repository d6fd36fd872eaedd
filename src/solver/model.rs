use crate::config::SchedulerConfig;
use crate::data::SchedulingInput;
use crate::solver::adapter::{SolverAdapter, Value, Var};
use crate::solver::eligibility::Eligibility;
use log::trace;
use std::iter;

/// Slot value meaning "no teacher assigned".
pub const SENTINEL: Value = -1;

/// Solver value representing the teacher at `index` in `SchedulingInput::teachers`.
pub(crate) fn teacher_value(index: usize) -> Value {
    index as Value
}

/// Position of one (class, day, period) slot, as indices into the input
/// classes and the configured day/period enumerations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub class: usize,
    pub day: usize,
    pub period: usize,
}

/// One decision variable per (class, day, period), in class → day → period order.
pub struct SlotGrid {
    classes: usize,
    days: usize,
    periods: usize,
    vars: Vec<Var>,
}

impl SlotGrid {
    /// Creates the slot variables. A class without eligible teachers gets
    /// constants fixed to [`SENTINEL`] instead of free variables.
    pub fn build<A: SolverAdapter>(
        adapter: &mut A,
        input: &SchedulingInput,
        config: &SchedulerConfig,
        eligibility: &Eligibility,
    ) -> Self {
        let (days, periods) = (config.days.len(), config.periods.len());
        let mut vars = Vec::with_capacity(input.classes.len() * days * periods);

        for (c, class) in input.classes.iter().enumerate() {
            let eligible = eligibility.class(c);
            let domain: Vec<Value> = eligible
                .teachers()
                .iter()
                .map(|t| teacher_value(*t))
                .chain(iter::once(SENTINEL))
                .collect();
            if eligible.is_empty() {
                trace!("Class {} has no eligible teachers, fixing its slots.", class.class_id);
            }
            for day in &config.days {
                for period in &config.periods {
                    let var = if eligible.is_empty() {
                        adapter.new_const(SENTINEL)
                    } else {
                        adapter.new_int_var(
                            &domain,
                            &format!("assign_{}_{}_{}", class.class_id, day, period),
                        )
                    };
                    vars.push(var);
                }
            }
        }

        Self {
            classes: input.classes.len(),
            days,
            periods,
            vars,
        }
    }

    pub fn var(&self, key: SlotKey) -> Var {
        self.vars[(key.class * self.days + key.day) * self.periods + key.period]
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Every slot key in class → day → period order.
    pub fn keys(&self) -> impl Iterator<Item = SlotKey> + '_ {
        let (days, periods) = (self.days, self.periods);
        (0..self.classes).flat_map(move |class| {
            (0..days).flat_map(move |day| (0..periods).map(move |period| SlotKey { class, day, period }))
        })
    }

    pub fn slots(&self) -> impl Iterator<Item = (SlotKey, Var)> + '_ {
        self.keys().map(|key| (key, self.var(key)))
    }
}
