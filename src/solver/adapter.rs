//! Declarative model interface between the timetable builder and a
//! finite-domain solving backend.
//!
//! The builder only posts variables, constraints and an objective through
//! [`SolverAdapter`]; any backend that honors the four-way [`SolveStatus`]
//! contract can sit behind it.

use crate::error::Result;
use serde::Serialize;
use std::time::Duration;

/// Integer value of a model variable.
pub type Value = i32;

/// Handle to a variable created by a [`SolverAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(usize);

impl Var {
    pub fn new(index: usize) -> Self {
        Var(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven optimal.
    Optimal,
    /// Feasible, but the solver stopped before proving optimality.
    Feasible,
    Infeasible,
    /// Stopped without any usable solution (typically a time limit).
    Unknown,
}

impl SolveStatus {
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Result of [`SolverAdapter::solve`]: a status and, when a solution
/// exists, one value per variable.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    status: SolveStatus,
    values: Vec<Value>,
    objective: Option<i64>,
}

impl SolveOutcome {
    pub fn solved(status: SolveStatus, values: Vec<Value>, objective: i64) -> Self {
        debug_assert!(status.has_solution());
        Self {
            status,
            values,
            objective: Some(objective),
        }
    }

    pub fn without_solution(status: SolveStatus) -> Self {
        debug_assert!(!status.has_solution());
        Self {
            status,
            values: Vec::new(),
            objective: None,
        }
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn value_of(&self, var: Var) -> Option<Value> {
        self.values.get(var.index()).copied()
    }

    pub fn objective(&self) -> Option<i64> {
        self.objective
    }
}

/// Builds and solves one finite-domain model.
///
/// An adapter instance owns exactly one model; it is consumed by `solve`.
pub trait SolverAdapter {
    /// Integer variable restricted to `domain`.
    fn new_int_var(&mut self, domain: &[Value], name: &str) -> Var;

    fn new_const(&mut self, value: Value) -> Var;

    /// Integer variable with domain `{0, 1}`.
    fn new_bool_var(&mut self, name: &str) -> Var;

    /// Posts `var == value`.
    fn add_eq(&mut self, var: Var, value: Value);

    /// Posts `var != value`.
    fn add_neq(&mut self, var: Var, value: Value);

    /// Posts `indicator <=> (var == value)`. `indicator` must be boolean.
    fn add_reified_eq(&mut self, indicator: Var, var: Var, value: Value);

    /// Posts `indicator <=> (var != value)`. `indicator` must be boolean.
    fn add_reified_neq(&mut self, indicator: Var, var: Var, value: Value);

    /// Posts `sum(vars) <= bound`.
    fn add_sum_leq(&mut self, vars: &[Var], bound: Value);

    /// Replaces the objective with `sense sum(terms)`.
    fn set_objective(&mut self, sense: ObjectiveSense, terms: &[Var]);

    /// Solves the model, stopping after `time_limit` when given.
    fn solve(self, time_limit: Option<Duration>) -> Result<SolveOutcome>
    where
        Self: Sized;
}
