//! [`SolverAdapter`] backed by the HiGHS MILP solver through `good_lp`.
//!
//! Every finite-domain integer variable becomes a one-hot vector of binary
//! columns, one per domain value, constrained to sum to 1. (In)equality to a
//! constant fixes one column; reified equality ties a boolean column to it.

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::solver::adapter::{
    ObjectiveSense, SolveOutcome, SolveStatus, SolverAdapter, Value, Var,
};
use good_lp::solvers::SolutionStatus;
use good_lp::variable;
use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
    constraint, default_solver,
};
use itertools::Itertools;
use log::{debug, info, trace, warn};
use std::time::{Duration, Instant};

enum Column {
    Int(Vec<(Value, Variable)>),
    Bool(Variable),
    Const(Value),
}

/// `var == value` as a 0/1 quantity; `negated` reads it as `1 - expr`.
enum Indicator {
    Fixed(bool),
    Linear { expr: Expression, negated: bool },
}

impl Indicator {
    fn column(col: Variable, negated: bool) -> Self {
        Indicator::Linear {
            expr: Expression::from(col),
            negated,
        }
    }

    fn negate(self) -> Self {
        match self {
            Indicator::Fixed(b) => Indicator::Fixed(!b),
            Indicator::Linear { expr, negated } => Indicator::Linear {
                expr,
                negated: !negated,
            },
        }
    }
}

/// Only a proven optimum is OPTIMAL; any early stop with an incumbent
/// (time, iteration, gap or other limit) is FEASIBLE.
fn status_of(status: SolutionStatus) -> SolveStatus {
    match status {
        SolutionStatus::Optimal => SolveStatus::Optimal,
        SolutionStatus::TimeLimit | SolutionStatus::GapLimit => SolveStatus::Feasible,
    }
}

pub struct HighsAdapter {
    problem: ProblemVariables,
    vars: Vec<Column>,
    columns: usize,
    constraints: Vec<Constraint>,
    objective: Vec<Var>,
    sense: ObjectiveSense,
    /// Set when a posted constraint is unsatisfiable without any search.
    contradiction: Option<String>,
    threads: i32,
    random_seed: i32,
    solver_log: bool,
}

impl HighsAdapter {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            problem: ProblemVariables::new(),
            vars: Vec::new(),
            columns: 0,
            constraints: Vec::new(),
            objective: Vec::new(),
            sense: ObjectiveSense::Maximize,
            contradiction: None,
            threads: config.threads,
            random_seed: config.random_seed,
            solver_log: config.solver_log,
        }
    }

    /// Number of binary columns created so far.
    pub fn column_count(&self) -> usize {
        self.columns
    }

    fn push(&mut self, column: Column) -> Var {
        self.vars.push(column);
        Var::new(self.vars.len() - 1)
    }

    fn binary(&mut self, name: String) -> Variable {
        self.columns += 1;
        self.problem.add(variable().binary().name(name))
    }

    fn contradict(&mut self, reason: impl FnOnce() -> String) {
        if self.contradiction.is_none() {
            let reason = reason();
            debug!("Model is trivially infeasible: {reason}");
            self.contradiction = Some(reason);
        }
    }

    fn indicator(&self, var: Var, value: Value) -> Indicator {
        match &self.vars[var.index()] {
            Column::Const(c) => Indicator::Fixed(*c == value),
            Column::Bool(b) => match value {
                1 => Indicator::column(*b, false),
                0 => Indicator::column(*b, true),
                _ => Indicator::Fixed(false),
            },
            Column::Int(columns) => columns
                .iter()
                .find(|(v, _)| *v == value)
                .map_or(Indicator::Fixed(false), |(_, col)| {
                    Indicator::column(*col, false)
                }),
        }
    }

    /// Linear part of `sum(vars)` (if any column is involved) and its constant part.
    fn linear_sum(&self, vars: &[Var]) -> (Option<Expression>, Value) {
        let mut constant = 0;
        let mut terms: Vec<Expression> = Vec::new();
        for var in vars {
            match &self.vars[var.index()] {
                Column::Const(c) => constant += *c,
                Column::Bool(b) => terms.push(Expression::from(*b)),
                Column::Int(columns) => terms.extend(
                    columns
                        .iter()
                        .filter(|(v, _)| *v != 0)
                        .map(|(v, col)| *col * f64::from(*v)),
                ),
            }
        }
        let linear = (!terms.is_empty()).then(|| terms.into_iter().sum());
        (linear, constant)
    }

    /// Posts `left == right` between two 0/1 quantities.
    fn link(&mut self, left: Indicator, right: Indicator, what: impl FnOnce() -> String) {
        match (left, right) {
            (Indicator::Fixed(a), Indicator::Fixed(b)) => {
                if a != b {
                    self.contradict(what);
                }
            }
            (Indicator::Fixed(a), Indicator::Linear { expr, negated })
            | (Indicator::Linear { expr, negated }, Indicator::Fixed(a)) => {
                let target = i32::from(a != negated);
                self.constraints.push(constraint!(expr == target));
            }
            (
                Indicator::Linear { expr: a, negated: na },
                Indicator::Linear { expr: b, negated: nb },
            ) => {
                if na == nb {
                    self.constraints.push(constraint!(a == b));
                } else {
                    self.constraints.push(constraint!(a + b == 1));
                }
            }
        }
    }

    fn objective_value(&self, values: &[Value]) -> i64 {
        self.objective
            .iter()
            .map(|var| i64::from(values[var.index()]))
            .sum()
    }

    /// Reads one value per variable; `None` when some integer variable has
    /// no (or more than one) selected domain value.
    fn decode(&self, solution: &impl Solution) -> Option<Vec<Value>> {
        self.vars
            .iter()
            .map(|column| match column {
                Column::Const(c) => Some(*c),
                Column::Bool(b) => Some(i32::from(solution.value(*b) > 0.5)),
                Column::Int(columns) => columns
                    .iter()
                    .filter(|(_, col)| solution.value(*col) > 0.5)
                    .map(|(v, _)| *v)
                    .exactly_one()
                    .ok(),
            })
            .collect()
    }

    fn constant_values(&self) -> Option<Vec<Value>> {
        self.vars
            .iter()
            .map(|column| match column {
                Column::Const(c) => Some(*c),
                Column::Bool(_) | Column::Int(_) => None,
            })
            .collect()
    }
}

impl SolverAdapter for HighsAdapter {
    fn new_int_var(&mut self, domain: &[Value], name: &str) -> Var {
        let domain: Vec<Value> = domain.iter().copied().sorted().dedup().collect();
        match domain.as_slice() {
            [] => {
                self.contradict(|| format!("{name} has an empty domain"));
                self.push(Column::Int(Vec::new()))
            }
            [value] => self.push(Column::Const(*value)),
            _ => {
                let columns: Vec<(Value, Variable)> = domain
                    .iter()
                    .map(|v| (*v, self.binary(format!("{name}={v}"))))
                    .collect();
                let one_hot: Expression = columns.iter().map(|(_, col)| *col).sum();
                self.constraints.push(constraint!(one_hot == 1));
                self.push(Column::Int(columns))
            }
        }
    }

    fn new_const(&mut self, value: Value) -> Var {
        self.push(Column::Const(value))
    }

    fn new_bool_var(&mut self, name: &str) -> Var {
        let col = self.binary(name.to_string());
        self.push(Column::Bool(col))
    }

    fn add_eq(&mut self, var: Var, value: Value) {
        let indicator = self.indicator(var, value);
        self.link(indicator, Indicator::Fixed(true), || {
            format!("{var:?} == {value}")
        });
    }

    fn add_neq(&mut self, var: Var, value: Value) {
        let indicator = self.indicator(var, value);
        self.link(indicator, Indicator::Fixed(false), || {
            format!("{var:?} != {value}")
        });
    }

    fn add_reified_eq(&mut self, indicator: Var, var: Var, value: Value) {
        let left = self.indicator(indicator, 1);
        let right = self.indicator(var, value);
        self.link(left, right, || {
            format!("{indicator:?} <=> {var:?} == {value}")
        });
    }

    fn add_reified_neq(&mut self, indicator: Var, var: Var, value: Value) {
        let left = self.indicator(indicator, 1);
        let right = self.indicator(var, value).negate();
        self.link(left, right, || {
            format!("{indicator:?} <=> {var:?} != {value}")
        });
    }

    fn add_sum_leq(&mut self, vars: &[Var], bound: Value) {
        let (linear, constant) = self.linear_sum(vars);
        let remaining = bound - constant;
        match linear {
            Some(sum) => self.constraints.push(constraint!(sum <= remaining)),
            None if remaining < 0 => {
                self.contradict(|| format!("constant sum {constant} exceeds {bound}"))
            }
            None => {}
        }
    }

    fn set_objective(&mut self, sense: ObjectiveSense, terms: &[Var]) {
        self.sense = sense;
        self.objective = terms.to_vec();
    }

    fn solve(mut self, time_limit: Option<Duration>) -> Result<SolveOutcome> {
        if let Some(reason) = &self.contradiction {
            info!("Skipping solver, model is infeasible: {reason}");
            return Ok(SolveOutcome::without_solution(SolveStatus::Infeasible));
        }

        if let Some(values) = self.constant_values() {
            debug!("Model has no free columns, answering without the solver.");
            let objective = self.objective_value(&values);
            return Ok(SolveOutcome::solved(SolveStatus::Optimal, values, objective));
        }

        let objective: Expression = self.linear_sum(&self.objective).0.into_iter().sum();
        let problem = std::mem::replace(&mut self.problem, ProblemVariables::new());
        let constraints = std::mem::take(&mut self.constraints);

        info!(
            "Starting MILP solver with {} columns and {} rows...",
            self.columns,
            constraints.len()
        );
        let unsolved = match self.sense {
            ObjectiveSense::Maximize => problem.maximise(objective),
            ObjectiveSense::Minimize => problem.minimise(objective),
        };
        let mut model = unsolved
            .using(default_solver)
            .set_option("threads", self.threads) // fixed threads and seed for reproducibility
            .set_option("random_seed", self.random_seed)
            .set_option("output_flag", self.solver_log)
            .set_option("mip_rel_gap", 0.0);
        if let Some(limit) = time_limit {
            model = model.set_option("time_limit", limit.as_secs_f64());
        }
        for c in constraints {
            model.add_constraint(c);
        }

        let start_time = Instant::now();
        let result = model.solve();
        let elapsed = start_time.elapsed();
        trace!("Solver returned after {elapsed:.2?}");

        match result {
            Ok(solution) => match self.decode(&solution) {
                Some(values) => {
                    let status = status_of(solution.status());
                    let objective = self.objective_value(&values);
                    info!("Solver finished: {status:?}, objective {objective}, in {elapsed:.2?}");
                    Ok(SolveOutcome::solved(status, values, objective))
                }
                None => {
                    warn!("Solver stopped after {elapsed:.2?} without a usable incumbent.");
                    Ok(SolveOutcome::without_solution(SolveStatus::Unknown))
                }
            },
            Err(ResolutionError::Infeasible) => {
                info!("Solver proved the model infeasible in {elapsed:.2?}");
                Ok(SolveOutcome::without_solution(SolveStatus::Infeasible))
            }
            Err(e) => Err(SchedulerError::Solver(e.to_string())),
        }
    }
}
