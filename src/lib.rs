//! School timetable construction.
//!
//! Assigns teachers to (class, day, period) slots so that no teacher is
//! double-booked, availability and period-control blackouts are respected,
//! and as many slots as possible are filled. The model is solved by a
//! finite-domain backend behind [`solver::SolverAdapter`]; HiGHS via
//! `good_lp` is the default.

pub mod config;
pub mod data;
pub mod error;
pub mod server;
pub mod solver;
pub mod validation;

pub use config::{SchedulerConfig, ServiceConfig, TimeoutPolicy};
pub use data::{SchedulingInput, SchedulingOutput, SchedulingRequest};
pub use error::{ConfigurationError, SchedulerError};
pub use solver::solve;
