use thiserror::Error;

/// Malformed scheduling input or configuration, detected before any model is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{kind} `{id}` is missing required field `{field}`")]
    MissingField {
        kind: &'static str,
        id: String,
        field: &'static str,
    },

    #[error("{owner} references unknown day `{day}`")]
    UnknownDay { owner: String, day: String },

    #[error("{owner} references unknown period `{period}`")]
    UnknownPeriod { owner: String, period: String },

    #[error("availability of {user_id} on {day} lists {actual} periods, expected {expected}")]
    PeriodVectorLength {
        user_id: String,
        day: String,
        expected: usize,
        actual: usize,
    },

    #[error("enumeration `{0}` is empty")]
    EmptyEnumeration(&'static str),

    #[error("enumeration `{name}` lists `{value}` more than once")]
    DuplicateEnumerationValue { name: &'static str, value: String },

    #[error("time limit must be a positive number of seconds, got {0}")]
    InvalidTimeLimit(f64),

    #[error("malformed request: {0}")]
    MalformedInput(String),

    #[error("environment variable {name} has invalid value `{value}`")]
    InvalidEnv { name: &'static str, value: String },
}

/// Errors surfaced to callers of the scheduler.
///
/// Infeasible models and solver timeouts are not errors: they are reported
/// as a `no_solution` output.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("invalid scheduling input: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("solver failure: {0}")]
    Solver(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = SchedulerError> = std::result::Result<T, E>;
