use env_logger::Env;
use log::{debug, info};
use timetable_solver::config::{CONFIG_PATH_ENV, ServiceConfig};
use timetable_solver::data::SchedulingRequest;
use timetable_solver::error::SchedulerError;
use timetable_solver::{server, solver};

/// Solves one request file and prints the result instead of serving.
fn solve_file(path: &str, config: &ServiceConfig) -> Result<(), SchedulerError> {
    info!("Solving request file {path}");
    let raw = std::fs::read_to_string(path)?;
    let request = SchedulingRequest::from_json(&raw)?;
    let scheduler = request.config.unwrap_or_else(|| config.scheduler.clone());
    let output = solver::solve(&request.input, &scheduler)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), SchedulerError> {
    let config = ServiceConfig::load()?;
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str())).init();
    // logged only now: loading happens before the logger exists
    match &config.source {
        Some(path) => info!("Loaded service configuration from {}", path.display()),
        None => info!("No {CONFIG_PATH_ENV} set, using default service configuration"),
    }
    debug!("Service configuration: {config:?}");

    match std::env::args().nth(1) {
        Some(path) => solve_file(&path, &config),
        None => server::run_server(config).await,
    }
}
