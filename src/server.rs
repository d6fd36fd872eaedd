use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use log::{error, info};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;

use crate::config::{SchedulerConfig, ServiceConfig};
use crate::data::{SchedulingOutput, SchedulingRequest};
use crate::error::{ConfigurationError, Result, SchedulerError};
use crate::solver;

#[derive(Clone)]
struct AppState {
    defaults: Arc<SchedulerConfig>,
}

async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<SchedulingRequest>, JsonRejection>,
) -> Result<Json<SchedulingOutput>, (StatusCode, String)> {
    // unreadable bodies are rejected like any other malformed input
    let Json(SchedulingRequest { input, config }) = payload.map_err(|rejection| {
        let e = SchedulerError::from(ConfigurationError::MalformedInput(rejection.body_text()));
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;
    let config = config.unwrap_or_else(|| (*state.defaults).clone());

    // each request builds and solves its own model off the async runtime
    let result = tokio::task::spawn_blocking(move || solver::solve(&input, &config))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match result {
        Ok(output) => {
            info!("Timetable request answered: {output}");
            Ok(Json(output))
        }
        Err(e @ SchedulerError::Configuration(_)) => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => {
            error!("Timetable request failed: {e}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn router(config: &ServiceConfig) -> Router {
    let state = AppState {
        defaults: Arc::new(config.scheduler.clone()),
    };
    Router::new()
        .route("/v1/timetable/generate", post(generate_handler))
        .layer(ConcurrencyLimitLayer::new(config.max_concurrent_solves.max(1)))
        .route("/health", get(health_handler))
        .with_state(state)
}

pub async fn run_server(config: ServiceConfig) -> Result<()> {
    let app = router(&config);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
