// libs/scheduling-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers::{self, SchedulingState};
use crate::models::SchedulingError;

pub fn scheduling_routes(config: Arc<AppConfig>) -> Result<Router, SchedulingError> {
    let state = Arc::new(SchedulingState::new(&config)?);

    Ok(Router::new()
        .route("/", get(handlers::get_snapshot))
        .route("/open", post(handlers::open_scheduling))
        .route("/navigate", post(handlers::navigate))
        .route("/activate", post(handlers::activate_row))
        .route("/choose", post(handlers::choose))
        .route("/back", post(handlers::back))
        .route("/close", post(handlers::close))
        .with_state(state))
}
