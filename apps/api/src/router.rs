use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use scheduling_cell::models::SchedulingError;
use scheduling_cell::router::scheduling_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Result<Router, SchedulingError> {
    Ok(Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/scheduling", scheduling_routes(state)?))
}
