use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/profile", put(handlers::complete_profile))
        .route("/profile", get(handlers::get_profile))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

pub fn specialty_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_specialty))
        .route("/", get(handlers::list_specialties))
        .route("/{specialty_id}", put(handlers::rename_specialty))
        .route("/{specialty_id}", delete(handlers::delete_specialty))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
