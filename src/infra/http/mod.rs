//! HTTP surface of the preview service.

mod middleware;
mod preview;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::application::preview::PreviewService;

use self::{
    middleware::{log_responses, set_request_context},
    preview::{block_visibility, health, preview_markup, server_variables},
};

pub const SERVER_VARIABLES_PATH: &str = "/backoffice/server-variables";
pub const HEALTH_PATH: &str = "/_health";

#[derive(Clone)]
pub struct HttpState {
    pub preview: Arc<PreviewService>,
    pub preview_path: Arc<str>,
    pub debounce_ms: u64,
}

pub fn build_router(state: HttpState) -> Router {
    let preview_path = state.preview_path.to_string();
    let visibility_path = format!("{preview_path}/visibility");

    Router::new()
        .route(&preview_path, post(preview_markup))
        .route(&visibility_path, post(block_visibility))
        .route(SERVER_VARIABLES_PATH, get(server_variables))
        .route(HEALTH_PATH, get(health))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
