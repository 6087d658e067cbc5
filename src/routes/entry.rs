use std::sync::Arc;

use axum::{Router, middleware};

use crate::{
    error::AppError,
    middleware::{catch_panic_layer, json_error_middleware},
    state::AppState,
};

use super::api;

pub const API_PREFIX: &str = "/api";

/// The whole HTTP surface: every API route plus the JSON envelope for errors that
/// never reach a handler (unknown paths, extractor rejections, panics).
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest(API_PREFIX, api::router(state))
        .fallback(unknown_route)
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
}

async fn unknown_route() -> AppError {
    AppError::not_found("Route not found")
}
