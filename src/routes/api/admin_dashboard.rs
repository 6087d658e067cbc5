use std::sync::Arc;

use axum::{Router, extract::State, middleware, routing::get};

use crate::{
    auth::Role,
    middleware::{RequireRoleLayer, jwt_auth},
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, report_service::Dashboard},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route_layer(RequireRoleLayer::new(Role::Admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth))
        .with_state(state)
}

async fn dashboard(State(state): State<Arc<AppState>>) -> ApiResult<Dashboard> {
    let service = ServiceContext::from_state(state.as_ref()).report();
    let dashboard = service
        .dashboard(state.config.store.low_stock_threshold)
        .await?;
    JsonApiResponse::ok(dashboard)
}
