use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AdminRole,
    db::entities::category,
    middleware::AuthRoleGuard,
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub icon_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .with_state(state)
}

async fn list_categories(State(state): State<Arc<AppState>>) -> ApiResult<Vec<category::Model>> {
    let service = ServiceContext::from_state(state.as_ref()).category();
    JsonApiResponse::ok(service.list().await?)
}

async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<category::Model> {
    let service = ServiceContext::from_state(state.as_ref()).category();
    JsonApiResponse::ok(service.get(id).await?)
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Json(body): Json<CreateCategoryRequest>,
) -> ApiResult<category::Model> {
    let service = ServiceContext::from_state(state.as_ref()).category();
    let created = service.create(&body.name, body.icon_url).await?;
    JsonApiResponse::created(created)
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCategoryRequest>,
) -> ApiResult<category::Model> {
    let service = ServiceContext::from_state(state.as_ref()).category();
    let updated = service.update(id, body.name, body.icon_url).await?;
    JsonApiResponse::ok(updated)
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    let service = ServiceContext::from_state(state.as_ref()).category();
    let id = service.delete(id).await?;
    JsonApiResponse::ok(DeletedResponse { id })
}
