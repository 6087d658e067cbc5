use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::{dao::PaginatedResponse, entities::review},
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

use super::{PageQuery, categories::DeletedResponse};

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub food_item_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/reviews", post(create_review))
        .route("/reviews/fooditem/{food_item_id}", get(list_for_food_item))
        .route("/reviews/{id}", put(update_review).delete(delete_review))
        .with_state(state)
}

async fn list_for_food_item(
    State(state): State<Arc<AppState>>,
    Path(food_item_id): Path<Uuid>,
    Query(paging): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<review::Model>> {
    let (page, page_size) = paging.resolve(&state.config.store);
    let service = ServiceContext::from_state(state.as_ref()).review();
    let reviews = service
        .list_for_food_item(food_item_id, page, page_size)
        .await?;
    JsonApiResponse::ok(reviews)
}

async fn create_review(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<CreateReviewRequest>,
) -> ApiResult<review::Model> {
    let service = ServiceContext::from_state(state.as_ref()).review();
    let created = service
        .create(claims.user_id(), body.food_item_id, body.rating, body.comment)
        .await?;
    JsonApiResponse::created(created)
}

async fn update_review(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateReviewRequest>,
) -> ApiResult<review::Model> {
    let service = ServiceContext::from_state(state.as_ref()).review();
    let updated = service
        .update(&claims, id, body.rating, body.comment)
        .await?;
    JsonApiResponse::ok(updated)
}

async fn delete_review(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    let service = ServiceContext::from_state(state.as_ref()).review();
    let id = service.delete(&claims, id).await?;
    JsonApiResponse::ok(DeletedResponse { id })
}
