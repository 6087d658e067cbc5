use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::{
        dao::{AddressChanges, NewAddress},
        entities::address,
    },
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

use super::categories::DeletedResponse;

#[derive(Debug, Deserialize)]
pub struct CreateAddressRequest {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub is_default: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAddressRequest {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub is_default: Option<bool>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/addresses", get(list_addresses).post(create_address))
        .route(
            "/addresses/{id}",
            get(get_address).put(update_address).delete(delete_address),
        )
        .route("/addresses/{id}/default", put(make_default))
        .with_state(state)
}

async fn list_addresses(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
) -> ApiResult<Vec<address::Model>> {
    let service = ServiceContext::from_state(state.as_ref()).address();
    JsonApiResponse::ok(service.list(claims.user_id()).await?)
}

async fn get_address(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<address::Model> {
    let service = ServiceContext::from_state(state.as_ref()).address();
    JsonApiResponse::ok(service.get(claims.user_id(), id).await?)
}

async fn create_address(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<CreateAddressRequest>,
) -> ApiResult<address::Model> {
    let service = ServiceContext::from_state(state.as_ref()).address();
    let created = service
        .create(
            claims.user_id(),
            NewAddress {
                street: body.street,
                city: body.city,
                state: body.state,
                zip_code: body.zip_code,
            },
            body.is_default,
        )
        .await?;
    JsonApiResponse::created(created)
}

async fn update_address(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAddressRequest>,
) -> ApiResult<address::Model> {
    let service = ServiceContext::from_state(state.as_ref()).address();
    let updated = service
        .update(
            claims.user_id(),
            id,
            AddressChanges {
                street: body.street,
                city: body.city,
                state: body.state,
                zip_code: body.zip_code,
            },
            body.is_default,
        )
        .await?;
    JsonApiResponse::ok(updated)
}

async fn make_default(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<address::Model> {
    let service = ServiceContext::from_state(state.as_ref()).address();
    JsonApiResponse::ok(service.set_default(claims.user_id(), id).await?)
}

async fn delete_address(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    let service = ServiceContext::from_state(state.as_ref()).address();
    let id = service.delete(claims.user_id(), id).await?;
    JsonApiResponse::ok(DeletedResponse { id })
}
