use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AdminRole,
    db::{dao::PaginatedResponse, entities::order},
    middleware::{AuthGuard, AuthRoleGuard},
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        order_service::{CheckoutRequest, OrderDetail},
    },
    state::AppState,
};

use super::PageQuery;

/// Either a saved address id or a free-text address; both empty means the default address.
#[derive(Debug, Default, Deserialize)]
pub struct PlaceOrderRequest {
    pub address_id: Option<Uuid>,
    pub shipping_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllOrdersQuery {
    pub status: Option<String>,
    pub page_number: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/orders", post(place_order).get(my_orders))
        .route("/orders/all", get(all_orders))
        .route("/orders/user/{user_id}", get(user_history))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(update_status))
        .route("/orders/{id}/cancel", post(cancel_order))
        .with_state(state)
}

async fn place_order(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    body: Option<Json<PlaceOrderRequest>>,
) -> ApiResult<OrderDetail> {
    let Json(body) = body.unwrap_or_default();
    let service = ServiceContext::from_state(state.as_ref()).order();
    let detail = service
        .checkout(
            claims.user_id(),
            CheckoutRequest {
                address_id: body.address_id,
                shipping_address: body.shipping_address,
            },
        )
        .await?;
    JsonApiResponse::created(detail)
}

async fn my_orders(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Query(paging): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<order::Model>> {
    let (page, page_size) = paging.resolve(&state.config.store);
    let service = ServiceContext::from_state(state.as_ref()).order();
    JsonApiResponse::ok(service.list_for_user(claims.user_id(), page, page_size).await?)
}

async fn all_orders(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Query(query): Query<AllOrdersQuery>,
) -> ApiResult<PaginatedResponse<order::Model>> {
    let paging = PageQuery {
        page_number: query.page_number,
        page_size: query.page_size,
    };
    let (page, page_size) = paging.resolve(&state.config.store);
    let service = ServiceContext::from_state(state.as_ref()).order();
    let orders = service
        .list_all(page, page_size, query.status.as_deref())
        .await?;
    JsonApiResponse::ok(orders)
}

async fn user_history(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(user_id): Path<Uuid>,
    Query(paging): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<order::Model>> {
    let (page, page_size) = paging.resolve(&state.config.store);
    let service = ServiceContext::from_state(state.as_ref()).order();
    let orders = service.history(&claims, user_id, page, page_size).await?;
    JsonApiResponse::ok(orders)
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderDetail> {
    let service = ServiceContext::from_state(state.as_ref()).order();
    JsonApiResponse::ok(service.get(&claims, id).await?)
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<order::Model> {
    let service = ServiceContext::from_state(state.as_ref()).order();
    JsonApiResponse::ok(service.set_status(id, &body.status).await?)
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderDetail> {
    let service = ServiceContext::from_state(state.as_ref()).order();
    JsonApiResponse::ok(service.cancel(&claims, id).await?)
}
