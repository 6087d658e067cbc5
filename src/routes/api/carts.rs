use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, cart_service::CartView},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AddCartItemRequest {
    pub food_item_id: Uuid,
    #[serde(default = "one")]
    pub quantity: i32,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i32,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/carts", get(view_cart).delete(clear_cart))
        .route("/carts/items", post(add_item))
        .route("/carts/items/{item_id}", put(set_quantity).delete(remove_item))
        .with_state(state)
}

async fn view_cart(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<CartView> {
    let service = ServiceContext::from_state(state.as_ref()).cart();
    JsonApiResponse::ok(service.view(claims.user_id()).await?)
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<AddCartItemRequest>,
) -> ApiResult<CartView> {
    let service = ServiceContext::from_state(state.as_ref()).cart();
    let cart = service
        .add_item(claims.user_id(), body.food_item_id, body.quantity)
        .await?;
    JsonApiResponse::ok(cart)
}

async fn set_quantity(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(item_id): Path<Uuid>,
    Json(body): Json<SetQuantityRequest>,
) -> ApiResult<CartView> {
    let service = ServiceContext::from_state(state.as_ref()).cart();
    let cart = service
        .set_quantity(claims.user_id(), item_id, body.quantity)
        .await?;
    JsonApiResponse::ok(cart)
}

async fn remove_item(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(item_id): Path<Uuid>,
) -> ApiResult<CartView> {
    let service = ServiceContext::from_state(state.as_ref()).cart();
    JsonApiResponse::ok(service.remove_item(claims.user_id(), item_id).await?)
}

async fn clear_cart(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<CartView> {
    let service = ServiceContext::from_state(state.as_ref()).cart();
    JsonApiResponse::ok(service.clear(claims.user_id()).await?)
}
