use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, cart_service::CartView, wishlist_service::WishlistView},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AddWishlistItemRequest {
    pub food_item_id: Uuid,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/wishlist", get(view_wishlist))
        .route("/wishlist/items", post(add_item))
        .route("/wishlist/items/{item_id}", delete(remove_item))
        .route("/wishlist/items/{item_id}/move-to-cart", post(move_item))
        .route("/wishlist/move-to-cart", post(move_all))
        .with_state(state)
}

async fn view_wishlist(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
) -> ApiResult<WishlistView> {
    let service = ServiceContext::from_state(state.as_ref()).wishlist();
    JsonApiResponse::ok(service.view(claims.user_id()).await?)
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<AddWishlistItemRequest>,
) -> ApiResult<WishlistView> {
    let service = ServiceContext::from_state(state.as_ref()).wishlist();
    let wishlist = service.add(claims.user_id(), body.food_item_id).await?;
    JsonApiResponse::created(wishlist)
}

async fn remove_item(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(item_id): Path<Uuid>,
) -> ApiResult<WishlistView> {
    let service = ServiceContext::from_state(state.as_ref()).wishlist();
    JsonApiResponse::ok(service.remove(claims.user_id(), item_id).await?)
}

async fn move_item(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(item_id): Path<Uuid>,
) -> ApiResult<CartView> {
    let service = ServiceContext::from_state(state.as_ref()).wishlist();
    JsonApiResponse::ok(service.move_one(claims.user_id(), item_id).await?)
}

async fn move_all(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<CartView> {
    let service = ServiceContext::from_state(state.as_ref()).wishlist();
    JsonApiResponse::ok(service.move_all(claims.user_id()).await?)
}
