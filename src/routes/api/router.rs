use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{
    addresses, admin_dashboard, auth, carts, categories, food_items, orders, reports, reviews,
    users, wishlist,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth::router(state.clone()))
        .merge(users::router(state.clone()))
        .merge(categories::router(state.clone()))
        .merge(food_items::router(state.clone()))
        .merge(carts::router(state.clone()))
        .merge(orders::router(state.clone()))
        .merge(addresses::router(state.clone()))
        .merge(reviews::router(state.clone()))
        .merge(wishlist::router(state.clone()))
        .merge(admin_dashboard::router(state.clone()))
        .merge(reports::router(state))
}
