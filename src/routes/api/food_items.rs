use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AdminRole,
    db::{
        dao::{FoodItemChanges, FoodItemFilter, NewFoodItem, PaginatedResponse},
        entities::food_item,
    },
    middleware::AuthRoleGuard,
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, food_item_service::RatingSummary},
    state::AppState,
};

use super::{PageQuery, categories::DeletedResponse};

/// Catalog filters and paging share one query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemQuery {
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub page_number: Option<u64>,
    pub page_size: Option<u64>,
}

impl FoodItemQuery {
    fn split(self) -> (PageQuery, FoodItemFilter) {
        let paging = PageQuery {
            page_number: self.page_number,
            page_size: self.page_size,
        };
        let filter = FoodItemFilter {
            category_id: self.category_id,
            search: self.search.filter(|term| !term.trim().is_empty()),
            min_price: self.min_price,
            max_price: self.max_price,
            in_stock: self.in_stock,
        };
        (paging, filter)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateFoodItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Uuid,
    pub price: Decimal,
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFoodItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub stock_quantity: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct FoodItemDetail {
    #[serde(flatten)]
    pub item: food_item::Model,
    #[serde(flatten)]
    pub rating: RatingSummary,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/fooditems", get(list_food_items).post(create_food_item))
        .route(
            "/fooditems/{id}",
            get(get_food_item)
                .put(update_food_item)
                .delete(delete_food_item),
        )
        .with_state(state)
}

async fn list_food_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FoodItemQuery>,
) -> ApiResult<PaginatedResponse<food_item::Model>> {
    let (paging, filter) = query.split();
    let (page, page_size) = paging.resolve(&state.config.store);
    let service = ServiceContext::from_state(state.as_ref()).food_item();
    JsonApiResponse::ok(service.search(page, page_size, filter).await?)
}

async fn get_food_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<FoodItemDetail> {
    let service = ServiceContext::from_state(state.as_ref()).food_item();
    let (item, rating) = service.detail(id).await?;
    JsonApiResponse::ok(FoodItemDetail { item, rating })
}

async fn create_food_item(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Json(body): Json<CreateFoodItemRequest>,
) -> ApiResult<food_item::Model> {
    let service = ServiceContext::from_state(state.as_ref()).food_item();
    let created = service
        .create(NewFoodItem {
            name: body.name,
            description: body.description,
            category_id: body.category_id,
            price: body.price,
            image_url: body.image_url,
            stock_quantity: body.stock_quantity,
        })
        .await?;
    JsonApiResponse::created(created)
}

async fn update_food_item(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateFoodItemRequest>,
) -> ApiResult<food_item::Model> {
    let service = ServiceContext::from_state(state.as_ref()).food_item();
    let updated = service
        .update(
            id,
            FoodItemChanges {
                name: body.name,
                description: body.description,
                category_id: body.category_id,
                price: body.price,
                image_url: body.image_url,
                stock_quantity: body.stock_quantity,
            },
        )
        .await?;
    JsonApiResponse::ok(updated)
}

async fn delete_food_item(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    let service = ServiceContext::from_state(state.as_ref()).food_item();
    let id = service.delete(id).await?;
    JsonApiResponse::ok(DeletedResponse { id })
}
