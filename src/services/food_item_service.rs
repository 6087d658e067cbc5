use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::dao::{
        CategoryDao, DaoBase, DaoLayerError, FoodItemChanges, FoodItemDao, FoodItemFilter,
        NewFoodItem, PaginatedResponse, ReviewDao,
    },
    db::entities::food_item,
    error::AppError,
    services::crud_service::{CrudErrors, CrudOp, CrudService},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub review_count: usize,
    pub average_rating: Option<f64>,
}

/// Average rounded to two decimals; `None` when nobody has reviewed the item.
pub fn rating_summary(ratings: &[i32]) -> RatingSummary {
    if ratings.is_empty() {
        return RatingSummary {
            review_count: 0,
            average_rating: None,
        };
    }
    let sum: i64 = ratings.iter().map(|rating| i64::from(*rating)).sum();
    let average = sum as f64 / ratings.len() as f64;
    RatingSummary {
        review_count: ratings.len(),
        average_rating: Some((average * 100.0).round() / 100.0),
    }
}

#[derive(Clone)]
pub struct FoodItemService {
    food_items: FoodItemDao,
    categories: CategoryDao,
    reviews: ReviewDao,
}

impl CrudService for FoodItemService {
    fn errors(&self) -> CrudErrors {
        CrudErrors {
            create_failed: "Food item create failed",
            find_failed: "Food item lookup failed",
            not_found: "Food item not found",
            update_failed: "Food item update failed",
            delete_failed: "Food item delete failed",
        }
    }
}

fn validate_price(price: Decimal) -> Result<(), AppError> {
    if price <= Decimal::ZERO {
        return Err(AppError::bad_request("Price must be greater than zero"));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> Result<(), AppError> {
    if stock < 0 {
        return Err(AppError::bad_request("Stock quantity cannot be negative"));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::bad_request("Food item name required"));
    }
    Ok(())
}

impl FoodItemService {
    pub fn new(food_items: FoodItemDao, categories: CategoryDao, reviews: ReviewDao) -> Self {
        Self {
            food_items,
            categories,
            reviews,
        }
    }

    pub async fn search(
        &self,
        page: u64,
        page_size: u64,
        filter: FoodItemFilter,
    ) -> Result<PaginatedResponse<food_item::Model>, AppError> {
        if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
            if min > max {
                return Err(AppError::bad_request(
                    "minPrice must not be greater than maxPrice",
                ));
            }
        }
        self.food_items
            .search(page, page_size, filter)
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    pub async fn get(&self, id: Uuid) -> Result<food_item::Model, AppError> {
        self.food_items
            .find_by_id(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))
    }

    pub async fn detail(&self, id: Uuid) -> Result<(food_item::Model, RatingSummary), AppError> {
        let item = self.get(id).await?;
        let ratings = self
            .reviews
            .ratings_for_food_item(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        Ok((item, rating_summary(&ratings)))
    }

    async fn ensure_category(&self, category_id: Uuid) -> Result<(), AppError> {
        match self.categories.find_by_id(category_id).await {
            Ok(_) => Ok(()),
            Err(DaoLayerError::NotFound { .. }) => Err(AppError::bad_request(format!(
                "Category {category_id} does not exist"
            ))),
            Err(err) => Err(self.map_error(CrudOp::Find, err)),
        }
    }

    pub async fn create(&self, data: NewFoodItem) -> Result<food_item::Model, AppError> {
        validate_name(&data.name)?;
        validate_price(data.price)?;
        validate_stock(data.stock_quantity)?;
        self.ensure_category(data.category_id).await?;

        let item = self
            .food_items
            .create_food_item(data)
            .await
            .map_err(|err| self.map_error(CrudOp::Create, err))?;
        tracing::info!(food_item_id = %item.id, "food item created");
        Ok(item)
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: FoodItemChanges,
    ) -> Result<food_item::Model, AppError> {
        if let Some(name) = changes.name.as_deref() {
            validate_name(name)?;
        }
        if let Some(price) = changes.price {
            validate_price(price)?;
        }
        if let Some(stock) = changes.stock_quantity {
            validate_stock(stock)?;
        }
        if let Some(category_id) = changes.category_id {
            self.ensure_category(category_id).await?;
        }

        self.food_items
            .update_food_item(id, changes)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))
    }

    /// Refused once the item appears on an order.
    pub async fn delete(&self, id: Uuid) -> Result<Uuid, AppError> {
        let ordered = self
            .food_items
            .count_order_items(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        if ordered > 0 {
            return Err(AppError::conflict(format!(
                "Food item appears on {ordered} order line(s) and cannot be deleted"
            )));
        }
        self.food_items
            .delete(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Delete, err))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use uuid::Uuid;

    use super::{FoodItemService, rating_summary};
    use crate::{
        db::dao::{FoodItemFilter, NewFoodItem},
        db::entities::{category, food_item},
        error::AppError,
        services::ServiceContext,
        test_helpers::{category_model, food_item_model},
    };

    fn service(mock: MockDatabase) -> FoodItemService {
        ServiceContext::new(&mock.into_connection()).food_item()
    }

    fn new_item(category_id: Uuid, price: Decimal, stock: i32) -> NewFoodItem {
        NewFoodItem {
            name: "Pad Thai".to_string(),
            description: "Rice noodles".to_string(),
            category_id,
            price,
            image_url: None,
            stock_quantity: stock,
        }
    }

    #[test]
    fn rating_summary_rounds_average() {
        assert_eq!(rating_summary(&[]).average_rating, None);
        let summary = rating_summary(&[5, 4, 4]);
        assert_eq!(summary.review_count, 3);
        assert_eq!(summary.average_rating, Some(4.33));
    }

    #[tokio::test]
    async fn create_rejects_non_positive_price() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let err = service
            .create(new_item(Uuid::new_v4(), Decimal::ZERO, 3))
            .await
            .expect_err("zero price should be rejected");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn create_rejects_negative_stock() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let err = service
            .create(new_item(Uuid::new_v4(), Decimal::new(999, 2), -1))
            .await
            .expect_err("negative stock should be rejected");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn create_requires_existing_category() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<category::Model>::new()]),
        );
        let err = service
            .create(new_item(Uuid::new_v4(), Decimal::new(999, 2), 3))
            .await
            .expect_err("unknown category should be rejected");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn create_persists_valid_item() {
        let category = category_model(Uuid::new_v4(), "Noodles");
        let created = food_item_model(Uuid::new_v4(), category.id, Decimal::new(999, 2), 3);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[category.clone()]])
                .append_query_results([[created.clone()]]),
        );

        let item = service
            .create(new_item(category.id, Decimal::new(999, 2), 3))
            .await
            .expect("create should succeed");
        assert_eq!(item, created);
    }

    #[tokio::test]
    async fn search_rejects_inverted_price_range() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let filter = FoodItemFilter {
            min_price: Some(Decimal::new(10, 0)),
            max_price: Some(Decimal::new(5, 0)),
            ..FoodItemFilter::default()
        };
        let err = service.search(1, 20, filter).await.expect_err("should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn detail_includes_rating_summary() {
        let item = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::new(500, 2), 1);
        let ratings = [5, 3].map(|rating| BTreeMap::from([("rating", Value::Int(Some(rating)))]));
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[item.clone()]])
                .append_query_results([ratings]),
        );

        let (found, summary) = service.detail(item.id).await.expect("detail should load");
        assert_eq!(found, item);
        assert_eq!(summary.review_count, 2);
        assert_eq!(summary.average_rating, Some(4.0));
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    #[tokio::test]
    async fn delete_is_refused_once_ordered() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[count_row(1)]]),
        );

        let err = service
            .delete(Uuid::new_v4())
            .await
            .expect_err("delete should be refused");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_never_ordered_item() {
        let id = Uuid::new_v4();
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(0)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
        );

        assert_eq!(service.delete(id).await.expect("delete should succeed"), id);
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<food_item::Model>::new()]),
        );
        let err = service.get(Uuid::new_v4()).await.expect_err("should fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
