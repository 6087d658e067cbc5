use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult, PaginatedResponse};
use crate::db::entities::{
    food_item, order_item,
    prelude::{FoodItem, OrderItem},
};

#[derive(Clone)]
pub struct FoodItemDao {
    db: DatabaseConnection,
}

impl DaoBase for FoodItemDao {
    type Entity = FoodItem;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Catalog listing filters. Every field is optional and they combine with AND.
#[derive(Debug, Default, Clone)]
pub struct FoodItemFilter {
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
}

impl FoodItemFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(category_id) = self.category_id {
            condition = condition.add(food_item::Column::CategoryId.eq(category_id));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(food_item::Column::Name.contains(search))
                    .add(food_item::Column::Description.contains(search)),
            );
        }
        if let Some(min_price) = self.min_price {
            condition = condition.add(food_item::Column::Price.gte(min_price));
        }
        if let Some(max_price) = self.max_price {
            condition = condition.add(food_item::Column::Price.lte(max_price));
        }
        match self.in_stock {
            Some(true) => condition = condition.add(food_item::Column::StockQuantity.gt(0)),
            Some(false) => condition = condition.add(food_item::Column::StockQuantity.lte(0)),
            None => {}
        }
        condition
    }
}

#[derive(Debug, Clone)]
pub struct NewFoodItem {
    pub name: String,
    pub description: String,
    pub category_id: Uuid,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
}

#[derive(Debug, Default, Clone)]
pub struct FoodItemChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub stock_quantity: Option<i32>,
}

impl FoodItemDao {
    pub async fn search(
        &self,
        page: u64,
        page_size: u64,
        filter: FoodItemFilter,
    ) -> DaoResult<PaginatedResponse<food_item::Model>> {
        let condition = filter.condition();
        self.find(
            page,
            page_size,
            Some((food_item::Column::Name, Order::Asc)),
            move |query| query.filter(condition),
        )
        .await
    }

    pub async fn create_food_item(&self, data: NewFoodItem) -> DaoResult<food_item::Model> {
        let model = food_item::ActiveModel {
            name: Set(data.name),
            description: Set(data.description),
            category_id: Set(data.category_id),
            price: Set(data.price),
            image_url: Set(data.image_url),
            stock_quantity: Set(data.stock_quantity),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn update_food_item(
        &self,
        id: Uuid,
        changes: FoodItemChanges,
    ) -> DaoResult<food_item::Model> {
        self.update(id, move |active| {
            if let Some(name) = changes.name {
                active.name = Set(name);
            }
            if let Some(description) = changes.description {
                active.description = Set(description);
            }
            if let Some(category_id) = changes.category_id {
                active.category_id = Set(category_id);
            }
            if let Some(price) = changes.price {
                active.price = Set(price);
            }
            if let Some(image_url) = changes.image_url {
                active.image_url = Set(Some(image_url));
            }
            if let Some(stock_quantity) = changes.stock_quantity {
                active.stock_quantity = Set(stock_quantity);
            }
        })
        .await
    }

    pub async fn find_by_ids(&self, ids: Vec<Uuid>) -> DaoResult<Vec<food_item::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        FoodItem::find()
            .filter(food_item::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Order lines that still point at the item; order history keeps them alive.
    pub async fn count_order_items(&self, id: Uuid) -> DaoResult<u64> {
        OrderItem::find()
            .filter(order_item::Column::FoodItemId.eq(id))
            .count(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Items at or below `threshold` units, scarcest first.
    pub async fn low_stock(&self, threshold: i32, limit: u64) -> DaoResult<Vec<food_item::Model>> {
        FoodItem::find()
            .filter(food_item::Column::StockQuantity.lte(threshold))
            .order_by_asc(food_item::Column::StockQuantity)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryFilter, QueryTrait, Value};
    use uuid::Uuid;

    use super::{FoodItemDao, FoodItemFilter};
    use crate::db::dao::{DaoBase, DaoLayerError};
    use crate::db::entities::{food_item, prelude::FoodItem};
    use crate::test_helpers::food_item_model;

    fn filter_sql(filter: &FoodItemFilter) -> String {
        use sea_orm::EntityTrait;
        FoodItem::find()
            .filter(filter.condition())
            .build(DatabaseBackend::Postgres)
            .to_string()
    }

    #[test]
    fn empty_filter_adds_no_predicates() {
        let sql = filter_sql(&FoodItemFilter::default());
        assert!(!sql.contains("WHERE"), "unexpected predicate in {sql}");
    }

    #[test]
    fn filter_combines_every_criterion() {
        let filter = FoodItemFilter {
            category_id: Some(Uuid::nil()),
            search: Some(" pizza ".to_string()),
            min_price: Some(Decimal::new(500, 2)),
            max_price: Some(Decimal::new(2000, 2)),
            in_stock: Some(true),
        };
        let sql = filter_sql(&filter);
        assert!(sql.contains(r#""category_id" = '00000000-0000-0000-0000-000000000000'"#));
        assert!(sql.contains(r#""name" LIKE '%pizza%'"#));
        assert!(sql.contains(r#""description" LIKE '%pizza%'"#));
        assert!(sql.contains(r#""price" >= 5.00"#));
        assert!(sql.contains(r#""price" <= 20.00"#));
        assert!(sql.contains(r#""stock_quantity" > 0"#));
    }

    #[test]
    fn blank_search_is_ignored() {
        let filter = FoodItemFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!filter_sql(&filter).contains("LIKE"));
    }

    #[tokio::test]
    async fn search_reports_next_page() {
        let category_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                food_item_model(Uuid::new_v4(), category_id, Decimal::new(899, 2), 3),
                food_item_model(Uuid::new_v4(), category_id, Decimal::new(1299, 2), 0),
            ]])
            .append_query_results([[BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(2)),
            )])]])
            .into_connection();
        let dao = FoodItemDao::new(&db);

        let page = dao
            .search(1, 1, FoodItemFilter::default())
            .await
            .expect("query should succeed");
        assert_eq!(page.data.len(), 1);
        assert!(page.has_next);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn search_rejects_oversized_pages() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let dao = FoodItemDao::new(&db);

        let err = dao
            .search(1, 500, FoodItemFilter::default())
            .await
            .expect_err("page size should be rejected");
        assert!(matches!(err, DaoLayerError::InvalidPagination { page_size: 500, .. }));
    }

    #[tokio::test]
    async fn find_by_ids_skips_the_query_for_empty_input() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let dao = FoodItemDao::new(&db);

        let items: Vec<food_item::Model> =
            dao.find_by_ids(Vec::new()).await.expect("no query needed");
        assert!(items.is_empty());
    }
}
