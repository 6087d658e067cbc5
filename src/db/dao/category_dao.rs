use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::{category, food_item, prelude::Category};

#[derive(Clone)]
pub struct CategoryDao {
    db: DatabaseConnection,
}

impl DaoBase for CategoryDao {
    type Entity = Category;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl CategoryDao {
    pub async fn list_categories(&self) -> DaoResult<Vec<category::Model>> {
        self.find_all(Some((category::Column::Name, Order::Asc)), |query| query)
            .await
    }

    pub async fn find_by_name(&self, name: &str) -> DaoResult<Option<category::Model>> {
        let name = name.trim().to_string();
        self.find_one(move |query| query.filter(category::Column::Name.eq(name)))
            .await
    }

    pub async fn create_category(
        &self,
        name: &str,
        icon_url: Option<String>,
    ) -> DaoResult<category::Model> {
        let model = category::ActiveModel {
            name: Set(name.trim().to_string()),
            icon_url: Set(icon_url),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        name: Option<String>,
        icon_url: Option<String>,
    ) -> DaoResult<category::Model> {
        self.update(id, move |active| {
            if let Some(name) = name {
                active.name = Set(name.trim().to_string());
            }
            if let Some(icon_url) = icon_url {
                active.icon_url = Set(Some(icon_url));
            }
        })
        .await
    }

    pub async fn count_food_items(&self, category_id: Uuid) -> DaoResult<u64> {
        food_item::Entity::find()
            .filter(food_item::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }
}
