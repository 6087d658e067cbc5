use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult, PaginatedResponse};
use crate::db::entities::{prelude::Review, review};

#[derive(Clone)]
pub struct ReviewDao {
    db: DatabaseConnection,
}

impl DaoBase for ReviewDao {
    type Entity = Review;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl ReviewDao {
    pub async fn find_by_user_and_food_item(
        &self,
        user_id: Uuid,
        food_item_id: Uuid,
    ) -> DaoResult<Option<review::Model>> {
        self.find_one(move |query| {
            query
                .filter(review::Column::UserId.eq(user_id))
                .filter(review::Column::FoodItemId.eq(food_item_id))
        })
        .await
    }

    pub async fn create_review(
        &self,
        user_id: Uuid,
        food_item_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> DaoResult<review::Model> {
        let model = review::ActiveModel {
            user_id: Set(user_id),
            food_item_id: Set(food_item_id),
            rating: Set(rating),
            comment: Set(comment),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn update_review(
        &self,
        id: Uuid,
        rating: Option<i32>,
        comment: Option<String>,
    ) -> DaoResult<review::Model> {
        self.update(id, move |active| {
            if let Some(rating) = rating {
                active.rating = Set(rating);
            }
            if let Some(comment) = comment {
                active.comment = Set(Some(comment));
            }
        })
        .await
    }

    pub async fn list_for_food_item(
        &self,
        food_item_id: Uuid,
        page: u64,
        page_size: u64,
    ) -> DaoResult<PaginatedResponse<review::Model>> {
        self.find(page, page_size, None, move |query| {
            query.filter(review::Column::FoodItemId.eq(food_item_id))
        })
        .await
    }

    pub async fn ratings_for_food_item(&self, food_item_id: Uuid) -> DaoResult<Vec<i32>> {
        Review::find()
            .select_only()
            .column(review::Column::Rating)
            .filter(review::Column::FoodItemId.eq(food_item_id))
            .into_tuple::<i32>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }
}
