use uuid::Uuid;

use crate::{
    auth::Claims,
    db::dao::{DaoBase, FoodItemDao, PaginatedResponse, ReviewDao},
    db::entities::review,
    error::AppError,
    services::crud_service::{CrudErrors, CrudOp, CrudService},
};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

fn validate_rating(rating: i32) -> Result<(), AppError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::bad_request(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ReviewService {
    reviews: ReviewDao,
    food_items: FoodItemDao,
}

impl CrudService for ReviewService {
    fn errors(&self) -> CrudErrors {
        CrudErrors {
            create_failed: "Review create failed",
            find_failed: "Review lookup failed",
            not_found: "Review not found",
            update_failed: "Review update failed",
            delete_failed: "Review delete failed",
        }
    }
}

impl ReviewService {
    pub fn new(reviews: ReviewDao, food_items: FoodItemDao) -> Self {
        Self {
            reviews,
            food_items,
        }
    }

    pub async fn list_for_food_item(
        &self,
        food_item_id: Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<PaginatedResponse<review::Model>, AppError> {
        self.reviews
            .list_for_food_item(food_item_id, page, page_size)
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    /// One review per user and food item.
    pub async fn create(
        &self,
        user_id: Uuid,
        food_item_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<review::Model, AppError> {
        validate_rating(rating)?;
        self.food_items
            .find_by_id(food_item_id)
            .await
            .map_err(AppError::from)?;

        let existing = self
            .reviews
            .find_by_user_and_food_item(user_id, food_item_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        if existing.is_some() {
            return Err(AppError::conflict("You have already reviewed this food item"));
        }

        self.reviews
            .create_review(user_id, food_item_id, rating, comment)
            .await
            .map_err(|err| self.map_error(CrudOp::Create, err))
    }

    pub async fn update(
        &self,
        claims: &Claims,
        id: Uuid,
        rating: Option<i32>,
        comment: Option<String>,
    ) -> Result<review::Model, AppError> {
        if let Some(rating) = rating {
            validate_rating(rating)?;
        }
        let review = self
            .reviews
            .find_by_id(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        claims.ensure_owner(review.user_id)?;

        self.reviews
            .update_review(id, rating, comment)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))
    }

    pub async fn delete(&self, claims: &Claims, id: Uuid) -> Result<Uuid, AppError> {
        let review = self
            .reviews
            .find_by_id(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        claims.ensure_owner_or_admin(review.user_id)?;

        self.reviews
            .delete(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Delete, err))
    }
}
