use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DaoLayerError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Invalid pagination: page={page} page_size={page_size}")]
    InvalidPagination { page: u64, page_size: u64 },
    #[error("not enough stock for food item {food_item_id}")]
    InsufficientStock { food_item_id: Uuid },
    #[error("order {id} is no longer {expected}")]
    StatusChanged { id: Uuid, expected: String },
}

pub type DaoResult<T> = Result<T, DaoLayerError>;
