use thiserror::Error;

use crate::db::dao::DaoLayerError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// A 500 whose cause is logged but never sent to the client.
    pub fn internal_with_source(message: impl Into<String>, source: impl std::fmt::Display) -> Self {
        let message = message.into();
        tracing::error!(error = %source, "{message}");
        Self::Internal(message)
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Internal(message) => message.as_str(),
        }
    }
}

fn describe_entity(table: &str) -> &str {
    match table {
        "users" => "User",
        "refresh_tokens" => "Refresh token",
        "categories" => "Category",
        "food_items" => "Food item",
        "carts" => "Cart",
        "cart_items" => "Cart item",
        "orders" => "Order",
        "order_items" => "Order item",
        "addresses" => "Address",
        "reviews" => "Review",
        "wishlists" => "Wishlist",
        "wishlist_items" => "Wishlist item",
        other => other,
    }
}

impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::NotFound { entity, id } => {
                AppError::not_found(format!("{} {id} not found", describe_entity(entity)))
            }
            DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
            DaoLayerError::InsufficientStock { food_item_id } => AppError::bad_request(format!(
                "Not enough stock for food item {food_item_id}"
            )),
            DaoLayerError::StatusChanged { id, expected } => AppError::bad_request(format!(
                "Order {id} is no longer {expected}"
            )),
            DaoLayerError::Db(ref source) => {
                AppError::internal_with_source("Database operation failed", source)
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::unauthorized(format!("Invalid or expired token: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;
    use uuid::Uuid;

    use super::AppError;
    use crate::db::dao::DaoLayerError;

    #[test]
    fn not_found_uses_a_readable_entity_name() {
        let id = Uuid::nil();
        let err = AppError::from(DaoLayerError::NotFound {
            entity: "food_items",
            id,
        });
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.message(), format!("Food item {id} not found"));
    }

    #[test]
    fn database_errors_are_hidden_from_clients() {
        let err = AppError::from(DaoLayerError::Db(DbErr::Custom(
            "connection refused on 10.0.0.5".to_string(),
        )));
        assert!(matches!(err, AppError::Internal(_)));
        assert!(!err.message().contains("10.0.0.5"));
    }

    #[test]
    fn stock_shortage_is_a_client_error() {
        let err = AppError::from(DaoLayerError::InsufficientStock {
            food_item_id: Uuid::nil(),
        });
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn lost_status_race_is_a_client_error() {
        let err = AppError::from(DaoLayerError::StatusChanged {
            id: Uuid::nil(),
            expected: "Pending".to_string(),
        });
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(err.message().ends_with("is no longer Pending"));
    }
}
