use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult, PaginatedResponse};
use crate::db::entities::{prelude::User, user};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Fields of a user row that may change after registration.
#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub username: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl UserDao {
    /// Soft-deleted accounts keep their email, so lookups only consider active rows.
    pub async fn find_active_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        let email = email.trim().to_lowercase();
        self.find_one(move |query| {
            query
                .filter(user::Column::Email.eq(email))
                .filter(user::Column::IsActive.eq(true))
        })
        .await
    }

    pub async fn create_user(
        &self,
        username: &str,
        phone: Option<String>,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            username: Set(username.to_string()),
            phone: Set(phone),
            email: Set(email.trim().to_lowercase()),
            password_hash: Set(password_hash.to_string()),
            role: Set(role.to_string()),
            is_active: Set(true),
            last_login_at: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn list_users(
        &self,
        page: u64,
        page_size: u64,
    ) -> DaoResult<PaginatedResponse<user::Model>> {
        self.find(page, page_size, None, |query| query).await
    }

    pub async fn update_profile(&self, id: Uuid, changes: UserChanges) -> DaoResult<user::Model> {
        self.update(id, move |active| {
            if let Some(username) = changes.username {
                active.username = Set(username);
            }
            if let Some(phone) = changes.phone {
                active.phone = Set(Some(phone));
            }
            if let Some(email) = changes.email {
                active.email = Set(email.trim().to_lowercase());
            }
        })
        .await
    }

    pub async fn set_password_hash(&self, id: Uuid, password_hash: String) -> DaoResult<()> {
        self.update(id, move |active| {
            active.password_hash = Set(password_hash);
        })
        .await
        .map(|_| ())
    }

    pub async fn deactivate(&self, id: Uuid) -> DaoResult<user::Model> {
        self.update(id, |active| {
            active.is_active = Set(false);
        })
        .await
    }

    pub async fn set_last_login(
        &self,
        id: Uuid,
        at: chrono::DateTime<chrono::FixedOffset>,
    ) -> DaoResult<()> {
        self.update(id, move |active| {
            active.last_login_at = Set(Some(at));
        })
        .await
        .map(|_| ())
    }

    pub async fn count_active(&self) -> DaoResult<u64> {
        self.count(|query| query.filter(user::Column::IsActive.eq(true)))
            .await
    }
}
