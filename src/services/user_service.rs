use uuid::Uuid;

use crate::{
    auth::password::{hash_password, verify_password},
    db::dao::{DaoBase, PaginatedResponse, RefreshTokenDao, UserChanges, UserDao},
    db::entities::user,
    error::AppError,
    services::{
        auth_service::validate_email,
        crud_service::{CrudErrors, CrudOp, CrudService},
    },
};

#[derive(Clone)]
pub struct UserService {
    users: UserDao,
    refresh_tokens: RefreshTokenDao,
}

impl CrudService for UserService {
    fn errors(&self) -> CrudErrors {
        CrudErrors {
            find_failed: "User lookup failed",
            not_found: "User not found",
            update_failed: "User update failed",
            delete_failed: "User deactivation failed",
            ..CrudErrors::default()
        }
    }
}

impl UserService {
    pub fn new(users: UserDao, refresh_tokens: RefreshTokenDao) -> Self {
        Self {
            users,
            refresh_tokens,
        }
    }

    pub async fn list(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<PaginatedResponse<user::Model>, AppError> {
        self.users
            .list_users(page, page_size)
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    pub async fn get(&self, id: Uuid) -> Result<user::Model, AppError> {
        self.users
            .find_by_id(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))
    }

    /// Partial profile update. A new email must not belong to another active account.
    pub async fn update_profile(
        &self,
        id: Uuid,
        mut changes: UserChanges,
    ) -> Result<user::Model, AppError> {
        if let Some(username) = changes.username.as_deref() {
            if username.trim().is_empty() {
                return Err(AppError::bad_request("Username must not be empty"));
            }
        }
        if let Some(email) = changes.email.take() {
            let email = validate_email(&email)?;
            let owner = self
                .users
                .find_active_by_email(&email)
                .await
                .map_err(|err| self.map_error(CrudOp::Find, err))?;
            if owner.is_some_and(|owner| owner.id != id) {
                return Err(AppError::conflict("Email is already registered"));
            }
            changes.email = Some(email);
        }

        self.users
            .update_profile(id, changes)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))
    }

    /// Replaces the password after checking the current one; every refresh token is revoked.
    pub async fn change_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self.get(id).await?;
        if !verify_password(current_password, &user.password_hash) {
            return Err(AppError::bad_request("Current password is incorrect"));
        }

        let hash = hash_password(new_password)?;
        self.users
            .set_password_hash(id, hash)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))?;
        let revoked = self
            .refresh_tokens
            .revoke_all_for_user(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))?;
        tracing::info!(user_id = %id, revoked, "password changed");
        Ok(())
    }

    /// Soft delete: the row stays for order history, sign-in is disabled.
    pub async fn deactivate(&self, id: Uuid) -> Result<user::Model, AppError> {
        let user = self
            .users
            .deactivate(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Delete, err))?;
        self.refresh_tokens
            .revoke_all_for_user(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Delete, err))?;
        tracing::info!(user_id = %id, "user deactivated");
        Ok(user)
    }
}
