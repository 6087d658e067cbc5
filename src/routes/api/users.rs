use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AdminRole,
    db::{
        dao::{PaginatedResponse, UserChanges},
        entities::user,
    },
    middleware::{AuthGuard, AuthRoleGuard},
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

use super::PageQuery;

/// Public view of an account; the password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<user::Model> for UserProfile {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            role: user.role,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/me", get(me))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/password", put(change_password))
        .with_state(state)
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Query(paging): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<UserProfile>> {
    let (page, page_size) = paging.resolve(&state.config.store);
    let service = ServiceContext::from_state(state.as_ref()).user();
    let users = service.list(page, page_size).await?;
    JsonApiResponse::ok(users.map(UserProfile::from))
}

async fn me(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<UserProfile> {
    let service = ServiceContext::from_state(state.as_ref()).user();
    let user = service.get(claims.user_id()).await?;
    JsonApiResponse::ok(user.into())
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<UserProfile> {
    claims.ensure_owner_or_admin(id)?;
    let service = ServiceContext::from_state(state.as_ref()).user();
    let user = service.get(id).await?;
    JsonApiResponse::ok(user.into())
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<UserProfile> {
    claims.ensure_owner_or_admin(id)?;
    let service = ServiceContext::from_state(state.as_ref()).user();
    let user = service
        .update_profile(
            id,
            UserChanges {
                username: body.username,
                phone: body.phone,
                email: body.email,
            },
        )
        .await?;
    JsonApiResponse::ok(user.into())
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult<()> {
    claims.ensure_owner(id)?;
    let service = ServiceContext::from_state(state.as_ref()).user();
    service
        .change_password(id, &body.current_password, &body.new_password)
        .await?;
    JsonApiResponse::ok(())
}

/// Soft delete: the row stays, the account can no longer sign in.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<UserProfile> {
    claims.ensure_owner_or_admin(id)?;
    let service = ServiceContext::from_state(state.as_ref()).user();
    let user = service.deactivate(id).await?;
    JsonApiResponse::ok(user.into())
}
