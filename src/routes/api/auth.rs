use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};

use crate::{
    auth::TokenBundle,
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, auth_service::Registration},
    state::AppState,
};

use super::users::UserProfile;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenBundle,
    pub user: UserProfile,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<UserProfile> {
    let services = ServiceContext::from_state(state.as_ref());
    let service = services.auth(&state.jwt, &state.auth);
    let user = service
        .register(Registration {
            username: body.username,
            email: body.email,
            password: body.password,
            phone: body.phone,
        })
        .await?;
    JsonApiResponse::created(user.into())
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let services = ServiceContext::from_state(state.as_ref());
    let service = services.auth(&state.jwt, &state.auth);
    let (user, tokens) = service.login(&body.email, &body.password).await?;
    JsonApiResponse::ok(LoginResponse {
        tokens,
        user: user.into(),
    })
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<TokenBundle> {
    let services = ServiceContext::from_state(state.as_ref());
    let service = services.auth(&state.jwt, &state.auth);
    let tokens = service.refresh(&body.refresh_token).await?;
    JsonApiResponse::ok(tokens)
}

async fn logout(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<()> {
    let services = ServiceContext::from_state(state.as_ref());
    let service = services.auth(&state.jwt, &state.auth);
    service.logout(&body.refresh_token).await?;
    JsonApiResponse::with_status(StatusCode::OK, "logged out", ())
}
