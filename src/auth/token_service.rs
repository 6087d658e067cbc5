use crate::{
    auth::{
        Claims, TokenBundle,
        jwt::{JwtKeys, decode_token, encode_token, make_access_claims},
    },
    config::AuthConfig,
    db::dao::{DaoBase, RefreshTokenDao, UserDao},
    db::entities::user,
    error::AppError,
};

/// Issues and verifies HS256 access tokens and manages persisted refresh tokens.
#[derive(Clone)]
pub struct TokenService {
    users: UserDao,
    refresh_tokens: RefreshTokenDao,
    jwt: JwtKeys,
    access_ttl_secs: i64,
    refresh_ttl_days: i64,
}

impl TokenService {
    pub fn new(
        users: UserDao,
        refresh_tokens: RefreshTokenDao,
        jwt: JwtKeys,
        cfg: &AuthConfig,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            jwt,
            access_ttl_secs: cfg.access_ttl_secs,
            refresh_ttl_days: cfg.refresh_ttl_days,
        }
    }

    pub async fn issue(&self, user: &user::Model) -> Result<TokenBundle, AppError> {
        let claims = make_access_claims(user, self.access_ttl_secs as usize);
        let access_token = encode_token(&self.jwt, &claims)?;

        let refresh = self
            .refresh_tokens
            .create_refresh_token(user.id, self.refresh_ttl_days)
            .await?;

        Ok(TokenBundle {
            access_token,
            refresh_token: refresh.token,
            token_type: "Bearer",
            expires_in: self.access_ttl_secs,
        })
    }

    /// Swaps a live refresh token for a new token pair; the presented token is revoked.
    pub async fn rotate(&self, refresh_token: &str) -> Result<(user::Model, TokenBundle), AppError> {
        let token = self
            .refresh_tokens
            .find_active_by_token(refresh_token)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid or expired refresh token"))?;

        let user = self
            .users
            .find_by_id(token.user_id)
            .await
            .map_err(|_| AppError::unauthorized("Invalid or expired refresh token"))?;
        if !user.is_active {
            return Err(AppError::unauthorized("Account is deactivated"));
        }

        self.refresh_tokens.revoke_token(refresh_token).await?;
        let bundle = self.issue(&user).await?;
        Ok((user, bundle))
    }

    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        self.refresh_tokens.revoke_token(refresh_token).await?;
        Ok(())
    }

    pub async fn revoke_all(&self, user_id: uuid::Uuid) -> Result<u64, AppError> {
        Ok(self.refresh_tokens.revoke_all_for_user(user_id).await?)
    }

    pub fn verify(&self, access_token: &str) -> Result<Claims, AppError> {
        decode_token(&self.jwt, access_token)
    }
}
