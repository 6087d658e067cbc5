use std::sync::Arc;

use anyhow::Result;
use sea_orm::DatabaseConnection;

use crate::{
    auth::jwt::JwtKeys,
    config::{AppConfig, AuthConfig},
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub auth: AuthConfig,
    pub db: DatabaseConnection,
    pub jwt: JwtKeys,
}

impl AppState {
    /// Fails when the auth section is missing from `config`.
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Result<Arc<Self>> {
        let auth = config.auth()?.clone();
        let jwt = JwtKeys::from_secret(auth.jwt_secret.as_bytes());
        Ok(Arc::new(Self {
            config,
            auth,
            db,
            jwt,
        }))
    }
}
