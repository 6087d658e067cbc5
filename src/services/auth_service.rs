use crate::{
    auth::{
        Role, TokenBundle, TokenService,
        password::{hash_password, verify_password},
    },
    config::AuthConfig,
    db::dao::UserDao,
    db::entities::user,
    error::AppError,
    services::crud_service::{CrudErrors, CrudOp, CrudService},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserDao,
    tokens: TokenService,
}

impl CrudService for AuthService {
    fn errors(&self) -> CrudErrors {
        CrudErrors {
            create_failed: "Registration failed",
            find_failed: "User lookup failed",
            not_found: "User not found",
            update_failed: "User update failed",
            ..CrudErrors::default()
        }
    }
}

pub(crate) fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::bad_request("A valid email address is required"));
    }
    Ok(email)
}

impl AuthService {
    pub fn new(users: UserDao, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// New accounts always get the customer role.
    pub async fn register(&self, input: Registration) -> Result<user::Model, AppError> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(AppError::bad_request("Username required"));
        }
        let email = validate_email(&input.email)?;

        let existing = self
            .users
            .find_active_by_email(&email)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        if existing.is_some() {
            return Err(AppError::conflict("Email is already registered"));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .users
            .create_user(
                username,
                input.phone.filter(|phone| !phone.trim().is_empty()),
                &email,
                &password_hash,
                Role::Customer.as_str(),
            )
            .await
            .map_err(|err| self.map_error(CrudOp::Create, err))?;
        tracing::info!(user_id = %user.id, "registered user");
        Ok(user)
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(user::Model, TokenBundle), AppError> {
        let user = self
            .users
            .find_active_by_email(email)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(password, &user.password_hash) {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let tokens = self.tokens.issue(&user).await?;
        let now = chrono::Utc::now().fixed_offset();
        self.users
            .set_last_login(user.id, now)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))?;
        Ok((user, tokens))
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, AppError> {
        let (_, tokens) = self.tokens.rotate(refresh_token).await?;
        Ok(tokens)
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        self.tokens.revoke(refresh_token).await
    }

    /// Creates the configured admin account unless an active user already owns the email.
    pub async fn seed_admin(&self, cfg: &AuthConfig) -> anyhow::Result<()> {
        let existing = self
            .users
            .find_active_by_email(&cfg.admin_email)
            .await
            .map_err(|err| anyhow::anyhow!("admin lookup failed: {err}"))?;
        if let Some(existing) = existing {
            tracing::info!("admin user already present: {}", existing.email);
            return Ok(());
        }

        let hash = hash_password(&cfg.admin_password)
            .map_err(|err| anyhow::anyhow!("admin seed hash error: {err}"))?;
        let user = self
            .users
            .create_user("admin", None, &cfg.admin_email, &hash, Role::Admin.as_str())
            .await
            .map_err(|err| anyhow::anyhow!("admin seed failed: {err}"))?;
        tracing::info!("seeded admin user {}", user.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::{AuthService, Registration, validate_email};
    use crate::{
        auth::{jwt::JwtKeys, password::hash_password},
        db::entities::{refresh_token, user},
        error::AppError,
        services::ServiceContext,
        test_helpers::{refresh_token_model, test_auth_config, user_model},
    };

    fn service(mock: MockDatabase) -> AuthService {
        let db = mock.into_connection();
        ServiceContext::new(&db).auth(&JwtKeys::from_secret(b"test-secret"), &test_auth_config())
    }

    fn registration(email: &str) -> Registration {
        Registration {
            username: "alice".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            phone: None,
        }
    }

    #[test]
    fn email_validation_normalizes_case() {
        assert_eq!(
            validate_email("  Alice@Example.COM ").expect("valid email"),
            "alice@example.com"
        );
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[tokio::test]
    async fn register_rejects_duplicate_active_email() {
        let existing = user_model(Uuid::new_v4(), "alice@example.com", "Customer");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let err = service
            .register(registration("alice@example.com"))
            .await
            .expect_err("duplicate email should be rejected");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn register_creates_customer() {
        let created = user_model(Uuid::new_v4(), "bob@example.com", "Customer");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new(), vec![created.clone()]]),
        );

        let user = service
            .register(registration("bob@example.com"))
            .await
            .expect("registration should succeed");
        assert_eq!(user.email, "bob@example.com");
        assert_eq!(user.role, "Customer");
    }

    #[tokio::test]
    async fn register_rejects_short_password_before_writing() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let mut input = registration("carol@example.com");
        input.password = "short".to_string();
        let err = service.register(input).await.expect_err("should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let mut user = user_model(Uuid::new_v4(), "alice@example.com", "Customer");
        user.password_hash = hash_password("password123").expect("hash");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]),
        );

        let err = service
            .login("alice@example.com", "not-the-password")
            .await
            .expect_err("login should fail");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn login_for_unknown_or_inactive_email_is_unauthorized() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let err = service
            .login("ghost@example.com", "password123")
            .await
            .expect_err("login should fail");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn login_issues_tokens_and_records_last_login() {
        let mut user = user_model(Uuid::new_v4(), "alice@example.com", "Customer");
        user.password_hash = hash_password("password123").expect("hash");
        let refresh: refresh_token::Model = refresh_token_model("refresh-1", user.id);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_results([[refresh]])
                .append_query_results([[user.clone()], [user.clone()]]),
        );

        let (logged_in, tokens) = service
            .login("alice@example.com", "password123")
            .await
            .expect("login should succeed");
        assert_eq!(logged_in.id, user.id);
        assert_eq!(tokens.refresh_token, "refresh-1");
        assert_eq!(tokens.token_type, "Bearer");
    }
}
