use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::{Claims, Role};
use crate::db::entities::user;
use crate::error::AppError;

#[derive(Clone)]
pub struct JwtKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            enc: EncodingKey::from_secret(secret),
            dec: DecodingKey::from_secret(secret),
        }
    }
}

pub fn now_unix() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as usize)
        .unwrap_or_default()
}

pub fn encode_token(keys: &JwtKeys, claims: &Claims) -> Result<String, AppError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".into());

    encode(&header, claims, &keys.enc)
        .map_err(|err| AppError::internal_with_source("Token encoding failed", err))
}

pub fn decode_token(keys: &JwtKeys, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &keys.dec, &validation)?;
    Ok(data.claims)
}

/// Builds access-token claims for a stored user; the role comes from the row.
pub fn make_access_claims(user: &user::Model, ttl_secs: usize) -> Claims {
    let iat = now_unix();
    Claims {
        sub: user.id,
        name: user.username.clone(),
        email: user.email.clone(),
        role: Role::from_stored(&user.role),
        iat,
        exp: iat + ttl_secs,
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{JwtKeys, Role, decode_token, encode_token, make_access_claims};
    use crate::error::AppError;
    use crate::test_helpers::user_model;

    #[test]
    fn makes_claims_from_the_user_row() {
        let user = user_model(Uuid::new_v4(), "alice@example.com", "Admin");
        let claims = make_access_claims(&user, 60);

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.name, user.username);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp.saturating_sub(claims.iat), 60);
    }

    #[test]
    fn encoded_token_decodes_with_same_secret() {
        let keys = JwtKeys::from_secret(b"unit-test-secret");
        let user = user_model(Uuid::new_v4(), "bob@example.com", "Customer");
        let claims = make_access_claims(&user, 600);
        let token = encode_token(&keys, &claims).expect("token should encode");

        let decoded = decode_token(&keys, &token).expect("token should decode");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let user = user_model(Uuid::new_v4(), "eve@example.com", "Customer");
        let claims = make_access_claims(&user, 600);
        let token = encode_token(&JwtKeys::from_secret(b"other-secret"), &claims)
            .expect("token should encode");

        let err = decode_token(&JwtKeys::from_secret(b"unit-test-secret"), &token)
            .expect_err("signature should not verify");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JwtKeys::from_secret(b"unit-test-secret");
        let user = user_model(Uuid::new_v4(), "old@example.com", "Customer");
        let mut claims = make_access_claims(&user, 60);
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = encode_token(&keys, &claims).expect("token should encode");

        let err = decode_token(&keys, &token).expect_err("token should be expired");
        assert!(err.message().starts_with("Invalid or expired token:"));
    }
}
