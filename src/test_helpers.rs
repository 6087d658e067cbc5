//! Fixtures shared by unit tests and the router tests under `tests/`.

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseBackend, MockDatabase};
use uuid::Uuid;

use crate::{
    auth::{
        Claims, Role,
        jwt::{JwtKeys, encode_token, now_unix},
    },
    config::{AppConfig, AuthConfig},
    db::entities::{
        address, cart, cart_item, category, food_item, order, order_item, refresh_token, review,
        user, wishlist,
    },
    routes::router,
    state::AppState,
};

pub const TEST_SECRET: &str = "test-secret";

/// Fixed timestamp so fixtures compare equal across calls.
pub fn ts() -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
        .fixed_offset()
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        admin_email: "admin@example.com".to_string(),
        admin_password: "adminpassword".to_string(),
        access_ttl_secs: 3600,
        refresh_ttl_days: 30,
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        auth: Some(test_auth_config()),
        ..AppConfig::default()
    }
}

pub fn test_state(mock: MockDatabase) -> Arc<AppState> {
    AppState::new(test_config(), mock.into_connection()).expect("test state")
}

/// Full application router over a mock database with the given queued results.
pub fn test_router(mock: MockDatabase) -> Router {
    router(test_state(mock))
}

pub fn empty_router() -> Router {
    test_router(MockDatabase::new(DatabaseBackend::Postgres))
}

pub fn claims_for(id: Uuid, role: Role) -> Claims {
    let iat = now_unix();
    Claims {
        sub: id,
        name: format!("user-{}", &id.simple().to_string()[..8]),
        email: format!("{}@example.com", id.simple()),
        role,
        iat,
        exp: iat + 3600,
    }
}

/// `Authorization` header value carrying an access token signed with [`TEST_SECRET`].
pub fn bearer_for(id: Uuid, role: Role) -> String {
    let keys = JwtKeys::from_secret(TEST_SECRET.as_bytes());
    let token = encode_token(&keys, &claims_for(id, role)).expect("token encodes");
    format!("Bearer {token}")
}

pub fn user_model(id: Uuid, email: &str, role: &str) -> user::Model {
    user::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        username: email.split('@').next().unwrap_or(email).to_string(),
        phone: None,
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        role: role.to_string(),
        is_active: true,
        last_login_at: None,
    }
}

pub fn refresh_token_model(token: &str, user_id: Uuid) -> refresh_token::Model {
    refresh_token::Model {
        id: Uuid::new_v4(),
        created_at: ts(),
        updated_at: ts(),
        token: token.to_string(),
        user_id,
        expires_at: ts() + Duration::days(30),
        revoked: false,
    }
}

pub fn category_model(id: Uuid, name: &str) -> category::Model {
    category::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        name: name.to_string(),
        icon_url: None,
    }
}

pub fn food_item_model(id: Uuid, category_id: Uuid, price: Decimal, stock: i32) -> food_item::Model {
    food_item::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        name: format!("Dish {}", &id.simple().to_string()[..6]),
        description: "House special".to_string(),
        category_id,
        price,
        image_url: None,
        stock_quantity: stock,
    }
}

pub fn cart_model(id: Uuid, user_id: Uuid) -> cart::Model {
    cart::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        user_id,
    }
}

pub fn cart_item_model(id: Uuid, cart_id: Uuid, food_item_id: Uuid, quantity: i32) -> cart_item::Model {
    cart_item::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        cart_id,
        food_item_id,
        quantity,
    }
}

pub fn order_model(id: Uuid, user_id: Uuid, total: Decimal, status: &str) -> order::Model {
    order::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        user_id,
        total,
        status: status.to_string(),
        shipping_address: "1 Main St, Springfield, IL 62701".to_string(),
    }
}

pub fn order_item_model(
    order_id: Uuid,
    food_item_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
) -> order_item::Model {
    order_item::Model {
        id: Uuid::new_v4(),
        created_at: ts(),
        updated_at: ts(),
        order_id,
        food_item_id,
        quantity,
        unit_price,
    }
}

pub fn address_model(id: Uuid, user_id: Uuid, is_default: bool) -> address::Model {
    address::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        user_id,
        street: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip_code: "62701".to_string(),
        is_default,
    }
}

pub fn review_model(id: Uuid, user_id: Uuid, food_item_id: Uuid, rating: i32) -> review::Model {
    review::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        food_item_id,
        user_id,
        rating,
        comment: Some("Tasty".to_string()),
    }
}

pub fn wishlist_model(id: Uuid, user_id: Uuid) -> wishlist::Model {
    wishlist::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        user_id,
    }
}
