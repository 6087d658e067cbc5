use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Admin => "Admin",
        }
    }

    /// Admins may do anything a customer can.
    pub fn satisfies(&self, required: Role) -> bool {
        *self == Role::Admin || *self == required
    }

    /// Unknown stored values fall back to the least privileged role.
    pub fn from_stored(value: &str) -> Self {
        Role::try_from(value).unwrap_or(Role::Customer)
    }
}

impl TryFrom<&str> for Role {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Customer" => Ok(Role::Customer),
            "Admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

pub trait RequiredRole {
    fn required() -> Role;
}

pub struct CustomerRole;

impl RequiredRole for CustomerRole {
    fn required() -> Role {
        Role::Customer
    }
}

pub struct AdminRole;

impl RequiredRole for AdminRole {
    fn required() -> Role {
        Role::Admin
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn ensure_owner(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.sub == owner_id {
            return Ok(());
        }
        Err(AppError::forbidden("You do not have access to this resource"))
    }

    pub fn ensure_owner_or_admin(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.is_admin() {
            return Ok(());
        }
        self.ensure_owner(owner_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}
