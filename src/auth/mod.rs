pub mod jwt;
pub mod password;
pub mod token_service;
mod types;

pub use token_service::TokenService;
pub use types::{AdminRole, Claims, CustomerRole, RequiredRole, Role, TokenBundle};
