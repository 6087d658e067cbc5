pub mod address_service;
pub mod auth_service;
pub mod cart_service;
pub mod category_service;
mod context;
pub mod crud_service;
pub mod food_item_service;
pub mod order_service;
pub mod report_service;
pub mod review_service;
pub mod user_service;
pub mod wishlist_service;

pub use context::ServiceContext;
