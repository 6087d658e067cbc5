pub mod address_dao;
pub mod base;
pub mod base_traits;
pub mod cart_dao;
pub mod category_dao;
mod context;
pub mod error;
pub mod food_item_dao;
pub mod order_dao;
pub mod refresh_token_dao;
pub mod report_dao;
pub mod review_dao;
pub mod user_dao;
pub mod wishlist_dao;

pub use address_dao::{AddressChanges, AddressDao, NewAddress};
pub use base::{DaoBase, PaginatedResponse};
pub use base_traits::{HasCreatedAtColumn, HasIdActiveModel, HasOwnerColumn, TimestampedActiveModel};
pub use cart_dao::{CartDao, CartLine, CartLineWrite};
pub use category_dao::CategoryDao;
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use food_item_dao::{FoodItemChanges, FoodItemDao, FoodItemFilter, NewFoodItem};
pub use order_dao::{NewOrder, OrderDao, OrderItemLine, OrderLine};
pub use refresh_token_dao::RefreshTokenDao;
pub use report_dao::{BillableTotals, ProductSales, ReportDao, StatusCount};
pub use review_dao::ReviewDao;
pub use user_dao::{UserChanges, UserDao};
pub use wishlist_dao::{WishlistDao, WishlistLine};
