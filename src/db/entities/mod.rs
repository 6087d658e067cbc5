#[allow(unused_imports)]
pub mod prelude {
    pub use super::address::Entity as Address;
    pub use super::cart::Entity as Cart;
    pub use super::cart_item::Entity as CartItem;
    pub use super::category::Entity as Category;
    pub use super::food_item::Entity as FoodItem;
    pub use super::order::Entity as Order;
    pub use super::order_item::Entity as OrderItem;
    pub use super::refresh_token::Entity as RefreshToken;
    pub use super::review::Entity as Review;
    pub use super::user::Entity as User;
    pub use super::wishlist::Entity as Wishlist;
    pub use super::wishlist_item::Entity as WishlistItem;
}

pub mod address;
pub mod cart;
pub mod cart_item;
pub mod category;
pub mod food_item;
pub mod order;
pub mod order_item;
pub mod refresh_token;
pub mod review;
pub mod user;
pub mod wishlist;
pub mod wishlist_item;
