use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::dao::{CartDao, CartLineWrite, DaoBase, FoodItemDao, WishlistDao, WishlistLine},
    db::entities::{cart, cart_item, food_item, wishlist},
    error::AppError,
    services::{
        cart_service::{CartView, ensure_stock, merge_quantity, written_quantity},
        crud_service::{CrudErrors, CrudOp, CrudService},
    },
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WishlistEntryView {
    pub id: Uuid,
    pub food_item_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub in_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WishlistView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<WishlistEntryView>,
}

impl WishlistView {
    pub fn build(wishlist: wishlist::Model, lines: Vec<WishlistLine>) -> Self {
        let items = lines
            .into_iter()
            .filter_map(|(entry, food)| {
                food.map(|food| WishlistEntryView {
                    id: entry.id,
                    food_item_id: food.id,
                    in_stock: food.stock_quantity > 0,
                    name: food.name,
                    price: food.price,
                    image_url: food.image_url,
                })
            })
            .collect();
        Self {
            id: wishlist.id,
            user_id: wishlist.user_id,
            items,
        }
    }
}

/// A moved wishlist entry adds one unit to the cart, merging with an existing line.
pub fn plan_move(
    food: &food_item::Model,
    cart_lines: &[cart_item::Model],
) -> Result<CartLineWrite, AppError> {
    let existing = cart_lines
        .iter()
        .find(|line| line.food_item_id == food.id);
    let write = merge_quantity(existing, food.id, 1);
    ensure_stock(food, written_quantity(&write))?;
    Ok(write)
}

#[derive(Clone)]
pub struct WishlistService {
    wishlists: WishlistDao,
    carts: CartDao,
    food_items: FoodItemDao,
}

impl CrudService for WishlistService {
    fn errors(&self) -> CrudErrors {
        CrudErrors {
            create_failed: "Wishlist update failed",
            find_failed: "Wishlist lookup failed",
            not_found: "Wishlist item not found",
            update_failed: "Wishlist update failed",
            delete_failed: "Wishlist update failed",
        }
    }
}

impl WishlistService {
    pub fn new(wishlists: WishlistDao, carts: CartDao, food_items: FoodItemDao) -> Self {
        Self {
            wishlists,
            carts,
            food_items,
        }
    }

    async fn wishlist_for(&self, user_id: Uuid) -> Result<wishlist::Model, AppError> {
        self.wishlists
            .find_or_create_for_user(user_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))
    }

    async fn view_of(&self, wishlist: wishlist::Model) -> Result<WishlistView, AppError> {
        let lines = self
            .wishlists
            .lines(wishlist.id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        Ok(WishlistView::build(wishlist, lines))
    }

    pub async fn view(&self, user_id: Uuid) -> Result<WishlistView, AppError> {
        let wishlist = self.wishlist_for(user_id).await?;
        self.view_of(wishlist).await
    }

    pub async fn add(&self, user_id: Uuid, food_item_id: Uuid) -> Result<WishlistView, AppError> {
        self.food_items
            .find_by_id(food_item_id)
            .await
            .map_err(AppError::from)?;
        let wishlist = self.wishlist_for(user_id).await?;
        let existing = self
            .wishlists
            .find_entry_for_food_item(wishlist.id, food_item_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        if existing.is_some() {
            return Err(AppError::conflict("Food item is already in the wishlist"));
        }

        self.wishlists
            .add_entry(wishlist.id, food_item_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Create, err))?;
        self.view_of(wishlist).await
    }

    pub async fn remove(&self, user_id: Uuid, item_id: Uuid) -> Result<WishlistView, AppError> {
        let wishlist = self.wishlist_for(user_id).await?;
        self.wishlists
            .remove_entry(wishlist.id, item_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Delete, err))?;
        self.view_of(wishlist).await
    }

    async fn cart_lines(&self, user_id: Uuid) -> Result<(cart::Model, Vec<cart_item::Model>), AppError> {
        let cart = self
            .carts
            .find_or_create_for_user(user_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        let lines = self
            .carts
            .lines(cart.id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        Ok((cart, lines.into_iter().map(|(line, _)| line).collect()))
    }

    async fn apply_moves(
        &self,
        cart: cart::Model,
        writes: Vec<CartLineWrite>,
        moved: Vec<Uuid>,
    ) -> Result<CartView, AppError> {
        self.wishlists
            .move_to_cart(cart.id, writes, moved)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))?;
        let lines = self
            .carts
            .lines(cart.id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        Ok(CartView::build(cart, lines))
    }

    /// Moves one entry into the cart and drops it from the wishlist.
    pub async fn move_one(&self, user_id: Uuid, item_id: Uuid) -> Result<CartView, AppError> {
        let wishlist = self.wishlist_for(user_id).await?;
        let entry = self
            .wishlists
            .find_entry(wishlist.id, item_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        let food = self
            .food_items
            .find_by_id(entry.food_item_id)
            .await
            .map_err(AppError::from)?;
        let (cart, cart_lines) = self.cart_lines(user_id).await?;

        let write = plan_move(&food, &cart_lines)?;
        self.apply_moves(cart, vec![write], vec![entry.id]).await
    }

    /// Moves every entry that has stock; the rest stay on the wishlist.
    pub async fn move_all(&self, user_id: Uuid) -> Result<CartView, AppError> {
        let wishlist = self.wishlist_for(user_id).await?;
        let entries = self
            .wishlists
            .lines(wishlist.id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        let (cart, mut cart_lines) = self.cart_lines(user_id).await?;

        let mut writes = Vec::new();
        let mut moved = Vec::new();
        for (entry, food) in entries {
            let Some(food) = food else { continue };
            match plan_move(&food, &cart_lines) {
                Ok(write) => {
                    if let CartLineWrite::SetQuantity { cart_item_id, quantity } = write {
                        if let Some(line) = cart_lines.iter_mut().find(|line| line.id == cart_item_id) {
                            line.quantity = quantity;
                        }
                    }
                    writes.push(write);
                    moved.push(entry.id);
                }
                Err(_) => {
                    tracing::debug!(food_item_id = %food.id, "wishlist entry left behind: out of stock");
                }
            }
        }
        tracing::info!(%user_id, moved = moved.len(), "wishlist moved to cart");
        self.apply_moves(cart, writes, moved).await
    }
}
