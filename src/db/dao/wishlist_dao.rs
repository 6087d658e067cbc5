use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::cart_dao::{CartLineWrite, write_line};
use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::prelude::{FoodItem, Wishlist, WishlistItem};
use crate::db::entities::{cart_item, food_item, wishlist, wishlist_item};

#[derive(Clone)]
pub struct WishlistDao {
    db: DatabaseConnection,
}

impl DaoBase for WishlistDao {
    type Entity = Wishlist;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Clone)]
struct WishlistItemDao {
    db: DatabaseConnection,
}

impl DaoBase for WishlistItemDao {
    type Entity = WishlistItem;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

pub type WishlistLine = (wishlist_item::Model, Option<food_item::Model>);

impl WishlistDao {
    fn item_dao(&self) -> WishlistItemDao {
        WishlistItemDao::new(&self.db)
    }

    pub async fn find_for_user(&self, user_id: Uuid) -> DaoResult<Option<wishlist::Model>> {
        self.find_one(move |query| query.filter(wishlist::Column::UserId.eq(user_id)))
            .await
    }

    /// Wishlists are created on first access.
    pub async fn find_or_create_for_user(&self, user_id: Uuid) -> DaoResult<wishlist::Model> {
        if let Some(wishlist) = self.find_for_user(user_id).await? {
            return Ok(wishlist);
        }
        let created = self
            .create(wishlist::ActiveModel {
                user_id: Set(user_id),
                ..Default::default()
            })
            .await;
        match created {
            Ok(wishlist) => Ok(wishlist),
            // The unique user_id lost a race with another first access.
            Err(err) => self.find_for_user(user_id).await?.ok_or(err),
        }
    }

    pub async fn lines(&self, wishlist_id: Uuid) -> DaoResult<Vec<WishlistLine>> {
        WishlistItem::find()
            .filter(wishlist_item::Column::WishlistId.eq(wishlist_id))
            .find_also_related(FoodItem)
            .order_by_asc(wishlist_item::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn find_entry_for_food_item(
        &self,
        wishlist_id: Uuid,
        food_item_id: Uuid,
    ) -> DaoResult<Option<wishlist_item::Model>> {
        self.item_dao()
            .find_one(move |query| {
                query
                    .filter(wishlist_item::Column::WishlistId.eq(wishlist_id))
                    .filter(wishlist_item::Column::FoodItemId.eq(food_item_id))
            })
            .await
    }

    pub async fn find_entry(
        &self,
        wishlist_id: Uuid,
        item_id: Uuid,
    ) -> DaoResult<wishlist_item::Model> {
        self.item_dao()
            .find_one(move |query| {
                query
                    .filter(wishlist_item::Column::Id.eq(item_id))
                    .filter(wishlist_item::Column::WishlistId.eq(wishlist_id))
            })
            .await?
            .ok_or(DaoLayerError::NotFound {
                entity: "wishlist_items",
                id: item_id,
            })
    }

    pub async fn add_entry(
        &self,
        wishlist_id: Uuid,
        food_item_id: Uuid,
    ) -> DaoResult<wishlist_item::Model> {
        self.item_dao()
            .create(wishlist_item::ActiveModel {
                wishlist_id: Set(wishlist_id),
                food_item_id: Set(food_item_id),
                ..Default::default()
            })
            .await
    }

    pub async fn remove_entry(&self, wishlist_id: Uuid, item_id: Uuid) -> DaoResult<()> {
        let result = WishlistItem::delete_many()
            .filter(wishlist_item::Column::Id.eq(item_id))
            .filter(wishlist_item::Column::WishlistId.eq(wishlist_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFound {
                entity: "wishlist_items",
                id: item_id,
            });
        }
        Ok(())
    }

    /// Writes the planned cart lines and drops the moved wishlist entries together.
    pub async fn move_to_cart(
        &self,
        cart_id: Uuid,
        writes: Vec<CartLineWrite>,
        moved_entries: Vec<Uuid>,
    ) -> DaoResult<Vec<cart_item::Model>> {
        let txn = self.db.begin().await?;
        let mut lines = Vec::with_capacity(writes.len());
        for write in writes {
            lines.push(write_line(&txn, cart_id, write).await?);
        }
        if !moved_entries.is_empty() {
            WishlistItem::delete_many()
                .filter(wishlist_item::Column::Id.is_in(moved_entries))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(lines)
    }
}
