use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base::stamp_new;
use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::prelude::{Cart, CartItem, FoodItem};
use crate::db::entities::{cart, cart_item, food_item};

#[derive(Clone)]
pub struct CartDao {
    db: DatabaseConnection,
}

impl DaoBase for CartDao {
    type Entity = Cart;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Clone)]
struct CartItemDao {
    db: DatabaseConnection,
}

impl DaoBase for CartItemDao {
    type Entity = CartItem;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// A single change to a cart line, decided by the caller after merging quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartLineWrite {
    Insert { food_item_id: Uuid, quantity: i32 },
    SetQuantity { cart_item_id: Uuid, quantity: i32 },
}

pub type CartLine = (cart_item::Model, Option<food_item::Model>);

/// Applies one line write and bumps the cart's `updated_at`. Usable on a plain
/// connection or inside a transaction.
pub(crate) async fn write_line<C: ConnectionTrait>(
    conn: &C,
    cart_id: Uuid,
    write: CartLineWrite,
) -> DaoResult<cart_item::Model> {
    let line = match write {
        CartLineWrite::Insert {
            food_item_id,
            quantity,
        } => {
            let mut active = cart_item::ActiveModel {
                cart_id: Set(cart_id),
                food_item_id: Set(food_item_id),
                quantity: Set(quantity),
                ..Default::default()
            };
            stamp_new(&mut active);
            active.insert(conn).await?
        }
        CartLineWrite::SetQuantity {
            cart_item_id,
            quantity,
        } => {
            cart_item::ActiveModel {
                id: Unchanged(cart_item_id),
                quantity: Set(quantity),
                updated_at: Set(Utc::now().fixed_offset()),
                ..Default::default()
            }
            .update(conn)
            .await?
        }
    };
    touch_cart(conn, cart_id).await?;
    Ok(line)
}

async fn touch_cart<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> DaoResult<()> {
    Cart::update_many()
        .col_expr(cart::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(cart::Column::Id.eq(cart_id))
        .exec(conn)
        .await?;
    Ok(())
}

impl CartDao {
    fn item_dao(&self) -> CartItemDao {
        CartItemDao::new(&self.db)
    }

    pub async fn find_for_user(&self, user_id: Uuid) -> DaoResult<Option<cart::Model>> {
        self.find_one(move |query| query.filter(cart::Column::UserId.eq(user_id)))
            .await
    }

    /// Carts are created on first access.
    pub async fn find_or_create_for_user(&self, user_id: Uuid) -> DaoResult<cart::Model> {
        if let Some(cart) = self.find_for_user(user_id).await? {
            return Ok(cart);
        }
        let created = self
            .create(cart::ActiveModel {
                user_id: Set(user_id),
                ..Default::default()
            })
            .await;
        match created {
            Ok(cart) => Ok(cart),
            // A concurrent request may have created it first.
            Err(err) => self.find_for_user(user_id).await?.ok_or(err),
        }
    }

    pub async fn lines(&self, cart_id: Uuid) -> DaoResult<Vec<CartLine>> {
        CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .find_also_related(FoodItem)
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn find_line_for_food_item(
        &self,
        cart_id: Uuid,
        food_item_id: Uuid,
    ) -> DaoResult<Option<cart_item::Model>> {
        self.item_dao()
            .find_one(move |query| {
                query
                    .filter(cart_item::Column::CartId.eq(cart_id))
                    .filter(cart_item::Column::FoodItemId.eq(food_item_id))
            })
            .await
    }

    pub async fn find_line(
        &self,
        cart_id: Uuid,
        cart_item_id: Uuid,
    ) -> DaoResult<cart_item::Model> {
        self.item_dao()
            .find_one(move |query| {
                query
                    .filter(cart_item::Column::Id.eq(cart_item_id))
                    .filter(cart_item::Column::CartId.eq(cart_id))
            })
            .await?
            .ok_or(DaoLayerError::NotFound {
                entity: "cart_items",
                id: cart_item_id,
            })
    }

    pub async fn write_line(
        &self,
        cart_id: Uuid,
        write: CartLineWrite,
    ) -> DaoResult<cart_item::Model> {
        write_line(&self.db, cart_id, write).await
    }

    pub async fn remove_line(&self, cart_id: Uuid, cart_item_id: Uuid) -> DaoResult<()> {
        let result = CartItem::delete_many()
            .filter(cart_item::Column::Id.eq(cart_item_id))
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFound {
                entity: "cart_items",
                id: cart_item_id,
            });
        }
        touch_cart(&self.db, cart_id).await
    }

    pub async fn clear(&self, cart_id: Uuid) -> DaoResult<u64> {
        clear_lines(&self.db, cart_id).await
    }
}

/// Removes every line of a cart and returns how many were deleted.
pub(crate) async fn clear_lines<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> DaoResult<u64> {
    let result = CartItem::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .exec(conn)
        .await?;
    touch_cart(conn, cart_id).await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::{CartDao, CartLineWrite};
    use crate::db::dao::{DaoBase, DaoLayerError};
    use crate::db::entities::cart;
    use crate::test_helpers::{cart_item_model, cart_model, food_item_model};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn find_or_create_returns_existing_cart() {
        let user_id = Uuid::new_v4();
        let existing = cart_model(Uuid::new_v4(), user_id);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing.clone()]])
            .into_connection();
        let dao = CartDao::new(&db);

        let cart = dao
            .find_or_create_for_user(user_id)
            .await
            .expect("lookup should succeed");
        assert_eq!(cart, existing);
    }

    #[tokio::test]
    async fn find_or_create_inserts_when_missing() {
        let user_id = Uuid::new_v4();
        let created = cart_model(Uuid::new_v4(), user_id);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<cart::Model>::new(), vec![created.clone()]])
            .into_connection();
        let dao = CartDao::new(&db);

        let cart = dao
            .find_or_create_for_user(user_id)
            .await
            .expect("insert should succeed");
        assert_eq!(cart.user_id, user_id);
    }

    #[tokio::test]
    async fn lines_pair_items_with_food() {
        let cart_id = Uuid::new_v4();
        let food = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::new(450, 2), 10);
        let line = cart_item_model(Uuid::new_v4(), cart_id, food.id, 2);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[(line.clone(), food.clone())]])
            .into_connection();
        let dao = CartDao::new(&db);

        let lines = dao.lines(cart_id).await.expect("query should succeed");
        assert_eq!(lines, vec![(line, Some(food))]);
    }

    #[tokio::test]
    async fn write_line_updates_quantity_and_touches_cart() {
        let cart_id = Uuid::new_v4();
        let line = cart_item_model(Uuid::new_v4(), cart_id, Uuid::new_v4(), 5);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[line.clone()]])
            .append_exec_results([exec(1)])
            .into_connection();
        let dao = CartDao::new(&db);

        let updated = dao
            .write_line(
                cart_id,
                CartLineWrite::SetQuantity {
                    cart_item_id: line.id,
                    quantity: 5,
                },
            )
            .await
            .expect("write should succeed");
        assert_eq!(updated.quantity, 5);
    }

    #[tokio::test]
    async fn remove_line_reports_missing_item() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection();
        let dao = CartDao::new(&db);
        let item_id = Uuid::new_v4();

        let err = dao
            .remove_line(Uuid::new_v4(), item_id)
            .await
            .expect_err("nothing to delete");
        assert!(matches!(err, DaoLayerError::NotFound { id, .. } if id == item_id));
    }

    #[tokio::test]
    async fn clear_returns_removed_line_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(3), exec(1)])
            .into_connection();
        let dao = CartDao::new(&db);

        let removed = dao.clear(Uuid::new_v4()).await.expect("clear should succeed");
        assert_eq!(removed, 3);
    }
}
