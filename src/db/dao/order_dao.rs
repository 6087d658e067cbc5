use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::base::stamp_new;
use super::cart_dao::clear_lines;
use super::{DaoBase, DaoLayerError, DaoResult, PaginatedResponse};
use crate::db::entities::prelude::{FoodItem, Order, OrderItem};
use crate::db::entities::{food_item, order, order_item};

#[derive(Clone)]
pub struct OrderDao {
    db: DatabaseConnection,
}

impl DaoBase for OrderDao {
    type Entity = order::Entity;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub food_item_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub cart_id: Uuid,
    pub shipping_address: String,
    pub status: String,
    pub total: Decimal,
    pub lines: Vec<OrderLine>,
}

pub type OrderItemLine = (order_item::Model, Option<food_item::Model>);

/// Moves `delta` units in or out of stock. Withdrawals only succeed while enough
/// units remain, so concurrent checkouts cannot drive stock negative.
async fn adjust_stock<C: ConnectionTrait>(conn: &C, food_item_id: Uuid, delta: i32) -> DaoResult<()> {
    let mut update = FoodItem::update_many()
        .col_expr(
            food_item::Column::StockQuantity,
            Expr::col(food_item::Column::StockQuantity).add(delta),
        )
        .col_expr(
            food_item::Column::UpdatedAt,
            Expr::value(Utc::now().fixed_offset()),
        )
        .filter(food_item::Column::Id.eq(food_item_id));
    if delta < 0 {
        update = update.filter(food_item::Column::StockQuantity.gte(-delta));
    }
    let result = update.exec(conn).await?;
    if result.rows_affected == 0 {
        return Err(DaoLayerError::InsufficientStock { food_item_id });
    }
    Ok(())
}

/// Moves the order from `from` to `to` only while it still has status `from`.
async fn transition<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    from: &str,
    to: &str,
) -> DaoResult<order::Model> {
    let result = Order::update_many()
        .col_expr(order::Column::Status, Expr::value(to.to_string()))
        .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::Status.eq(from))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(DaoLayerError::StatusChanged {
            id: order_id,
            expected: from.to_string(),
        });
    }
    Order::find_by_id(order_id)
        .one(conn)
        .await?
        .ok_or(DaoLayerError::NotFound {
            entity: "orders",
            id: order_id,
        })
}

impl OrderDao {
    /// Writes the order and its lines, withdraws stock and empties the cart in one
    /// transaction. Nothing is persisted if any line runs out of stock.
    pub async fn place_order(
        &self,
        data: NewOrder,
    ) -> DaoResult<(order::Model, Vec<order_item::Model>)> {
        let txn = self.db.begin().await?;

        let mut active = order::ActiveModel {
            user_id: Set(data.user_id),
            total: Set(data.total),
            status: Set(data.status),
            shipping_address: Set(data.shipping_address),
            ..Default::default()
        };
        stamp_new(&mut active);
        let order = active.insert(&txn).await?;

        let mut items = Vec::with_capacity(data.lines.len());
        for line in data.lines {
            adjust_stock(&txn, line.food_item_id, -line.quantity).await?;
            let mut item = order_item::ActiveModel {
                order_id: Set(order.id),
                food_item_id: Set(line.food_item_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                ..Default::default()
            };
            stamp_new(&mut item);
            items.push(item.insert(&txn).await?);
        }

        clear_lines(&txn, data.cart_id).await?;
        txn.commit().await?;
        Ok((order, items))
    }

    /// Marks the order cancelled and puts its units back into stock. The order must
    /// still be in status `from`, so a second cancel cannot restock twice.
    pub async fn cancel_order(
        &self,
        order_id: Uuid,
        from: &str,
        cancelled: &str,
        items: &[order_item::Model],
    ) -> DaoResult<order::Model> {
        let txn = self.db.begin().await?;
        let order = transition(&txn, order_id, from, cancelled).await?;
        for item in items {
            adjust_stock(&txn, item.food_item_id, item.quantity).await?;
        }
        txn.commit().await?;
        Ok(order)
    }

    pub async fn set_status(&self, id: Uuid, from: &str, to: &str) -> DaoResult<order::Model> {
        transition(&self.db, id, from, to).await
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: u64,
        page_size: u64,
    ) -> DaoResult<PaginatedResponse<order::Model>> {
        self.find(page, page_size, None, move |query| {
            query.filter(order::Column::UserId.eq(user_id))
        })
        .await
    }

    pub async fn list_all(
        &self,
        page: u64,
        page_size: u64,
        status: Option<String>,
    ) -> DaoResult<PaginatedResponse<order::Model>> {
        self.find(page, page_size, None, move |query| match status {
            Some(status) => query.filter(order::Column::Status.eq(status)),
            None => query,
        })
        .await
    }

    pub async fn items(&self, order_id: Uuid) -> DaoResult<Vec<OrderItemLine>> {
        OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .find_also_related(FoodItem)
            .order_by_asc(order_item::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn items_for_orders(&self, order_ids: Vec<Uuid>) -> DaoResult<Vec<order_item::Model>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }
        OrderItem::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn recent(&self, limit: u64) -> DaoResult<Vec<order::Model>> {
        self.fetch_page(1, limit, None, |query| query, false)
            .await
            .map(|response| response.data)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::{NewOrder, OrderDao, OrderLine};
    use crate::db::dao::{DaoBase, DaoLayerError};
    use crate::db::entities::order;
    use crate::test_helpers::{order_item_model, order_model};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn new_order(user_id: Uuid, lines: Vec<OrderLine>) -> NewOrder {
        NewOrder {
            user_id,
            cart_id: Uuid::new_v4(),
            shipping_address: "1 Main St, Springfield, IL 62701".to_string(),
            status: "Pending".to_string(),
            total: Decimal::new(2500, 2),
            lines,
        }
    }

    #[tokio::test]
    async fn place_order_writes_items_and_clears_cart() {
        let user_id = Uuid::new_v4();
        let food_id = Uuid::new_v4();
        let placed = order_model(Uuid::new_v4(), user_id, Decimal::new(2500, 2), "Pending");
        let item = order_item_model(placed.id, food_id, 2, Decimal::new(1250, 2));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[placed.clone()]])
            .append_query_results([[item.clone()]])
            .append_exec_results([exec(1), exec(2), exec(1)])
            .into_connection();
        let dao = OrderDao::new(&db);

        let (order, items) = dao
            .place_order(new_order(
                user_id,
                vec![OrderLine {
                    food_item_id: food_id,
                    quantity: 2,
                    unit_price: Decimal::new(1250, 2),
                }],
            ))
            .await
            .expect("checkout should succeed");
        assert_eq!(order.id, placed.id);
        assert_eq!(items, vec![item]);
    }

    #[tokio::test]
    async fn place_order_rolls_back_when_stock_runs_out() {
        let user_id = Uuid::new_v4();
        let food_id = Uuid::new_v4();
        let placed = order_model(Uuid::new_v4(), user_id, Decimal::new(2500, 2), "Pending");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[placed]])
            .append_exec_results([exec(0)])
            .into_connection();
        let dao = OrderDao::new(&db);

        let err = dao
            .place_order(new_order(
                user_id,
                vec![OrderLine {
                    food_item_id: food_id,
                    quantity: 50,
                    unit_price: Decimal::new(50, 2),
                }],
            ))
            .await
            .expect_err("stock check should fail");
        assert!(matches!(
            err,
            DaoLayerError::InsufficientStock { food_item_id } if food_item_id == food_id
        ));
    }

    #[tokio::test]
    async fn cancel_order_restores_stock_for_each_item() {
        let user_id = Uuid::new_v4();
        let existing = order_model(Uuid::new_v4(), user_id, Decimal::new(900, 2), "Pending");
        let cancelled = order::Model {
            status: "Cancelled".to_string(),
            ..existing.clone()
        };
        let items = vec![
            order_item_model(existing.id, Uuid::new_v4(), 1, Decimal::new(400, 2)),
            order_item_model(existing.id, Uuid::new_v4(), 1, Decimal::new(500, 2)),
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .append_query_results([[cancelled]])
            .append_exec_results([exec(1), exec(1)])
            .into_connection();
        let dao = OrderDao::new(&db);

        let order = dao
            .cancel_order(existing.id, "Pending", "Cancelled", &items)
            .await
            .expect("cancel should succeed");
        assert_eq!(order.status, "Cancelled");
    }

    #[tokio::test]
    async fn cancel_order_restocks_nothing_once_already_cancelled() {
        let order_id = Uuid::new_v4();
        let items = vec![order_item_model(order_id, Uuid::new_v4(), 3, Decimal::ONE)];
        // only the guarded status update is queued; a restock would exhaust the mock
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection();
        let dao = OrderDao::new(&db);

        let err = dao
            .cancel_order(order_id, "Pending", "Cancelled", &items)
            .await
            .expect_err("second cancel should fail");
        assert!(matches!(
            err,
            DaoLayerError::StatusChanged { id, ref expected } if id == order_id && expected == "Pending"
        ));
    }

    #[tokio::test]
    async fn list_for_user_pages_results() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                order_model(Uuid::new_v4(), user_id, Decimal::new(100, 2), "Pending"),
                order_model(Uuid::new_v4(), user_id, Decimal::new(200, 2), "Delivered"),
            ]])
            .into_connection();
        let dao = OrderDao::new(&db);

        let page = dao
            .list_for_user(user_id, 1, 20)
            .await
            .expect("query should succeed");
        assert_eq!(page.data.len(), 2);
        assert!(!page.has_next);
        assert_eq!(page.total, 2);
    }
}
