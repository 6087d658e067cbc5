use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Alias, Expr, ExprTrait, Func};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, Order, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::prelude::{FoodItem, OrderItem};
use crate::db::entities::{food_item, order, order_item};

/// Read-only aggregate queries over orders for the dashboard and reports.
#[derive(Clone)]
pub struct ReportDao {
    db: DatabaseConnection,
}

impl DaoBase for ReportDao {
    type Entity = order::Entity;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct StatusCount {
    pub status: String,
    pub orders: i64,
}

/// Revenue and order count over orders that were not cancelled.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct BillableTotals {
    pub revenue: Option<Decimal>,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ProductSales {
    pub food_item_id: Uuid,
    pub name: String,
    pub units_sold: i64,
    pub revenue: Decimal,
}

fn placed_between(
    query: Select<order::Entity>,
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
) -> Select<order::Entity> {
    query
        .filter(order::Column::CreatedAt.gte(from))
        .filter(order::Column::CreatedAt.lt(to))
}

fn billable_query(excluded_status: &str) -> Select<order::Entity> {
    order::Entity::find()
        .select_only()
        .column_as(Expr::from(Func::sum(Expr::col((order::Entity, order::Column::Total)))), "revenue")
        .column_as(Expr::from(Func::count(Expr::col((order::Entity, order::Column::Id)))), "orders")
        .filter(order::Column::Status.ne(excluded_status))
}

/// Units and revenue per food item in `[from, to)`, best sellers first.
pub(crate) fn top_products_query(
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
    excluded_status: &str,
    limit: u64,
) -> Select<order_item::Entity> {
    let quantity = Expr::col((order_item::Entity, order_item::Column::Quantity));
    let unit_price = Expr::col((order_item::Entity, order_item::Column::UnitPrice));
    OrderItem::find()
        .select_only()
        .column(order_item::Column::FoodItemId)
        .column_as(food_item::Column::Name, "name")
        .column_as(Expr::from(Func::sum(quantity.clone())), "units_sold")
        .column_as(Expr::from(Func::sum(quantity.mul(unit_price))), "revenue")
        .inner_join(order::Entity)
        .inner_join(FoodItem)
        .filter(order::Column::CreatedAt.gte(from))
        .filter(order::Column::CreatedAt.lt(to))
        .filter(order::Column::Status.ne(excluded_status))
        .group_by(order_item::Column::FoodItemId)
        .group_by(food_item::Column::Name)
        .order_by(Expr::col(Alias::new("units_sold")), Order::Desc)
        .order_by(Expr::col(Alias::new("revenue")), Order::Desc)
        .order_by(food_item::Column::Name, Order::Asc)
        .limit(limit)
}

impl ReportDao {
    /// Orders placed in `[from, to)`, oldest first.
    pub async fn orders_between(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> DaoResult<Vec<order::Model>> {
        self.find_all(Some((order::Column::CreatedAt, Order::Asc)), move |query| {
            placed_between(query, from, to)
        })
        .await
    }

    /// Order count per status for orders placed in `[from, to)`.
    pub async fn status_counts_between(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> DaoResult<Vec<StatusCount>> {
        let query = order::Entity::find()
            .select_only()
            .column(order::Column::Status)
            .column_as(Expr::from(Func::count(Expr::col((order::Entity, order::Column::Id)))), "orders")
            .group_by(order::Column::Status);
        placed_between(query, from, to)
            .into_model::<StatusCount>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn billable_between(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
        excluded_status: &str,
    ) -> DaoResult<BillableTotals> {
        let totals = placed_between(billable_query(excluded_status), from, to)
            .into_model::<BillableTotals>()
            .one(&self.db)
            .await?;
        Ok(totals.unwrap_or(BillableTotals {
            revenue: None,
            orders: 0,
        }))
    }

    pub async fn top_products_between(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
        excluded_status: &str,
        limit: u64,
    ) -> DaoResult<Vec<ProductSales>> {
        top_products_query(from, to, excluded_status, limit)
            .into_model::<ProductSales>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn revenue_total(&self, excluded_status: &str) -> DaoResult<Decimal> {
        let totals = billable_query(excluded_status)
            .into_model::<BillableTotals>()
            .one(&self.db)
            .await?;
        Ok(totals
            .and_then(|totals| totals.revenue)
            .unwrap_or(Decimal::ZERO))
    }

    pub async fn count_orders(&self, status: Option<&str>) -> DaoResult<u64> {
        let status = status.map(str::to_string);
        self.count(move |query| match status {
            Some(status) => query.filter(order::Column::Status.eq(status)),
            None => query,
        })
        .await
    }
}
