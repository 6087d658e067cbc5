use std::collections::BTreeMap;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::dao::{
        BillableTotals, DaoLayerError, FoodItemDao, OrderDao, ProductSales, ReportDao,
        StatusCount, UserDao,
    },
    db::entities::{food_item, order},
    error::AppError,
    services::{
        crud_service::{CrudErrors, CrudOp, CrudService},
        order_service::OrderStatus,
    },
};

pub const DEFAULT_TOP_PRODUCTS: u64 = 10;
const DEFAULT_RANGE_DAYS: u64 = 30;
const DASHBOARD_LIST_SIZE: u64 = 10;

/// Half-open `[from, to)` window over order dates, built from inclusive calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Missing bounds default to the 30 days ending with `to` (today when absent).
    pub fn resolve(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, AppError> {
        let to = to.unwrap_or_else(|| Utc::now().date_naive());
        let from = from.unwrap_or_else(|| {
            to.checked_sub_days(Days::new(DEFAULT_RANGE_DAYS - 1))
                .unwrap_or(to)
        });
        if from > to {
            return Err(AppError::bad_request("`from` must not be after `to`"));
        }
        Ok(Self { from, to })
    }

    fn start(&self) -> DateTime<FixedOffset> {
        midnight(self.from)
    }

    fn end(&self) -> DateTime<FixedOffset> {
        midnight(self.to.checked_add_days(Days::new(1)).unwrap_or(self.to))
    }
}

fn midnight(day: NaiveDate) -> DateTime<FixedOffset> {
    day.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
        .fixed_offset()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub order_count: i64,
    pub revenue: Decimal,
    pub average_order_value: Decimal,
    pub status_counts: BTreeMap<String, i64>,
}

/// Every order counts toward `order_count` and `status_counts`; `billable`
/// covers the non-cancelled orders that make up revenue and the average.
pub fn summarize_sales(
    range: DateRange,
    counts: Vec<StatusCount>,
    billable: BillableTotals,
) -> SalesSummary {
    let mut status_counts: BTreeMap<String, i64> = OrderStatus::ALL
        .iter()
        .map(|status| (status.as_str().to_string(), 0))
        .collect();
    for count in counts {
        *status_counts.entry(count.status).or_default() += count.orders;
    }
    let revenue = billable.revenue.unwrap_or(Decimal::ZERO);
    let average_order_value = if billable.orders == 0 {
        Decimal::ZERO
    } else {
        (revenue / Decimal::from(billable.orders)).round_dp(2)
    };

    SalesSummary {
        from: range.from,
        to: range.to,
        order_count: status_counts.values().sum(),
        revenue,
        average_order_value,
        status_counts,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProduct {
    pub food_item_id: Uuid,
    pub name: String,
    pub units_sold: i64,
    pub revenue: Decimal,
}

impl From<ProductSales> for TopProduct {
    fn from(sales: ProductSales) -> Self {
        Self {
            food_item_id: sales.food_item_id,
            name: sales.name,
            units_sold: sales.units_sold,
            revenue: sales.revenue,
        }
    }
}

#[derive(Debug, Serialize)]
struct SalesCsvRow<'a> {
    order_id: Uuid,
    user_id: Uuid,
    order_date: String,
    status: &'a str,
    total: Decimal,
    shipping_address: &'a str,
}

pub fn sales_csv(orders: &[order::Model]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for order in orders {
        writer
            .serialize(SalesCsvRow {
                order_id: order.id,
                user_id: order.user_id,
                order_date: order.created_at.to_rfc3339(),
                status: &order.status,
                total: order.total,
                shipping_address: &order.shipping_address,
            })
            .map_err(|err| AppError::internal_with_source("CSV export failed", err))?;
    }
    // With no rows `serialize` never runs, so the header has to be written by hand.
    if orders.is_empty() {
        writer
            .write_record([
                "order_id",
                "user_id",
                "order_date",
                "status",
                "total",
                "shipping_address",
            ])
            .map_err(|err| AppError::internal_with_source("CSV export failed", err))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| AppError::internal_with_source("CSV export failed", err))?;
    String::from_utf8(bytes).map_err(|err| AppError::internal_with_source("CSV export failed", err))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub active_users: u64,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub revenue: Decimal,
    pub low_stock_threshold: i32,
    pub low_stock_items: Vec<food_item::Model>,
    pub recent_orders: Vec<order::Model>,
}

#[derive(Clone)]
pub struct ReportService {
    reports: ReportDao,
    users: UserDao,
    food_items: FoodItemDao,
    orders: OrderDao,
}

impl CrudService for ReportService {
    fn errors(&self) -> CrudErrors {
        CrudErrors {
            find_failed: "Report query failed",
            ..CrudErrors::default()
        }
    }
}

impl ReportService {
    pub fn new(reports: ReportDao, users: UserDao, food_items: FoodItemDao, orders: OrderDao) -> Self {
        Self {
            reports,
            users,
            food_items,
            orders,
        }
    }

    async fn orders_in(&self, range: DateRange) -> Result<Vec<order::Model>, AppError> {
        self.reports
            .orders_between(range.start(), range.end())
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    pub async fn sales(&self, range: DateRange) -> Result<SalesSummary, AppError> {
        let list = |err: DaoLayerError| self.map_error(CrudOp::List, err);
        let counts = self
            .reports
            .status_counts_between(range.start(), range.end())
            .await
            .map_err(list)?;
        let billable = self
            .reports
            .billable_between(range.start(), range.end(), OrderStatus::Cancelled.as_str())
            .await
            .map_err(list)?;
        Ok(summarize_sales(range, counts, billable))
    }

    pub async fn top_products(
        &self,
        range: DateRange,
        limit: Option<u64>,
    ) -> Result<Vec<TopProduct>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_TOP_PRODUCTS);
        if limit == 0 {
            return Err(AppError::bad_request("`limit` must be at least 1"));
        }
        let sales = self
            .reports
            .top_products_between(
                range.start(),
                range.end(),
                OrderStatus::Cancelled.as_str(),
                limit,
            )
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))?;
        Ok(sales.into_iter().map(TopProduct::from).collect())
    }

    pub async fn export_sales(&self, range: DateRange) -> Result<String, AppError> {
        let orders = self.orders_in(range).await?;
        tracing::info!(from = %range.from, to = %range.to, rows = orders.len(), "sales export");
        sales_csv(&orders)
    }

    pub async fn dashboard(&self, low_stock_threshold: i32) -> Result<Dashboard, AppError> {
        let find = |err: DaoLayerError| self.map_error(CrudOp::Find, err);
        let active_users = self.users.count_active().await.map_err(find)?;
        let total_orders = self.reports.count_orders(None).await.map_err(find)?;
        let pending_orders = self
            .reports
            .count_orders(Some(OrderStatus::Pending.as_str()))
            .await
            .map_err(find)?;
        let revenue = self
            .reports
            .revenue_total(OrderStatus::Cancelled.as_str())
            .await
            .map_err(find)?;
        let low_stock_items = self
            .food_items
            .low_stock(low_stock_threshold, DASHBOARD_LIST_SIZE)
            .await
            .map_err(find)?;
        let recent_orders = self
            .orders
            .recent(DASHBOARD_LIST_SIZE)
            .await
            .map_err(find)?;

        Ok(Dashboard {
            active_users,
            total_orders,
            pending_orders,
            revenue,
            low_stock_threshold,
            low_stock_items,
            recent_orders,
        })
    }
}
