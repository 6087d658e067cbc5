use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::Claims,
    db::dao::{
        AddressDao, CartDao, CartLine, DaoBase, NewOrder, OrderDao, OrderItemLine, OrderLine,
        PaginatedResponse,
    },
    db::entities::{address, order, order_item},
    error::AppError,
    services::{
        cart_service::ensure_stock,
        crud_service::{CrudErrors, CrudOp, CrudService},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(OrderStatus::as_str).collect();
                AppError::bad_request(format!(
                    "Invalid order status '{value}'. Allowed: {}",
                    allowed.join(", ")
                ))
            })
    }
}

/// Where a checkout ships to. Without either field the caller's default address is used.
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    pub address_id: Option<Uuid>,
    pub shipping_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemView {
    pub id: Uuid,
    pub food_item_id: Uuid,
    pub food_item_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl OrderItemView {
    fn new(item: order_item::Model, food_item_name: Option<String>) -> Self {
        Self {
            id: item.id,
            food_item_id: item.food_item_id,
            food_item_name,
            quantity: item.quantity,
            line_total: item.unit_price * Decimal::from(item.quantity),
            unit_price: item.unit_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<OrderItemView>,
}

impl OrderDetail {
    fn from_lines(order: order::Model, lines: Vec<OrderItemLine>) -> Self {
        let items = lines
            .into_iter()
            .map(|(item, food)| OrderItemView::new(item, food.map(|food| food.name)))
            .collect();
        Self { order, items }
    }
}

pub fn format_address(address: &address::Model) -> String {
    format!(
        "{}, {}, {} {}",
        address.street, address.city, address.state, address.zip_code
    )
}

/// Snapshots every cart line at the current price and sums the order total.
pub fn price_cart(lines: &[CartLine]) -> Result<(Vec<OrderLine>, Decimal), AppError> {
    if lines.is_empty() {
        return Err(AppError::bad_request("Cart is empty"));
    }
    let mut total = Decimal::ZERO;
    let mut order_lines = Vec::with_capacity(lines.len());
    for (line, food) in lines {
        let food = food.as_ref().ok_or_else(|| {
            AppError::bad_request(format!(
                "Food item {} is no longer available",
                line.food_item_id
            ))
        })?;
        ensure_stock(food, line.quantity)?;
        total += food.price * Decimal::from(line.quantity);
        order_lines.push(OrderLine {
            food_item_id: food.id,
            quantity: line.quantity,
            unit_price: food.price,
        });
    }
    Ok((order_lines, total))
}

#[derive(Clone)]
pub struct OrderService {
    orders: OrderDao,
    carts: CartDao,
    addresses: AddressDao,
}

impl CrudService for OrderService {
    fn errors(&self) -> CrudErrors {
        CrudErrors {
            create_failed: "Checkout failed",
            find_failed: "Order lookup failed",
            not_found: "Order not found",
            update_failed: "Order update failed",
            delete_failed: "Order update failed",
        }
    }
}

impl OrderService {
    pub fn new(orders: OrderDao, carts: CartDao, addresses: AddressDao) -> Self {
        Self {
            orders,
            carts,
            addresses,
        }
    }

    async fn resolve_shipping(
        &self,
        user_id: Uuid,
        request: &CheckoutRequest,
    ) -> Result<String, AppError> {
        if let Some(address_id) = request.address_id {
            let address = self
                .addresses
                .find_owned(address_id, user_id)
                .await
                .map_err(AppError::from)?;
            return Ok(format_address(&address));
        }
        if let Some(text) = request
            .shipping_address
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
        {
            return Ok(text.to_string());
        }
        let default = self
            .addresses
            .find_default(user_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        default
            .map(|address| format_address(&address))
            .ok_or_else(|| AppError::bad_request("No shipping address given and no default address"))
    }

    /// Turns the caller's cart into an order. Stock is withdrawn and the cart emptied
    /// in the same transaction as the order insert.
    pub async fn checkout(
        &self,
        user_id: Uuid,
        request: CheckoutRequest,
    ) -> Result<OrderDetail, AppError> {
        let shipping_address = self.resolve_shipping(user_id, &request).await?;
        let cart = self
            .carts
            .find_for_user(user_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?
            .ok_or_else(|| AppError::bad_request("Cart is empty"))?;
        let lines = self
            .carts
            .lines(cart.id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        let (order_lines, total) = price_cart(&lines)?;

        let names: Vec<(Uuid, String)> = lines
            .iter()
            .filter_map(|(_, food)| food.as_ref().map(|food| (food.id, food.name.clone())))
            .collect();

        let (order, items) = self
            .orders
            .place_order(NewOrder {
                user_id,
                cart_id: cart.id,
                shipping_address,
                status: OrderStatus::Pending.as_str().to_string(),
                total,
                lines: order_lines,
            })
            .await
            .map_err(|err| self.map_error(CrudOp::Create, err))?;
        tracing::info!(order_id = %order.id, %user_id, %total, "order placed");

        let items = items
            .into_iter()
            .map(|item| {
                let name = names
                    .iter()
                    .find(|(id, _)| *id == item.food_item_id)
                    .map(|(_, name)| name.clone());
                OrderItemView::new(item, name)
            })
            .collect();
        Ok(OrderDetail { order, items })
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<PaginatedResponse<order::Model>, AppError> {
        self.orders
            .list_for_user(user_id, page, page_size)
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    /// Order history of `user_id`; only that user or an admin may read it.
    pub async fn history(
        &self,
        claims: &Claims,
        user_id: Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<PaginatedResponse<order::Model>, AppError> {
        claims.ensure_owner_or_admin(user_id)?;
        self.list_for_user(user_id, page, page_size).await
    }

    pub async fn list_all(
        &self,
        page: u64,
        page_size: u64,
        status: Option<&str>,
    ) -> Result<PaginatedResponse<order::Model>, AppError> {
        let status = status
            .filter(|status| !status.trim().is_empty())
            .map(OrderStatus::from_str)
            .transpose()?
            .map(|status| status.as_str().to_string());
        self.orders
            .list_all(page, page_size, status)
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    async fn owned_order(&self, claims: &Claims, id: Uuid) -> Result<order::Model, AppError> {
        let order = self
            .orders
            .find_by_id(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        claims.ensure_owner_or_admin(order.user_id)?;
        Ok(order)
    }

    pub async fn get(&self, claims: &Claims, id: Uuid) -> Result<OrderDetail, AppError> {
        let order = self.owned_order(claims, id).await?;
        let lines = self
            .orders
            .items(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        Ok(OrderDetail::from_lines(order, lines))
    }

    /// Admin status change. Cancelled orders stay cancelled, and cancelling goes
    /// through the same restock as a customer cancel.
    pub async fn set_status(&self, id: Uuid, status: &str) -> Result<order::Model, AppError> {
        let target: OrderStatus = status.parse()?;
        let order = self
            .orders
            .find_by_id(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        let current: OrderStatus = order.status.parse()?;
        if current == target {
            return Ok(order);
        }
        let updated = match (current, target) {
            (OrderStatus::Cancelled, _) => {
                return Err(AppError::bad_request("Cancelled orders cannot change status"));
            }
            (OrderStatus::Delivered, OrderStatus::Cancelled) => {
                return Err(AppError::bad_request("Delivered orders cannot be cancelled"));
            }
            (_, OrderStatus::Cancelled) => self.restock_and_cancel(&order).await?.0,
            _ => self
                .orders
                .set_status(id, current.as_str(), target.as_str())
                .await
                .map_err(|err| self.map_error(CrudOp::Update, err))?,
        };
        tracing::info!(order_id = %id, from = %current, to = %target, "order status changed");
        Ok(updated)
    }

    async fn restock_and_cancel(
        &self,
        order: &order::Model,
    ) -> Result<(order::Model, Vec<OrderItemLine>), AppError> {
        let lines = self
            .orders
            .items(order.id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        let items: Vec<order_item::Model> = lines.iter().map(|(item, _)| item.clone()).collect();
        let cancelled = self
            .orders
            .cancel_order(
                order.id,
                &order.status,
                OrderStatus::Cancelled.as_str(),
                &items,
            )
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))?;
        Ok((cancelled, lines))
    }

    /// Only pending orders can be cancelled; their units go back into stock.
    pub async fn cancel(&self, claims: &Claims, id: Uuid) -> Result<OrderDetail, AppError> {
        let order = self.owned_order(claims, id).await?;
        if order.status != OrderStatus::Pending.as_str() {
            return Err(AppError::bad_request(format!(
                "Only pending orders can be cancelled; this order is {}",
                order.status
            )));
        }
        let (cancelled, lines) = self.restock_and_cancel(&order).await?;
        tracing::info!(order_id = %id, "order cancelled");
        Ok(OrderDetail::from_lines(cancelled, lines))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::{CheckoutRequest, OrderService, OrderStatus, format_address, price_cart};
    use crate::{
        auth::{Claims, Role},
        db::entities::{address, cart, food_item, order, order_item},
        error::AppError,
        services::ServiceContext,
        test_helpers::{
            address_model, cart_item_model, cart_model, claims_for, food_item_model,
            order_item_model, order_model,
        },
    };

    fn service(mock: MockDatabase) -> OrderService {
        ServiceContext::new(&mock.into_connection()).order()
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn customer(id: Uuid) -> Claims {
        claims_for(id, Role::Customer)
    }

    #[test]
    fn status_parsing_uses_the_allow_list() {
        assert_eq!("shipped".parse::<OrderStatus>().ok(), Some(OrderStatus::Shipped));
        assert_eq!(
            "Cancelled".parse::<OrderStatus>().ok(),
            Some(OrderStatus::Cancelled)
        );
        assert!(matches!(
            "Lost".parse::<OrderStatus>(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn order_total_sums_quantity_times_price() {
        let cart_id = Uuid::new_v4();
        let noodles = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::new(450, 2), 10);
        let soup = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::new(325, 2), 10);
        let lines = vec![
            (cart_item_model(Uuid::new_v4(), cart_id, noodles.id, 2), Some(noodles.clone())),
            (cart_item_model(Uuid::new_v4(), cart_id, soup.id, 3), Some(soup.clone())),
        ];

        let (order_lines, total) = price_cart(&lines).expect("cart should price");
        assert_eq!(total, Decimal::new(1875, 2));
        assert_eq!(order_lines.len(), 2);
        assert_eq!(order_lines[0].unit_price, noodles.price);
        assert_eq!(order_lines[1].quantity, 3);
    }

    #[test]
    fn empty_cart_cannot_be_priced() {
        assert!(matches!(price_cart(&[]), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn line_over_stock_cannot_be_priced() {
        let food = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::ONE, 1);
        let lines = vec![(
            cart_item_model(Uuid::new_v4(), Uuid::new_v4(), food.id, 2),
            Some(food),
        )];
        assert!(matches!(price_cart(&lines), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn address_formats_on_one_line() {
        let address = address_model(Uuid::new_v4(), Uuid::new_v4(), true);
        assert_eq!(format_address(&address), "1 Main St, Springfield, IL 62701");
    }

    #[tokio::test]
    async fn checkout_creates_order_and_clears_cart() {
        let user_id = Uuid::new_v4();
        let cart = cart_model(Uuid::new_v4(), user_id);
        let noodles = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::new(450, 2), 10);
        let soup = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::new(300, 2), 10);
        let total = Decimal::new(1200, 2);
        let order = order_model(Uuid::new_v4(), user_id, total, "Pending");
        let noodle_item = order_item_model(order.id, noodles.id, 2, noodles.price);
        let soup_item = order_item_model(order.id, soup.id, 1, soup.price);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[cart.clone()]])
                .append_query_results([[
                    (cart_item_model(Uuid::new_v4(), cart.id, noodles.id, 2), noodles.clone()),
                    (cart_item_model(Uuid::new_v4(), cart.id, soup.id, 1), soup.clone()),
                ]])
                .append_query_results([[order.clone()]])
                .append_query_results([[noodle_item]])
                .append_query_results([[soup_item]])
                .append_exec_results([exec(1), exec(1), exec(2), exec(1)]),
        );

        let detail = service
            .checkout(
                user_id,
                CheckoutRequest {
                    shipping_address: Some("9 Elm St, Springfield".to_string()),
                    ..CheckoutRequest::default()
                },
            )
            .await
            .expect("checkout should succeed");
        assert_eq!(detail.order.total, total);
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].food_item_name.as_deref(), Some(noodles.name.as_str()));
        assert_eq!(detail.items[0].line_total, Decimal::new(900, 2));
    }

    #[tokio::test]
    async fn checkout_without_any_address_is_rejected() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<address::Model>::new()]),
        );

        let err = service
            .checkout(Uuid::new_v4(), CheckoutRequest::default())
            .await
            .expect_err("checkout should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn checkout_without_cart_is_rejected() {
        let user_id = Uuid::new_v4();
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[address_model(Uuid::new_v4(), user_id, true)]])
                .append_query_results([Vec::<cart::Model>::new()]),
        );

        let err = service
            .checkout(user_id, CheckoutRequest::default())
            .await
            .expect_err("checkout should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.message(), "Cart is empty");
    }

    #[tokio::test]
    async fn history_of_another_user_is_forbidden() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let err = service
            .history(&customer(Uuid::new_v4()), Uuid::new_v4(), 1, 20)
            .await
            .expect_err("should be forbidden");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn own_history_is_listed() {
        let user_id = Uuid::new_v4();
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
            vec![order_model(Uuid::new_v4(), user_id, Decimal::TEN, "Pending")],
        ]));

        let page = service
            .history(&customer(user_id), user_id, 1, 20)
            .await
            .expect("own history should load");
        assert_eq!(page.data.len(), 1);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn cancelling_a_shipped_order_is_rejected() {
        let user_id = Uuid::new_v4();
        let order = order_model(Uuid::new_v4(), user_id, Decimal::TEN, "Shipped");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[order.clone()]]),
        );

        let err = service
            .cancel(&customer(user_id), order.id)
            .await
            .expect_err("should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn set_status_rejects_unknown_value() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let err = service
            .set_status(Uuid::new_v4(), "Teleported")
            .await
            .expect_err("should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn cancelled_order_cannot_be_reopened() {
        let order = order_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::TEN, "Cancelled");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[order.clone()]]),
        );

        let err = service
            .set_status(order.id, "pending")
            .await
            .expect_err("reopening should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.message(), "Cancelled orders cannot change status");
    }

    #[tokio::test]
    async fn admin_cancel_restores_stock() {
        let food = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::TEN, 5);
        let order = order_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::new(3000, 2), "Processing");
        let item = order_item_model(order.id, food.id, 3, food.price);
        let cancelled = order::Model {
            status: "Cancelled".to_string(),
            ..order.clone()
        };
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[order.clone()]])
                .append_query_results([[(item, food)]])
                .append_exec_results([exec(1)])
                .append_query_results([[cancelled]])
                .append_exec_results([exec(1)]),
        );

        let updated = service
            .set_status(order.id, "Cancelled")
            .await
            .expect("admin cancel should succeed");
        assert_eq!(updated.status, "Cancelled");
    }

    #[tokio::test]
    async fn cancel_lost_to_a_concurrent_cancel_is_rejected() {
        let user_id = Uuid::new_v4();
        let order = order_model(Uuid::new_v4(), user_id, Decimal::TEN, "Pending");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[order.clone()]])
                .append_query_results([Vec::<(order_item::Model, food_item::Model)>::new()])
                .append_exec_results([exec(0)]),
        );

        let err = service
            .cancel(&customer(user_id), order.id)
            .await
            .expect_err("stale cancel should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn admin_may_read_any_order() {
        let order = order_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::TEN, "Pending");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[order.clone()]])
                .append_query_results([Vec::<(order_item::Model, food_item::Model)>::new()]),
        );

        let detail = service
            .get(&claims_for(Uuid::new_v4(), Role::Admin), order.id)
            .await
            .expect("admin should see the order");
        assert_eq!(detail.order, order);
        assert!(detail.items.is_empty());
    }
}
