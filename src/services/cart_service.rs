use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::dao::{CartDao, CartLine, CartLineWrite, DaoBase, FoodItemDao},
    db::entities::{cart, cart_item, food_item},
    error::AppError,
    services::crud_service::{CrudErrors, CrudOp, CrudService},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLineView {
    pub id: Uuid,
    pub food_item_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
    pub items: Vec<CartLineView>,
    pub total: Decimal,
}

impl CartView {
    /// Prices every line at the food item's current price.
    pub fn build(cart: cart::Model, lines: Vec<CartLine>) -> Self {
        let items: Vec<CartLineView> = lines
            .into_iter()
            .filter_map(|(line, food)| food.map(|food| line_view(line, food)))
            .collect();
        let total = items.iter().map(|item| item.line_total).sum();
        Self {
            id: cart.id,
            user_id: cart.user_id,
            updated_at: cart.updated_at,
            items,
            total,
        }
    }
}

fn line_view(line: cart_item::Model, food: food_item::Model) -> CartLineView {
    CartLineView {
        id: line.id,
        food_item_id: food.id,
        line_total: food.price * Decimal::from(line.quantity),
        name: food.name,
        image_url: food.image_url,
        unit_price: food.price,
        quantity: line.quantity,
    }
}

/// Adding a food item already in the cart grows the existing line instead of adding a row.
pub fn merge_quantity(
    existing: Option<&cart_item::Model>,
    food_item_id: Uuid,
    added: i32,
) -> CartLineWrite {
    match existing {
        Some(line) => CartLineWrite::SetQuantity {
            cart_item_id: line.id,
            quantity: line.quantity.saturating_add(added),
        },
        None => CartLineWrite::Insert {
            food_item_id,
            quantity: added,
        },
    }
}

pub(crate) fn ensure_positive_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::bad_request("Quantity must be at least 1"));
    }
    Ok(())
}

pub(crate) fn ensure_stock(food: &food_item::Model, quantity: i32) -> Result<(), AppError> {
    if quantity > food.stock_quantity {
        return Err(AppError::bad_request(format!(
            "Only {} unit(s) of {} in stock",
            food.stock_quantity.max(0),
            food.name
        )));
    }
    Ok(())
}

pub(crate) fn written_quantity(write: &CartLineWrite) -> i32 {
    match write {
        CartLineWrite::Insert { quantity, .. } | CartLineWrite::SetQuantity { quantity, .. } => {
            *quantity
        }
    }
}

#[derive(Clone)]
pub struct CartService {
    carts: CartDao,
    food_items: FoodItemDao,
}

impl CrudService for CartService {
    fn errors(&self) -> CrudErrors {
        CrudErrors {
            create_failed: "Cart update failed",
            find_failed: "Cart lookup failed",
            not_found: "Cart item not found",
            update_failed: "Cart update failed",
            delete_failed: "Cart update failed",
        }
    }
}

impl CartService {
    pub fn new(carts: CartDao, food_items: FoodItemDao) -> Self {
        Self { carts, food_items }
    }

    async fn cart_for(&self, user_id: Uuid) -> Result<cart::Model, AppError> {
        self.carts
            .find_or_create_for_user(user_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))
    }

    async fn food_item(&self, id: Uuid) -> Result<food_item::Model, AppError> {
        self.food_items
            .find_by_id(id)
            .await
            .map_err(AppError::from)
    }

    async fn view_of(&self, cart: cart::Model) -> Result<CartView, AppError> {
        let lines = self
            .carts
            .lines(cart.id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        Ok(CartView::build(cart, lines))
    }

    pub async fn view(&self, user_id: Uuid) -> Result<CartView, AppError> {
        let cart = self.cart_for(user_id).await?;
        self.view_of(cart).await
    }

    pub async fn add_item(
        &self,
        user_id: Uuid,
        food_item_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, AppError> {
        ensure_positive_quantity(quantity)?;
        let food = self.food_item(food_item_id).await?;
        let cart = self.cart_for(user_id).await?;
        let existing = self
            .carts
            .find_line_for_food_item(cart.id, food_item_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;

        let write = merge_quantity(existing.as_ref(), food_item_id, quantity);
        ensure_stock(&food, written_quantity(&write))?;
        self.carts
            .write_line(cart.id, write)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))?;
        self.view_of(cart).await
    }

    pub async fn set_quantity(
        &self,
        user_id: Uuid,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, AppError> {
        ensure_positive_quantity(quantity)?;
        let cart = self.cart_for(user_id).await?;
        let line = self
            .carts
            .find_line(cart.id, cart_item_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))?;
        let food = self.food_item(line.food_item_id).await?;
        ensure_stock(&food, quantity)?;

        self.carts
            .write_line(
                cart.id,
                CartLineWrite::SetQuantity {
                    cart_item_id,
                    quantity,
                },
            )
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))?;
        self.view_of(cart).await
    }

    pub async fn remove_item(&self, user_id: Uuid, cart_item_id: Uuid) -> Result<CartView, AppError> {
        let cart = self.cart_for(user_id).await?;
        self.carts
            .remove_line(cart.id, cart_item_id)
            .await
            .map_err(|err| self.map_error(CrudOp::Delete, err))?;
        self.view_of(cart).await
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<CartView, AppError> {
        let cart = self.cart_for(user_id).await?;
        self.carts
            .clear(cart.id)
            .await
            .map_err(|err| self.map_error(CrudOp::Delete, err))?;
        Ok(CartView::build(cart, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::{CartService, CartView, ensure_stock, merge_quantity};
    use crate::{
        db::dao::CartLineWrite,
        db::entities::cart_item,
        error::AppError,
        services::ServiceContext,
        test_helpers::{cart_item_model, cart_model, food_item_model},
    };

    fn service(mock: MockDatabase) -> CartService {
        ServiceContext::new(&mock.into_connection()).cart()
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let food_item_id = Uuid::new_v4();
        let first = merge_quantity(None, food_item_id, 3);
        assert_eq!(
            first,
            CartLineWrite::Insert {
                food_item_id,
                quantity: 3
            }
        );

        let line = cart_item_model(Uuid::new_v4(), Uuid::new_v4(), food_item_id, 3);
        let second = merge_quantity(Some(&line), food_item_id, 2);
        assert_eq!(
            second,
            CartLineWrite::SetQuantity {
                cart_item_id: line.id,
                quantity: 5
            }
        );
    }

    #[test]
    fn stock_check_allows_exact_amount() {
        let food = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::ONE, 4);
        assert!(ensure_stock(&food, 4).is_ok());
        assert!(matches!(
            ensure_stock(&food, 5),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn view_totals_every_line() {
        let cart = cart_model(Uuid::new_v4(), Uuid::new_v4());
        let noodles = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::new(450, 2), 9);
        let soup = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::new(300, 2), 9);
        let lines = vec![
            (cart_item_model(Uuid::new_v4(), cart.id, noodles.id, 2), Some(noodles)),
            (cart_item_model(Uuid::new_v4(), cart.id, soup.id, 1), Some(soup)),
        ];

        let view = CartView::build(cart, lines);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].line_total, Decimal::new(900, 2));
        assert_eq!(view.total, Decimal::new(1200, 2));
    }

    #[tokio::test]
    async fn adding_same_item_again_updates_quantity() {
        let user_id = Uuid::new_v4();
        let cart = cart_model(Uuid::new_v4(), user_id);
        let food = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::new(200, 2), 10);
        let existing = cart_item_model(Uuid::new_v4(), cart.id, food.id, 3);
        let merged = cart_item_model(existing.id, cart.id, food.id, 5);
        let food_item_id = food.id;
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[food.clone()]])
                .append_query_results([[cart.clone()]])
                .append_query_results([[existing]])
                .append_query_results([[merged.clone()]])
                .append_exec_results([exec(1)])
                .append_query_results([[(merged, food)]]),
        );

        let view = service
            .add_item(user_id, food_item_id, 2)
            .await
            .expect("add should succeed");
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 5);
        assert_eq!(view.total, Decimal::new(1000, 2));
    }

    #[tokio::test]
    async fn adding_beyond_stock_is_rejected() {
        let user_id = Uuid::new_v4();
        let cart = cart_model(Uuid::new_v4(), user_id);
        let food = food_item_model(Uuid::new_v4(), Uuid::new_v4(), Decimal::new(200, 2), 4);
        let existing = cart_item_model(Uuid::new_v4(), cart.id, food.id, 3);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[food.clone()]])
                .append_query_results([[cart]])
                .append_query_results([[existing]]),
        );

        let err = service
            .add_item(user_id, food.id, 2)
            .await
            .expect_err("should exceed stock");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let err = service
            .add_item(Uuid::new_v4(), Uuid::new_v4(), 0)
            .await
            .expect_err("should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn removing_unknown_line_is_not_found() {
        let user_id = Uuid::new_v4();
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[cart_model(Uuid::new_v4(), user_id)]])
                .append_exec_results([exec(0)]),
        );

        let err = service
            .remove_item(user_id, Uuid::new_v4())
            .await
            .expect_err("should fail");
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.message(), "Cart item not found");
    }

    #[tokio::test]
    async fn set_quantity_checks_the_line_belongs_to_the_cart() {
        let user_id = Uuid::new_v4();
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[cart_model(Uuid::new_v4(), user_id)]])
                .append_query_results([Vec::<cart_item::Model>::new()]),
        );

        let err = service
            .set_quantity(user_id, Uuid::new_v4(), 2)
            .await
            .expect_err("should fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
