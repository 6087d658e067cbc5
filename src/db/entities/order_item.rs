use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use store_entity_derive::store_entity;

#[store_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(indexed)]
    pub order_id: Uuid,
    pub food_item_id: Uuid,
    pub quantity: i32,
    /// Price of the food item when the order was placed.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub unit_price: Decimal,
    #[sea_orm(belongs_to, from = "order_id", to = "id", on_delete = "Cascade")]
    pub order: HasOne<super::order::Entity>,
    #[sea_orm(belongs_to, from = "food_item_id", to = "id", on_delete = "Restrict")]
    pub food_item: HasOne<super::food_item::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
