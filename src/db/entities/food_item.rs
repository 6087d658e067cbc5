use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use store_entity_derive::store_entity;

#[store_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "food_items")]
pub struct Model {
    pub name: String,
    pub description: String,
    #[sea_orm(indexed)]
    pub category_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
    // Deleting a category with food items is refused in the service as well.
    #[sea_orm(belongs_to, from = "category_id", to = "id", on_delete = "Restrict")]
    pub category: HasOne<super::category::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
