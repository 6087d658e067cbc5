use sea_orm::entity::prelude::*;
use store_entity_derive::store_entity;

#[store_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    #[sea_orm(indexed)]
    pub cart_id: Uuid,
    pub food_item_id: Uuid,
    pub quantity: i32,
    #[sea_orm(belongs_to, from = "cart_id", to = "id", on_delete = "Cascade")]
    pub cart: HasOne<super::cart::Entity>,
    #[sea_orm(belongs_to, from = "food_item_id", to = "id", on_delete = "Cascade")]
    pub food_item: HasOne<super::food_item::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
