use sea_orm::entity::prelude::*;
use store_entity_derive::store_entity;

#[store_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "wishlist_items")]
pub struct Model {
    #[sea_orm(indexed)]
    pub wishlist_id: Uuid,
    pub food_item_id: Uuid,
    #[sea_orm(belongs_to, from = "wishlist_id", to = "id", on_delete = "Cascade")]
    pub wishlist: HasOne<super::wishlist::Entity>,
    #[sea_orm(belongs_to, from = "food_item_id", to = "id", on_delete = "Cascade")]
    pub food_item: HasOne<super::food_item::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
