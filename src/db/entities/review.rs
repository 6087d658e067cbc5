use sea_orm::entity::prelude::*;
use store_entity_derive::store_entity;

#[store_entity(owner = "user_id")]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(indexed)]
    pub food_item_id: Uuid,
    #[sea_orm(indexed)]
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    #[sea_orm(belongs_to, from = "food_item_id", to = "id", on_delete = "Cascade")]
    pub food_item: HasOne<super::food_item::Entity>,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
