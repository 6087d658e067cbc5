use sea_orm::entity::prelude::*;
use store_entity_derive::store_entity;

#[store_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(unique)]
    pub name: String,
    pub icon_url: Option<String>,
    #[sea_orm(has_many)]
    pub food_items: HasMany<super::food_item::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
