use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum MenuCategory {
    #[sea_orm(string_value = "food")]
    Food,
    #[sea_orm(string_value = "drink")]
    Drink,
}

impl MenuCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuCategory::Food => "food",
            MenuCategory::Drink => "drink",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "menus")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub stan_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: MenuCategory,
    pub photo: Option<String>,
    pub stock: i32,
    pub is_available: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stans::Entity",
        from = "Column::StanId",
        to = "super::stans::Column::Id"
    )]
    Stans,
    #[sea_orm(has_many = "super::menu_discounts::Entity")]
    MenuDiscounts,
    #[sea_orm(has_many = "super::cart_items::Entity")]
    CartItems,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::stans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stans.def()
    }
}

impl Related<super::menu_discounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuDiscounts.def()
    }
}

impl Related<super::cart_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
