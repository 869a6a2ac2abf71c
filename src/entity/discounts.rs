use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum DiscountScope {
    /// Every stan; managed by superadmin only.
    #[sea_orm(string_value = "global")]
    Global,
    /// One stan's whole menu.
    #[sea_orm(string_value = "stan")]
    Stan,
    /// Specific menu items linked through `menu_discounts`.
    #[sea_orm(string_value = "menu")]
    Menu,
}

impl DiscountScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountScope::Global => "global",
            DiscountScope::Stan => "stan",
            DiscountScope::Menu => "menu",
        }
    }

    /// Higher wins when several discounts are active for the same item.
    pub fn specificity(&self) -> u8 {
        match self {
            DiscountScope::Global => 0,
            DiscountScope::Stan => 1,
            DiscountScope::Menu => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "discounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub percentage: f64,
    pub starts_at: DateTimeWithTimeZone,
    pub ends_at: DateTimeWithTimeZone,
    pub scope: DiscountScope,
    pub stan_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Inclusive on both ends; soft-deleted discounts are never active.
    pub fn is_active_at(&self, at: DateTimeWithTimeZone) -> bool {
        self.deleted_at.is_none() && self.starts_at <= at && at <= self.ends_at
    }
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

impl ActiveModelBehavior for ActiveModel {}
