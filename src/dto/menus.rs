use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{discounts::DiscountScope, menus::MenuCategory},
    models::Menu,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMenuRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: MenuCategory,
    pub photo: Option<String>,
    #[serde(default)]
    pub stock: i32,
    /// Required when a superadmin creates the item; ignored for stan admins.
    pub stan_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMenuRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category: Option<MenuCategory>,
    pub photo: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStockRequest {
    pub stock: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    pub delta: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetAvailabilityRequest {
    pub is_available: bool,
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct AppliedDiscount {
    pub id: Uuid,
    pub name: String,
    pub percentage: f64,
    pub scope: DiscountScope,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuWithDiscount {
    pub menu: Menu,
    pub discount: Option<AppliedDiscount>,
    pub final_price: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuList {
    pub items: Vec<MenuWithDiscount>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockList {
    pub items: Vec<Menu>,
}
