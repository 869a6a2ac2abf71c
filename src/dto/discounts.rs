use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{entity::discounts::DiscountScope, models::Discount};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateDiscountRequest {
    pub name: String,
    pub percentage: f64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub scope: DiscountScope,
    /// Defaults to the caller's own stan for stan admins.
    pub stan_id: Option<Uuid>,
    #[serde(default)]
    pub menu_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDiscountRequest {
    pub name: Option<String>,
    pub percentage: Option<f64>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignMenuRequest {
    pub menu_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscountWithMenus {
    pub discount: Discount,
    pub menu_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscountList {
    pub items: Vec<Discount>,
}
