use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct StanRevenue {
    pub stan_id: Uuid,
    pub stan_name: String,
    pub total_revenue: i64,
    pub total_orders: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueReport {
    pub total_revenue: i64,
    pub total_orders: i64,
    pub stans: Vec<StanRevenue>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StanStatistics {
    pub stan_id: Uuid,
    pub stan_name: String,
    pub total_menu: i64,
    pub available_menu: i64,
    pub total_orders: i64,
    pub total_revenue: i64,
    pub average_order: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StanStatisticsList {
    pub items: Vec<StanStatistics>,
}
