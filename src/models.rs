use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    activity_logs, discounts, menus,
    menus::MenuCategory,
    discounts::DiscountScope,
    order_items, orders,
    orders::OrderStatus,
    stans, students, users,
    users::UserRole,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Stan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub owner_name: String,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub qris_image: Option<String>,
    pub accept_cash: bool,
    pub accept_qris: bool,
    pub created_at: DateTime<Utc>,
}

impl From<stans::Model> for Stan {
    fn from(model: stans::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            owner_name: model.owner_name,
            phone: model.phone,
            photo: model.photo,
            qris_image: model.qris_image,
            accept_cash: model.accept_cash,
            accept_qris: model.accept_qris,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<students::Model> for Student {
    fn from(model: students::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            address: model.address,
            phone: model.phone,
            photo: model.photo,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Menu {
    pub id: Uuid,
    pub stan_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: MenuCategory,
    pub photo: Option<String>,
    pub stock: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl From<menus::Model> for Menu {
    fn from(model: menus::Model) -> Self {
        Self {
            id: model.id,
            stan_id: model.stan_id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            photo: model.photo,
            stock: model.stock,
            is_available: model.is_available,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Discount {
    pub id: Uuid,
    pub name: String,
    pub percentage: f64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub scope: DiscountScope,
    pub stan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<discounts::Model> for Discount {
    fn from(model: discounts::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            percentage: model.percentage,
            starts_at: model.starts_at.with_timezone(&Utc),
            ends_at: model.ends_at.with_timezone(&Utc),
            scope: model.scope,
            stan_id: model.stan_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub student_id: Uuid,
    pub menu_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub stan_id: Uuid,
    pub student_id: Uuid,
    pub status: OrderStatus,
    pub ordered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            stan_id: model.stan_id,
            student_id: model.student_id,
            status: model.status,
            ordered_at: model.ordered_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub purchase_price: i64,
    pub discount_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            menu_id: model.menu_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            purchase_price: model.purchase_price,
            discount_name: model.discount_name,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub description: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<activity_logs::Model> for ActivityLog {
    fn from(model: activity_logs::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            action: model.action,
            description: model.description,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
