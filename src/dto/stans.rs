use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Stan;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStanRequest {
    pub user_id: Uuid,
    pub name: String,
    pub owner_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStanRequest {
    pub name: Option<String>,
    pub owner_name: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentSettingsRequest {
    pub accept_cash: bool,
    pub accept_qris: bool,
    /// Opaque path of an already-uploaded QR image; kept when absent.
    pub qris_image: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StanList {
    pub items: Vec<Stan>,
}
