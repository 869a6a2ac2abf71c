use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{entity::users::UserRole, models::User};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    /// Stan name for `admin_stan`, student name for `siswa`.
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub owner_name: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
