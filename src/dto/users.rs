use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{entity::users::UserRole, models::User};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}
