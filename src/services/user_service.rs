use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::users::{UpdateRoleRequest, UserList},
    entity::users::{self, ActiveModel as UserActive, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_superadmin},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::UserQuery,
    services::ownership::{find_own_stan, find_own_student},
    state::AppState,
};

async fn find_live_user(state: &AppState, id: Uuid) -> AppResult<users::Model> {
    Users::find_by_id(id)
        .filter(users::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_superadmin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(users::Column::DeletedAt.is_null());
    if let Some(role) = query.role {
        condition = condition.add(users::Column::Role.eq(role));
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_desc(users::Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Superadmin tooling; the role is otherwise fixed at registration. Refused
/// while the user still owns a live stan or student profile.
pub async fn change_role(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRoleRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_superadmin(user)?;
    if id == user.user_id {
        return Err(AppError::bad_request("cannot change your own role"));
    }
    let target = find_live_user(state, id).await?;
    let previous = target.role;
    if payload.role != previous {
        if find_own_stan(&state.orm, target.id).await?.is_some() {
            return Err(AppError::Conflict(
                "user still owns a stan; delete it before changing the role".into(),
            ));
        }
        if find_own_student(&state.orm, target.id).await?.is_some() {
            return Err(AppError::Conflict(
                "user still has a student profile".into(),
            ));
        }
    }

    let mut active: UserActive = target.into();
    active.role = Set(payload.role);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user,
        "change_role",
        format!("{} changed from {previous} to {}", updated.username, updated.role),
    )
    .await;

    Ok(ApiResponse::success("Role updated", User::from(updated), Some(Meta::empty())))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_superadmin(user)?;
    if id == user.user_id {
        return Err(AppError::bad_request("cannot delete your own account"));
    }
    let target = find_live_user(state, id).await?;

    let now = Utc::now();
    let mut active: UserActive = target.into();
    active.deleted_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let deleted = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user,
        "delete_user",
        format!("deleted user {}", deleted.username),
    )
    .await;

    Ok(ApiResponse::success("User deleted", User::from(deleted), Some(Meta::empty())))
}
