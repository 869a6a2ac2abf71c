use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        menus::MenuList,
        stans::{CreateStanRequest, PaymentSettingsRequest, StanList, UpdateStanRequest},
    },
    entity::{
        stans::{self, ActiveModel as StanActive, Entity as Stans},
        users::{self, Entity as Users, UserRole},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_superadmin},
    models::Stan,
    response::{ApiResponse, Meta},
    routes::params::{MenuQuery, Pagination},
    services::{menu_service, ownership::require_stan},
    state::AppState,
};

async fn find_live_stan(state: &AppState, id: Uuid) -> AppResult<stans::Model> {
    Stans::find_by_id(id)
        .filter(stans::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list_stans(state: &AppState, pagination: Pagination) -> AppResult<ApiResponse<StanList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Stans::find()
        .filter(stans::Column::DeletedAt.is_null())
        .order_by_asc(stans::Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Stan::from)
        .collect();

    Ok(ApiResponse::success(
        "Stans",
        StanList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_stan(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Stan>> {
    let stan = find_live_stan(state, id).await?;
    Ok(ApiResponse::success("OK", Stan::from(stan), Some(Meta::empty())))
}

/// A stan's menu with the discounts in effect now.
pub async fn list_stan_menus(
    state: &AppState,
    id: Uuid,
    mut query: MenuQuery,
) -> AppResult<ApiResponse<MenuList>> {
    let stan = find_live_stan(state, id).await?;
    query.stan_id = Some(stan.id);
    menu_service::list_menus(state, query).await
}

pub async fn my_stan(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Stan>> {
    let stan = require_stan(&state.orm, user).await?;
    Ok(ApiResponse::success("OK", Stan::from(stan), Some(Meta::empty())))
}

pub async fn update_my_stan(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateStanRequest,
) -> AppResult<ApiResponse<Stan>> {
    let stan = require_stan(&state.orm, user).await?;
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::bad_request("name cannot be empty"));
    }

    let mut active: StanActive = stan.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(owner_name) = payload.owner_name {
        active.owner_name = Set(owner_name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(photo) = payload.photo {
        active.photo = Set(Some(photo));
    }
    active.updated_at = Set(Utc::now().into());
    let stan = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user,
        "update_stan",
        format!("updated stan '{}'", stan.name),
    )
    .await;

    Ok(ApiResponse::success("Stan updated", Stan::from(stan), Some(Meta::empty())))
}

pub async fn update_payment_settings(
    state: &AppState,
    user: &AuthUser,
    payload: PaymentSettingsRequest,
) -> AppResult<ApiResponse<Stan>> {
    let stan = require_stan(&state.orm, user).await?;
    if !payload.accept_cash && !payload.accept_qris {
        return Err(AppError::bad_request(
            "at least one payment method must be accepted",
        ));
    }
    if payload.accept_qris && payload.qris_image.is_none() && stan.qris_image.is_none() {
        return Err(AppError::bad_request("a QR image is required to accept QRIS"));
    }

    let mut active: StanActive = stan.into();
    active.accept_cash = Set(payload.accept_cash);
    active.accept_qris = Set(payload.accept_qris);
    if let Some(image) = payload.qris_image {
        active.qris_image = Set(Some(image));
    }
    active.updated_at = Set(Utc::now().into());
    let stan = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user,
        "update_payment_settings",
        format!(
            "cash={} qris={} for stan '{}'",
            stan.accept_cash, stan.accept_qris, stan.name
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment settings updated",
        Stan::from(stan),
        Some(Meta::empty()),
    ))
}

/// Superadmin attaches a stan to an existing vendor-admin account without one.
pub async fn create_stan(
    state: &AppState,
    user: &AuthUser,
    payload: CreateStanRequest,
) -> AppResult<ApiResponse<Stan>> {
    ensure_superadmin(user)?;
    if payload.name.trim().is_empty() || payload.owner_name.trim().is_empty() {
        return Err(AppError::bad_request("name and owner_name are required"));
    }

    let owner = Users::find_by_id(payload.user_id)
        .filter(users::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if owner.role != UserRole::AdminStan {
        return Err(AppError::bad_request("user is not a stan admin"));
    }
    let existing = Stans::find()
        .filter(stans::Column::UserId.eq(owner.id))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("user already owns a stan".into()));
    }

    let stan = StanActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner.id),
        name: Set(payload.name.trim().to_string()),
        owner_name: Set(payload.owner_name.trim().to_string()),
        phone: Set(payload.phone),
        accept_cash: Set(true),
        accept_qris: Set(false),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user,
        "create_stan",
        format!("created stan '{}' for {}", stan.name, owner.username),
    )
    .await;

    Ok(ApiResponse::success("Stan created", Stan::from(stan), Some(Meta::empty())))
}

pub async fn delete_stan(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Stan>> {
    ensure_superadmin(user)?;
    let stan = find_live_stan(state, id).await?;

    let now = Utc::now();
    let mut active: StanActive = stan.into();
    active.deleted_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let stan = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user,
        "delete_stan",
        format!("deleted stan '{}'", stan.name),
    )
    .await;

    Ok(ApiResponse::success("Stan deleted", Stan::from(stan), Some(Meta::empty())))
}
