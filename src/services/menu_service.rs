use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::menus::{CreateMenuRequest, MenuList, MenuWithDiscount, UpdateMenuRequest},
    entity::{
        cart_items::{self, Entity as CartItems},
        menus::{self, ActiveModel as MenuActive, Entity as Menus},
        stans::{self, Entity as Stans},
        users::UserRole,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::Menu,
    response::{ApiResponse, Meta},
    routes::params::MenuQuery,
    services::{
        discount_service::{priced_menu, resolve_for_menus},
        ownership::{ResourceOwner, Tenant, resolve_tenant},
    },
    state::AppState,
};

fn validate_menu_fields(name: Option<&str>, price: Option<i64>, stock: Option<i32>) -> AppResult<()> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::bad_request("name is required"));
    }
    if price.is_some_and(|p| p < 0) {
        return Err(AppError::bad_request("price cannot be negative"));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(AppError::bad_request("stock cannot be negative"));
    }
    Ok(())
}

/// Public catalogue: live items with the discount in effect right now.
pub async fn list_menus(state: &AppState, query: MenuQuery) -> AppResult<ApiResponse<MenuList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(menus::Column::DeletedAt.is_null());
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        condition = condition.add(
            Expr::expr(Func::lower(Expr::col(menus::Column::Name)))
                .like(format!("%{}%", q.to_lowercase())),
        );
    }
    if let Some(category) = query.category {
        condition = condition.add(menus::Column::Category.eq(category));
    }
    if let Some(stan_id) = query.stan_id {
        condition = condition.add(menus::Column::StanId.eq(stan_id));
    }
    if query.available_only {
        condition = condition.add(menus::Column::IsAvailable.eq(true));
    }

    let finder = Menus::find()
        .filter(condition)
        .order_by_asc(menus::Column::Name);
    let total = finder.clone().count(&state.orm).await? as i64;
    let rows = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let discounts = resolve_for_menus(&state.orm, &rows, Utc::now()).await?;
    let items = rows
        .into_iter()
        .map(|menu| {
            let discount = discounts.get(&menu.id);
            priced_menu(menu, discount)
        })
        .collect();

    Ok(ApiResponse::success(
        "Menus",
        MenuList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_menu(state: &AppState, id: Uuid) -> AppResult<ApiResponse<MenuWithDiscount>> {
    let menu = Menus::find_by_id(id)
        .filter(menus::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut discounts = resolve_for_menus(&state.orm, std::slice::from_ref(&menu), Utc::now()).await?;
    let discount = discounts.remove(&menu.id);

    Ok(ApiResponse::success(
        "OK",
        priced_menu(menu, discount.as_ref()),
        Some(Meta::empty()),
    ))
}

pub async fn create_menu(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMenuRequest,
) -> AppResult<ApiResponse<Menu>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;
    validate_menu_fields(Some(&payload.name), Some(payload.price), Some(payload.stock))?;

    let tenant = resolve_tenant(&state.orm, user).await?;
    let stan_id = match (tenant, payload.stan_id) {
        (Tenant::Stan(own), None) => own,
        (Tenant::Stan(own), Some(id)) if id == own => own,
        (Tenant::Platform, Some(id)) => id,
        (Tenant::Platform, None) => return Err(AppError::bad_request("stan_id is required")),
        _ => return Err(AppError::Forbidden),
    };
    let stan = Stans::find_by_id(stan_id)
        .filter(stans::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let menu = MenuActive {
        id: Set(Uuid::new_v4()),
        stan_id: Set(stan.id),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        price: Set(payload.price),
        category: Set(payload.category),
        photo: Set(payload.photo),
        stock: Set(payload.stock),
        is_available: Set(payload.stock > 0),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user,
        "create_menu",
        format!("created menu '{}' at stan '{}'", menu.name, stan.name),
    )
    .await;

    Ok(ApiResponse::success(
        "Menu created",
        Menu::from(menu),
        Some(Meta::empty()),
    ))
}

pub async fn update_menu(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMenuRequest,
) -> AppResult<ApiResponse<Menu>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;
    validate_menu_fields(payload.name.as_deref(), payload.price, None)?;

    let existing = Menus::find_by_id(id)
        .filter(menus::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    resolve_tenant(&state.orm, user)
        .await?
        .ensure_can_access(ResourceOwner::Stan(existing.stan_id))?;

    let mut active: MenuActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(photo) = payload.photo {
        active.photo = Set(Some(photo));
    }
    active.updated_at = Set(Utc::now().into());
    let menu = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user,
        "update_menu",
        format!("updated menu '{}'", menu.name),
    )
    .await;

    Ok(ApiResponse::success(
        "Menu updated",
        Menu::from(menu),
        Some(Meta::empty()),
    ))
}

/// Soft delete; cart lines pointing at the item go with it.
pub async fn delete_menu(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Menu>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;

    let txn = state.orm.begin().await?;
    let existing = Menus::find_by_id(id)
        .filter(menus::Column::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    resolve_tenant(&txn, user)
        .await?
        .ensure_can_access(ResourceOwner::Stan(existing.stan_id))?;

    let now = Utc::now();
    let mut active: MenuActive = existing.into();
    active.deleted_at = Set(Some(now.into()));
    active.is_available = Set(false);
    active.updated_at = Set(now.into());
    let menu = active.update(&txn).await?;

    CartItems::delete_many()
        .filter(cart_items::Column::MenuId.eq(menu.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user,
        "delete_menu",
        format!("deleted menu '{}'", menu.name),
    )
    .await;

    Ok(ApiResponse::success(
        "Menu deleted",
        Menu::from(menu),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_field_validation() {
        assert!(validate_menu_fields(Some("Es Teh"), Some(3_000), Some(0)).is_ok());
        assert!(validate_menu_fields(None, None, None).is_ok());
        assert!(validate_menu_fields(Some(" "), None, None).is_err());
        assert!(validate_menu_fields(None, Some(-1), None).is_err());
        assert!(validate_menu_fields(None, None, Some(-3)).is_err());
    }
}
