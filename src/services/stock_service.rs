use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    audit,
    db::OrmConn,
    dto::menus::{AdjustStockRequest, SetAvailabilityRequest, SetStockRequest, StockList},
    entity::{
        menus::{self, ActiveModel as MenuActive, Entity as Menus},
        users::UserRole,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::Menu,
    response::{ApiResponse, Meta},
    routes::params::LowStockQuery,
    services::ownership::{ResourceOwner, resolve_tenant},
    state::AppState,
};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// `current + delta`, floored at zero.
pub fn floored_stock(current: i32, delta: i32) -> i32 {
    (i64::from(current) + i64::from(delta)).clamp(0, i64::from(i32::MAX)) as i32
}

async fn lock_menu<C: ConnectionTrait>(conn: &C, menu_id: Uuid) -> AppResult<menus::Model> {
    Menus::find_by_id(menu_id)
        .filter(menus::Column::DeletedAt.is_null())
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

async fn write_stock<C: ConnectionTrait>(
    conn: &C,
    menu: menus::Model,
    stock: i32,
) -> AppResult<menus::Model> {
    let mut active: MenuActive = menu.into();
    active.stock = Set(stock);
    active.is_available = Set(stock > 0);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(conn).await?)
}

/// Locked read-modify-write of one item's stock. Must run inside a
/// transaction so the row lock lives until commit.
pub async fn apply_stock_delta<C: ConnectionTrait>(
    conn: &C,
    menu_id: Uuid,
    delta: i32,
) -> AppResult<menus::Model> {
    let menu = lock_menu(conn, menu_id).await?;
    let stock = floored_stock(menu.stock, delta);
    write_stock(conn, menu, stock).await
}

pub async fn adjust_stock(db: &OrmConn, menu_id: Uuid, delta: i32) -> AppResult<menus::Model> {
    let txn = db.begin().await?;
    let menu = apply_stock_delta(&txn, menu_id, delta).await?;
    txn.commit().await?;
    Ok(menu)
}

pub async fn set_stock(db: &OrmConn, menu_id: Uuid, quantity: i32) -> AppResult<menus::Model> {
    if quantity < 0 {
        return Err(AppError::bad_request("stock cannot be negative"));
    }
    let txn = db.begin().await?;
    let menu = lock_menu(&txn, menu_id).await?;
    let menu = write_stock(&txn, menu, quantity).await?;
    txn.commit().await?;
    Ok(menu)
}

async fn authorize_menu(state: &AppState, user: &AuthUser, menu_id: Uuid) -> AppResult<()> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;
    let menu = Menus::find_by_id(menu_id)
        .filter(menus::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    resolve_tenant(&state.orm, user)
        .await?
        .ensure_can_access(ResourceOwner::Stan(menu.stan_id))
}

pub async fn adjust_menu_stock(
    state: &AppState,
    user: &AuthUser,
    menu_id: Uuid,
    payload: AdjustStockRequest,
) -> AppResult<ApiResponse<Menu>> {
    if payload.delta == 0 {
        return Err(AppError::bad_request("delta must not be 0"));
    }
    authorize_menu(state, user, menu_id).await?;

    let menu = adjust_stock(&state.orm, menu_id, payload.delta).await?;

    audit::record(
        &state.pool,
        user,
        "adjust_stock",
        format!("adjusted stock of '{}' by {} to {}", menu.name, payload.delta, menu.stock),
    )
    .await;

    Ok(ApiResponse::success(
        "Stock adjusted",
        Menu::from(menu),
        Some(Meta::empty()),
    ))
}

pub async fn set_menu_stock(
    state: &AppState,
    user: &AuthUser,
    menu_id: Uuid,
    payload: SetStockRequest,
) -> AppResult<ApiResponse<Menu>> {
    if payload.stock < 0 {
        return Err(AppError::bad_request("stock cannot be negative"));
    }
    authorize_menu(state, user, menu_id).await?;

    let menu = set_stock(&state.orm, menu_id, payload.stock).await?;

    audit::record(
        &state.pool,
        user,
        "set_stock",
        format!("set stock of '{}' to {}", menu.name, menu.stock),
    )
    .await;

    Ok(ApiResponse::success(
        "Stock updated",
        Menu::from(menu),
        Some(Meta::empty()),
    ))
}

/// Force an item off sale, or back on when it still has stock.
pub async fn set_availability(
    state: &AppState,
    user: &AuthUser,
    menu_id: Uuid,
    payload: SetAvailabilityRequest,
) -> AppResult<ApiResponse<Menu>> {
    authorize_menu(state, user, menu_id).await?;

    let txn = state.orm.begin().await?;
    let menu = lock_menu(&txn, menu_id).await?;
    if payload.is_available && menu.stock <= 0 {
        return Err(AppError::bad_request(
            "an item without stock cannot be made available",
        ));
    }
    let mut active: MenuActive = menu.into();
    active.is_available = Set(payload.is_available);
    active.updated_at = Set(Utc::now().into());
    let menu = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user,
        "set_availability",
        format!("set '{}' available={}", menu.name, menu.is_available),
    )
    .await;

    Ok(ApiResponse::success(
        "Availability updated",
        Menu::from(menu),
        Some(Meta::empty()),
    ))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<StockList>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;
    let tenant = resolve_tenant(&state.orm, user).await?;
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all()
        .add(menus::Column::DeletedAt.is_null())
        .add(menus::Column::Stock.lte(threshold));
    if let Some(stan_id) = tenant.stan_id() {
        condition = condition.add(menus::Column::StanId.eq(stan_id));
    }

    let finder = Menus::find()
        .filter(condition)
        .order_by_asc(menus::Column::Stock)
        .order_by_desc(menus::Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Menu::from)
        .collect();

    Ok(ApiResponse::success(
        "Low stock",
        StockList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

#[cfg(test)]
mod tests {
    use super::floored_stock;

    #[test]
    fn delta_is_applied() {
        assert_eq!(floored_stock(10, -5), 5);
        assert_eq!(floored_stock(5, 5), 10);
    }

    #[test]
    fn never_goes_below_zero() {
        assert_eq!(floored_stock(3, -5), 0);
        assert_eq!(floored_stock(0, -1), 0);
        assert_eq!(floored_stock(0, i32::MIN), 0);
    }

    #[test]
    fn floor_breaks_the_inverse() {
        let after_drain = floored_stock(3, -5);
        assert_eq!(floored_stock(after_drain, 5), 5);
    }

    #[test]
    fn saturates_at_upper_bound() {
        assert_eq!(floored_stock(i32::MAX, 1), i32::MAX);
    }
}
