use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone,
    sea_query::{OnConflict, PostgresQueryBuilder, Query},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        discounts::{
            AssignMenuRequest, CreateDiscountRequest, DiscountList, DiscountWithMenus,
            UpdateDiscountRequest,
        },
        menus::{AppliedDiscount, MenuWithDiscount},
    },
    entity::{
        discounts::{self, ActiveModel as DiscountActive, DiscountScope, Entity as Discounts},
        menu_discounts::{self, Entity as MenuDiscounts},
        menus::{self, Entity as Menus},
        stans::{self, Entity as Stans},
        users::UserRole,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Discount, Menu},
    response::{ApiResponse, Meta},
    routes::params::DiscountQuery,
    services::ownership::{ResourceOwner, Tenant, resolve_tenant},
    state::AppState,
};

/// Price after taking `percentage` off, rounded to the nearest unit.
pub fn apply_percentage(price: i64, percentage: f64) -> i64 {
    let pct = percentage.clamp(0.0, 100.0);
    ((price as f64) * (100.0 - pct) / 100.0).round() as i64
}

/// Menu item view with its resolved discount and the price a buyer pays now.
pub fn priced_menu(menu: menus::Model, discount: Option<&discounts::Model>) -> MenuWithDiscount {
    let final_price = discount
        .map(|d| apply_percentage(menu.price, d.percentage))
        .unwrap_or(menu.price);
    MenuWithDiscount {
        menu: Menu::from(menu),
        discount: discount.map(|d| AppliedDiscount {
            id: d.id,
            name: d.name.clone(),
            percentage: d.percentage,
            scope: d.scope,
        }),
        final_price,
    }
}

pub fn validate_discount(
    name: &str,
    percentage: f64,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::bad_request("name is required"));
    }
    if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
        return Err(AppError::bad_request("percentage must be between 0 and 100"));
    }
    if starts_at > ends_at {
        return Err(AppError::bad_request("starts_at must not be after ends_at"));
    }
    Ok(())
}

/// Whether `discount` targets `menu` by scope. `linked` holds the ids of the
/// menu-scoped discounts attached to the item.
pub fn applies_to(discount: &discounts::Model, menu: &menus::Model, linked: &HashSet<Uuid>) -> bool {
    match discount.scope {
        DiscountScope::Global => true,
        DiscountScope::Stan => discount.stan_id == Some(menu.stan_id),
        DiscountScope::Menu => linked.contains(&discount.id),
    }
}

/// Most specific scope first, then the larger percentage, then the lowest id.
pub fn pick_discount(
    candidates: impl IntoIterator<Item = discounts::Model>,
    at: DateTime<Utc>,
) -> Option<discounts::Model> {
    let at: DateTimeWithTimeZone = at.into();
    candidates
        .into_iter()
        .filter(|d| d.is_active_at(at))
        .max_by(|a, b| {
            a.scope
                .specificity()
                .cmp(&b.scope.specificity())
                .then(a.percentage.total_cmp(&b.percentage))
                .then(b.id.cmp(&a.id))
        })
}

/// Resolve the discount in effect for each of `items` at `at`, keyed by menu id.
pub async fn resolve_for_menus<C: ConnectionTrait>(
    conn: &C,
    items: &[menus::Model],
    at: DateTime<Utc>,
) -> AppResult<HashMap<Uuid, discounts::Model>> {
    if items.is_empty() {
        return Ok(HashMap::new());
    }

    let menu_ids: Vec<Uuid> = items.iter().map(|m| m.id).collect();
    let stan_ids: Vec<Uuid> = items
        .iter()
        .map(|m| m.stan_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let links = MenuDiscounts::find()
        .filter(menu_discounts::Column::MenuId.is_in(menu_ids))
        .all(conn)
        .await?;
    let linked_ids: Vec<Uuid> = links.iter().map(|l| l.discount_id).collect();

    let mut scope = Condition::any()
        .add(discounts::Column::Scope.eq(DiscountScope::Global))
        .add(
            Condition::all()
                .add(discounts::Column::Scope.eq(DiscountScope::Stan))
                .add(discounts::Column::StanId.is_in(stan_ids)),
        );
    if !linked_ids.is_empty() {
        scope = scope.add(
            Condition::all()
                .add(discounts::Column::Scope.eq(DiscountScope::Menu))
                .add(discounts::Column::Id.is_in(linked_ids)),
        );
    }

    let now: DateTimeWithTimeZone = at.into();
    let candidates = Discounts::find()
        .filter(discounts::Column::DeletedAt.is_null())
        .filter(discounts::Column::StartsAt.lte(now))
        .filter(discounts::Column::EndsAt.gte(now))
        .filter(scope)
        .all(conn)
        .await?;

    let mut resolved = HashMap::new();
    for menu in items {
        let linked: HashSet<Uuid> = links
            .iter()
            .filter(|l| l.menu_id == menu.id)
            .map(|l| l.discount_id)
            .collect();
        let eligible = candidates
            .iter()
            .filter(|d| applies_to(d, menu, &linked))
            .cloned();
        if let Some(discount) = pick_discount(eligible, at) {
            resolved.insert(menu.id, discount);
        }
    }
    Ok(resolved)
}

/// The discount active for one live menu item at `at`, if any.
pub async fn resolve_active_discount<C: ConnectionTrait>(
    conn: &C,
    menu_id: Uuid,
    at: DateTime<Utc>,
) -> AppResult<Option<discounts::Model>> {
    let menu = Menus::find_by_id(menu_id)
        .filter(menus::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut resolved = resolve_for_menus(conn, std::slice::from_ref(&menu), at).await?;
    Ok(resolved.remove(&menu.id))
}

async fn find_live_discount<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<discounts::Model> {
    Discounts::find_by_id(id)
        .filter(discounts::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

async fn find_live_stan<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<stans::Model> {
    Stans::find_by_id(id)
        .filter(stans::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

async fn linked_menu_ids<C: ConnectionTrait>(conn: &C, discount_id: Uuid) -> AppResult<Vec<Uuid>> {
    let ids = MenuDiscounts::find()
        .select_only()
        .column(menu_discounts::Column::MenuId)
        .filter(menu_discounts::Column::DiscountId.eq(discount_id))
        .order_by_asc(menu_discounts::Column::CreatedAt)
        .into_tuple::<Uuid>()
        .all(conn)
        .await?;
    Ok(ids)
}

/// Every menu id must be a live item of `stan_id`.
async fn check_menus_belong_to<C: ConnectionTrait>(
    conn: &C,
    stan_id: Uuid,
    menu_ids: &[Uuid],
) -> AppResult<()> {
    let found = Menus::find()
        .filter(menus::Column::Id.is_in(menu_ids.iter().copied()))
        .filter(menus::Column::DeletedAt.is_null())
        .all(conn)
        .await?;
    for id in menu_ids {
        let menu = found
            .iter()
            .find(|m| m.id == *id)
            .ok_or_else(|| AppError::bad_request(format!("menu {id} does not exist")))?;
        if menu.stan_id != stan_id {
            return Err(AppError::bad_request(format!(
                "menu {id} does not belong to the discount's stan"
            )));
        }
    }
    Ok(())
}

async fn link_menu<C: ConnectionTrait>(conn: &C, discount_id: Uuid, menu_id: Uuid) -> AppResult<()> {
    let insert = Query::insert()
        .into_table(MenuDiscounts)
        .columns([
            menu_discounts::Column::Id,
            menu_discounts::Column::MenuId,
            menu_discounts::Column::DiscountId,
        ])
        .values_panic([Uuid::new_v4().into(), menu_id.into(), discount_id.into()])
        .on_conflict(
            OnConflict::columns([
                menu_discounts::Column::MenuId,
                menu_discounts::Column::DiscountId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .to_owned();
    let (sql, values) = insert.build(PostgresQueryBuilder);
    let stmt = sea_orm::Statement::from_sql_and_values(conn.get_database_backend(), sql, values);
    conn.execute(stmt).await?;
    Ok(())
}

/// Decide which stan a new stan- or menu-scoped discount belongs to.
fn target_stan(tenant: Tenant, requested: Option<Uuid>) -> AppResult<Uuid> {
    match (tenant, requested) {
        (Tenant::Stan(own), None) => Ok(own),
        (Tenant::Stan(own), Some(id)) if id == own => Ok(own),
        (Tenant::Stan(_), Some(_)) => Err(AppError::Forbidden),
        (Tenant::Platform, Some(id)) => Ok(id),
        (Tenant::Platform, None) => Err(AppError::bad_request("stan_id is required")),
        (Tenant::Student(_), _) => Err(AppError::Forbidden),
    }
}

pub async fn create_discount(
    state: &AppState,
    user: &AuthUser,
    payload: CreateDiscountRequest,
) -> AppResult<ApiResponse<DiscountWithMenus>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;
    validate_discount(
        &payload.name,
        payload.percentage,
        payload.starts_at,
        payload.ends_at,
    )?;

    let mut menu_ids = payload.menu_ids.clone();
    menu_ids.sort();
    menu_ids.dedup();

    let txn = state.orm.begin().await?;
    let tenant = resolve_tenant(&txn, user).await?;

    let stan_id = match payload.scope {
        DiscountScope::Global => {
            if !tenant.is_platform() {
                return Err(AppError::Forbidden);
            }
            if payload.stan_id.is_some() {
                return Err(AppError::bad_request(
                    "a global discount cannot reference a stan",
                ));
            }
            None
        }
        DiscountScope::Stan | DiscountScope::Menu => {
            let stan = find_live_stan(&txn, target_stan(tenant, payload.stan_id)?).await?;
            Some(stan.id)
        }
    };

    match (payload.scope, stan_id) {
        (DiscountScope::Menu, Some(stan_id)) => {
            if menu_ids.is_empty() {
                return Err(AppError::bad_request(
                    "a menu discount needs at least one menu item",
                ));
            }
            check_menus_belong_to(&txn, stan_id, &menu_ids).await?;
        }
        _ if !menu_ids.is_empty() => {
            return Err(AppError::bad_request(
                "menu_ids only apply to menu-scoped discounts",
            ));
        }
        _ => {}
    }

    let discount = DiscountActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        percentage: Set(payload.percentage),
        starts_at: Set(payload.starts_at.into()),
        ends_at: Set(payload.ends_at.into()),
        scope: Set(payload.scope),
        stan_id: Set(stan_id),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for menu_id in &menu_ids {
        link_menu(&txn, discount.id, *menu_id).await?;
    }

    txn.commit().await?;

    audit::record(
        &state.pool,
        user,
        "create_discount",
        format!(
            "created {} discount '{}' ({}%)",
            discount.scope.as_str(),
            discount.name,
            discount.percentage
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Discount created",
        DiscountWithMenus {
            discount: Discount::from(discount),
            menu_ids,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_discount(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<DiscountWithMenus>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;
    let discount = find_live_discount(&state.orm, id).await?;
    let tenant = resolve_tenant(&state.orm, user).await?;
    if discount.scope != DiscountScope::Global {
        tenant.ensure_can_access(ResourceOwner::of_discount(&discount))?;
    }

    let menu_ids = linked_menu_ids(&state.orm, discount.id).await?;
    Ok(ApiResponse::success(
        "OK",
        DiscountWithMenus {
            discount: Discount::from(discount),
            menu_ids,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_discount(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateDiscountRequest,
) -> AppResult<ApiResponse<Discount>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;

    let txn = state.orm.begin().await?;
    let existing = find_live_discount(&txn, id).await?;
    let tenant = resolve_tenant(&txn, user).await?;
    tenant.ensure_can_access(ResourceOwner::of_discount(&existing))?;

    let name = payload.name.unwrap_or_else(|| existing.name.clone());
    let percentage = payload.percentage.unwrap_or(existing.percentage);
    let starts_at = payload
        .starts_at
        .unwrap_or_else(|| existing.starts_at.with_timezone(&Utc));
    let ends_at = payload
        .ends_at
        .unwrap_or_else(|| existing.ends_at.with_timezone(&Utc));
    validate_discount(&name, percentage, starts_at, ends_at)?;

    let mut active: DiscountActive = existing.into();
    active.name = Set(name.trim().to_string());
    active.percentage = Set(percentage);
    active.starts_at = Set(starts_at.into());
    active.ends_at = Set(ends_at.into());
    active.updated_at = Set(Utc::now().into());
    let discount = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user,
        "update_discount",
        format!("updated discount '{}'", discount.name),
    )
    .await;

    Ok(ApiResponse::success(
        "Discount updated",
        Discount::from(discount),
        Some(Meta::empty()),
    ))
}

pub async fn delete_discount(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Discount>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;

    let existing = find_live_discount(&state.orm, id).await?;
    let tenant = resolve_tenant(&state.orm, user).await?;
    tenant.ensure_can_access(ResourceOwner::of_discount(&existing))?;

    let now = Utc::now();
    let mut active: DiscountActive = existing.into();
    active.deleted_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let discount = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user,
        "delete_discount",
        format!("deleted discount '{}'", discount.name),
    )
    .await;

    Ok(ApiResponse::success(
        "Discount deleted",
        Discount::from(discount),
        Some(Meta::empty()),
    ))
}

pub async fn assign_menu(
    state: &AppState,
    user: &AuthUser,
    discount_id: Uuid,
    payload: AssignMenuRequest,
) -> AppResult<ApiResponse<DiscountWithMenus>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;

    let txn = state.orm.begin().await?;
    let discount = find_live_discount(&txn, discount_id).await?;
    let tenant = resolve_tenant(&txn, user).await?;
    tenant.ensure_can_access(ResourceOwner::of_discount(&discount))?;

    let stan_id = match (discount.scope, discount.stan_id) {
        (DiscountScope::Menu, Some(stan_id)) => stan_id,
        _ => {
            return Err(AppError::bad_request(
                "only menu-scoped discounts can be linked to menu items",
            ));
        }
    };
    check_menus_belong_to(&txn, stan_id, &[payload.menu_id]).await?;
    link_menu(&txn, discount.id, payload.menu_id).await?;
    let menu_ids = linked_menu_ids(&txn, discount.id).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user,
        "assign_discount_menu",
        format!("linked menu {} to discount '{}'", payload.menu_id, discount.name),
    )
    .await;

    Ok(ApiResponse::success(
        "Menu linked",
        DiscountWithMenus {
            discount: Discount::from(discount),
            menu_ids,
        },
        Some(Meta::empty()),
    ))
}

pub async fn unassign_menu(
    state: &AppState,
    user: &AuthUser,
    discount_id: Uuid,
    menu_id: Uuid,
) -> AppResult<ApiResponse<DiscountWithMenus>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;

    let txn = state.orm.begin().await?;
    let discount = find_live_discount(&txn, discount_id).await?;
    let tenant = resolve_tenant(&txn, user).await?;
    tenant.ensure_can_access(ResourceOwner::of_discount(&discount))?;

    let linked = linked_menu_ids(&txn, discount.id).await?;
    if !linked.contains(&menu_id) {
        return Err(AppError::NotFound);
    }
    // The last link cannot go: a menu-scoped discount always targets something.
    if linked.len() == 1 {
        return Err(AppError::bad_request(
            "a menu discount needs at least one menu item",
        ));
    }

    MenuDiscounts::delete_many()
        .filter(menu_discounts::Column::DiscountId.eq(discount.id))
        .filter(menu_discounts::Column::MenuId.eq(menu_id))
        .exec(&txn)
        .await?;
    let menu_ids = linked_menu_ids(&txn, discount.id).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user,
        "unassign_discount_menu",
        format!("unlinked menu {menu_id} from discount '{}'", discount.name),
    )
    .await;

    Ok(ApiResponse::success(
        "Menu unlinked",
        DiscountWithMenus {
            discount: Discount::from(discount),
            menu_ids,
        },
        Some(Meta::empty()),
    ))
}

/// Superadmin sees every discount; a vendor admin sees the global ones and its own.
pub async fn list_discounts(
    state: &AppState,
    user: &AuthUser,
    query: DiscountQuery,
) -> AppResult<ApiResponse<DiscountList>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;
    let (page, limit, offset) = query.pagination().normalize();
    let tenant = resolve_tenant(&state.orm, user).await?;

    let mut condition = Condition::all().add(discounts::Column::DeletedAt.is_null());
    if let Some(own) = tenant.stan_id() {
        condition = condition.add(
            Condition::any()
                .add(discounts::Column::Scope.eq(DiscountScope::Global))
                .add(discounts::Column::StanId.eq(own)),
        );
    }
    if let Some(scope) = query.scope {
        condition = condition.add(discounts::Column::Scope.eq(scope));
    }
    if let Some(stan_id) = query.stan_id {
        condition = condition.add(discounts::Column::StanId.eq(stan_id));
    }

    let finder = Discounts::find()
        .filter(condition)
        .order_by_desc(discounts::Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Discount::from)
        .collect();

    Ok(ApiResponse::success(
        "Discounts",
        DiscountList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Discounts currently running at a stan: global ones plus its own.
pub async fn list_active_for_stan(
    state: &AppState,
    stan_id: Uuid,
    at: DateTime<Utc>,
) -> AppResult<ApiResponse<DiscountList>> {
    let stan = find_live_stan(&state.orm, stan_id).await?;
    let now: DateTimeWithTimeZone = at.into();

    let items: Vec<Discount> = Discounts::find()
        .filter(discounts::Column::DeletedAt.is_null())
        .filter(discounts::Column::StartsAt.lte(now))
        .filter(discounts::Column::EndsAt.gte(now))
        .filter(
            Condition::any()
                .add(discounts::Column::Scope.eq(DiscountScope::Global))
                .add(discounts::Column::StanId.eq(stan.id)),
        )
        .order_by_desc(discounts::Column::Percentage)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Discount::from)
        .collect();

    Ok(ApiResponse::success(
        "Active discounts",
        DiscountList { items },
        None,
    ))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    fn discount(scope: DiscountScope, pct: f64, stan_id: Option<Uuid>) -> discounts::Model {
        discounts::Model {
            id: Uuid::new_v4(),
            name: format!("{}-{pct}", scope.as_str()),
            percentage: pct,
            starts_at: t0().into(),
            ends_at: (t0() + Duration::days(30)).into(),
            scope,
            stan_id,
            created_at: t0().into(),
            updated_at: t0().into(),
            deleted_at: None,
        }
    }

    fn menu(stan_id: Uuid, price: i64) -> menus::Model {
        menus::Model {
            id: Uuid::new_v4(),
            stan_id,
            name: "Nasi Goreng".into(),
            description: None,
            price,
            category: menus::MenuCategory::Food,
            photo: None,
            stock: 10,
            is_available: true,
            created_at: t0().into(),
            updated_at: t0().into(),
            deleted_at: None,
        }
    }

    #[test]
    fn menu_scope_beats_global() {
        let stan = Uuid::new_v4();
        let global = discount(DiscountScope::Global, 5.0, None);
        let per_menu = discount(DiscountScope::Menu, 20.0, Some(stan));
        let at = t0() + Duration::days(3);
        let picked = pick_discount(vec![global, per_menu.clone()], at).unwrap();
        assert_eq!(picked.id, per_menu.id);
    }

    #[test]
    fn specificity_wins_over_percentage() {
        let stan = Uuid::new_v4();
        let global = discount(DiscountScope::Global, 50.0, None);
        let own = discount(DiscountScope::Stan, 10.0, Some(stan));
        let picked = pick_discount(vec![global, own.clone()], t0()).unwrap();
        assert_eq!(picked.id, own.id);
    }

    #[test]
    fn same_scope_prefers_larger_percentage_then_lowest_id() {
        let mut a = discount(DiscountScope::Global, 10.0, None);
        let mut b = discount(DiscountScope::Global, 10.0, None);
        a.id = Uuid::from_u128(2);
        b.id = Uuid::from_u128(1);
        let c = discount(DiscountScope::Global, 15.0, None);

        let picked = pick_discount(vec![a.clone(), b.clone()], t0()).unwrap();
        assert_eq!(picked.id, b.id);
        let picked = pick_discount(vec![a, b, c.clone()], t0()).unwrap();
        assert_eq!(picked.id, c.id);
    }

    #[test]
    fn window_is_inclusive_and_deleted_never_applies() {
        let d = discount(DiscountScope::Global, 5.0, None);
        assert!(pick_discount(vec![d.clone()], t0()).is_some());
        assert!(pick_discount(vec![d.clone()], t0() + Duration::days(30)).is_some());
        assert!(pick_discount(vec![d.clone()], t0() - Duration::seconds(1)).is_none());
        assert!(pick_discount(vec![d.clone()], t0() + Duration::days(31)).is_none());

        let mut gone = d;
        gone.deleted_at = Some(t0().into());
        assert!(pick_discount(vec![gone], t0()).is_none());
    }

    #[test]
    fn scope_matching() {
        let stan = Uuid::new_v4();
        let item = menu(stan, 10_000);
        let other_stan = discount(DiscountScope::Stan, 10.0, Some(Uuid::new_v4()));
        let own_stan = discount(DiscountScope::Stan, 10.0, Some(stan));
        let linked = discount(DiscountScope::Menu, 10.0, Some(stan));
        let unlinked = discount(DiscountScope::Menu, 10.0, Some(stan));
        let links: HashSet<Uuid> = [linked.id].into_iter().collect();

        assert!(!applies_to(&other_stan, &item, &links));
        assert!(applies_to(&own_stan, &item, &links));
        assert!(applies_to(&linked, &item, &links));
        assert!(!applies_to(&unlinked, &item, &links));
    }

    #[test]
    fn percentage_pricing_rounds() {
        assert_eq!(apply_percentage(10_000, 20.0), 8_000);
        assert_eq!(apply_percentage(10_000, 0.0), 10_000);
        assert_eq!(apply_percentage(10_000, 100.0), 0);
        assert_eq!(apply_percentage(999, 12.5), 874);
    }

    #[test]
    fn priced_menu_uses_discount() {
        let item = menu(Uuid::new_v4(), 12_000);
        let d = discount(DiscountScope::Global, 25.0, None);
        let view = priced_menu(item.clone(), Some(&d));
        assert_eq!(view.final_price, 9_000);
        assert_eq!(view.discount.unwrap().id, d.id);
        assert_eq!(priced_menu(item, None).final_price, 12_000);
    }

    #[test]
    fn validation_rules() {
        let start = t0();
        let end = t0() + Duration::days(1);
        assert!(validate_discount("Promo", 0.0, start, end).is_ok());
        assert!(validate_discount("Promo", 100.0, start, start).is_ok());
        assert!(matches!(
            validate_discount("Promo", 10.0, end, start),
            Err(AppError::BadRequest(_))
        ));
        assert!(validate_discount("Promo", 100.5, start, end).is_err());
        assert!(validate_discount("Promo", -1.0, start, end).is_err());
        assert!(validate_discount("Promo", f64::NAN, start, end).is_err());
        assert!(validate_discount("  ", 10.0, start, end).is_err());
    }

    #[test]
    fn target_stan_rules() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert_eq!(target_stan(Tenant::Stan(own), None).unwrap(), own);
        assert!(matches!(
            target_stan(Tenant::Stan(own), Some(other)),
            Err(AppError::Forbidden)
        ));
        assert_eq!(target_stan(Tenant::Platform, Some(other)).unwrap(), other);
        assert!(matches!(
            target_stan(Tenant::Platform, None),
            Err(AppError::BadRequest(_))
        ));
    }
}
