use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    audit,
    db::OrmConn,
    dto::orders::{CheckoutRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
    entity::{
        cart_items::{self, Entity as CartItems},
        menus::{self, Entity as Menus},
        order_items::{self, ActiveModel as OrderItemActive, Entity as OrderItems},
        orders::{self, ActiveModel as OrderActive, Entity as Orders, OrderStatus},
        stans::{self, Entity as Stans},
        users::UserRole,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Order, OrderItem},
    response::{ApiResponse, Empty, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{
        discount_service::{apply_percentage, resolve_for_menus},
        ownership::{ResourceOwner, Tenant, require_student, resolve_tenant},
        stock_service::apply_stock_delta,
    },
    state::AppState,
};

/// Check a requested status change against the forward-only lifecycle.
pub fn check_transition(current: OrderStatus, target: OrderStatus) -> AppResult<OrderStatus> {
    if current.can_transition_to(target) {
        Ok(target)
    } else {
        Err(AppError::Conflict(format!(
            "cannot move order from {current} to {target}"
        )))
    }
}

fn order_owner(order: &orders::Model) -> ResourceOwner {
    ResourceOwner::Order {
        stan_id: order.stan_id,
        student_id: order.student_id,
    }
}

/// Turn the student's cart lines for `stan_id` into an order, all in one
/// transaction: snapshot prices and discounts, write the order and its lines,
/// take the stock, drop those cart lines.
pub async fn place_order(
    db: &OrmConn,
    student_id: Uuid,
    stan_id: Uuid,
    at: DateTime<Utc>,
) -> AppResult<OrderWithItems> {
    let txn = db.begin().await?;

    let stan = Stans::find_by_id(stan_id)
        .filter(stans::Column::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    // Locked until commit: a concurrent merge into these lines waits, then
    // inserts a fresh line once they are gone.
    let cart = CartItems::find()
        .filter(cart_items::Column::StudentId.eq(student_id))
        .order_by_asc(cart_items::Column::CreatedAt)
        .order_by_asc(cart_items::Column::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    if cart.is_empty() {
        return Err(AppError::EmptyCart);
    }

    // Lock in id order so concurrent checkouts touching the same items queue up.
    let menu_ids: Vec<Uuid> = cart.iter().map(|line| line.menu_id).collect();
    let locked: HashMap<Uuid, menus::Model> = Menus::find()
        .filter(menus::Column::Id.is_in(menu_ids))
        .filter(menus::Column::StanId.eq(stan.id))
        .order_by_asc(menus::Column::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|menu| (menu.id, menu))
        .collect();

    let lines: Vec<(cart_items::Model, menus::Model)> = cart
        .into_iter()
        .filter_map(|line| locked.get(&line.menu_id).cloned().map(|menu| (line, menu)))
        .collect();
    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    for (line, menu) in &lines {
        if menu.deleted_at.is_some() {
            return Err(AppError::NotFound);
        }
        if !menu.is_available || menu.stock < line.quantity {
            return Err(AppError::InsufficientStock(menu.id));
        }
    }

    let priced: Vec<menus::Model> = lines.iter().map(|(_, menu)| menu.clone()).collect();
    let discounts = resolve_for_menus(&txn, &priced, at).await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        stan_id: Set(stan.id),
        student_id: Set(student_id),
        status: Set(OrderStatus::Unconfirmed),
        ordered_at: Set(at.into()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (line, menu) in &lines {
        let discount = discounts.get(&menu.id);
        let purchase_price = discount
            .map(|d| apply_percentage(menu.price, d.percentage))
            .unwrap_or(menu.price);

        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_id: Set(menu.id),
            quantity: Set(line.quantity),
            unit_price: Set(menu.price),
            purchase_price: Set(purchase_price),
            discount_name: Set(discount.map(|d| d.name.clone()).unwrap_or_default()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(OrderItem::from(item));

        apply_stock_delta(&txn, menu.id, -line.quantity).await?;
    }

    CartItems::delete_many()
        .filter(cart_items::Column::Id.is_in(lines.iter().map(|(line, _)| line.id)))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::debug!(order_id = %order.id, lines = items.len(), "order placed");
    Ok(OrderWithItems::new(Order::from(order), items))
}

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let student = require_student(&state.orm, user).await?;
    let placed = place_order(&state.orm, student.id, payload.stan_id, Utc::now()).await?;

    audit::record(
        &state.pool,
        user,
        "checkout",
        format!(
            "placed order {} with {} items totalling {}",
            placed.order.id,
            placed.items.len(),
            placed.total
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        placed,
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let tenant = resolve_tenant(&state.orm, user).await?;

    let mut condition = Condition::all();
    match tenant {
        Tenant::Platform => {}
        Tenant::Stan(id) => condition = condition.add(orders::Column::StanId.eq(id)),
        Tenant::Student(id) => condition = condition.add(orders::Column::StudentId.eq(id)),
    }
    if let Some(status) = query.status {
        condition = condition.add(orders::Column::Status.eq(status));
    }
    if let Some(from) = query.from {
        condition = condition.add(orders::Column::OrderedAt.gte(from));
    }
    if let Some(to) = query.to {
        condition = condition.add(orders::Column::OrderedAt.lte(to));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or_default() {
        SortOrder::Asc => finder.order_by_asc(orders::Column::OrderedAt),
        SortOrder::Desc => finder.order_by_desc(orders::Column::OrderedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

async fn order_items(state: &AppState, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    let items = OrderItems::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .order_by_asc(order_items::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();
    Ok(items)
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    resolve_tenant(&state.orm, user)
        .await?
        .ensure_can_access(order_owner(&order))?;

    let items = order_items(state, order.id).await?;
    Ok(ApiResponse::success(
        "OK",
        OrderWithItems::new(Order::from(order), items),
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    resolve_tenant(&txn, user)
        .await?
        .ensure_can_access(order_owner(&existing))?;

    let previous = existing.status;
    let next = check_transition(previous, payload.status)?;

    let mut active: OrderActive = existing.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user,
        "update_order_status",
        format!("order {} moved from {previous} to {next}", order.id),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

/// Hard delete of an order and its lines.
pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Empty>> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    resolve_tenant(&txn, user)
        .await?
        .ensure_can_access(order_owner(&existing))?;

    OrderItems::delete_many()
        .filter(order_items::Column::OrderId.eq(existing.id))
        .exec(&txn)
        .await?;
    Orders::delete_by_id(existing.id).exec(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user,
        "delete_order",
        format!("deleted order {}", existing.id),
    )
    .await;

    Ok(ApiResponse::success(
        "Order deleted",
        Empty::default(),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transition_is_accepted() {
        assert_eq!(
            check_transition(OrderStatus::Unconfirmed, OrderStatus::Cooking).unwrap(),
            OrderStatus::Cooking
        );
    }

    #[test]
    fn illegal_transition_is_a_conflict() {
        let err = check_transition(OrderStatus::Cooking, OrderStatus::Unconfirmed).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(
            err.to_string(),
            "Conflict: cannot move order from cooking to unconfirmed"
        );
        assert!(check_transition(OrderStatus::Delivered, OrderStatus::Delivered).is_err());
    }
}
