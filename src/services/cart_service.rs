use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, CartLine, CartMenu, CartView, UpdateCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
    response::{ApiResponse, Empty, Meta},
    services::ownership::require_student,
    state::AppState,
};

#[derive(FromRow)]
struct CartWithMenuRow {
    cart_id: Uuid,
    quantity: i32,
    menu_id: Uuid,
    stan_id: Uuid,
    name: String,
    price: i64,
    stock: i32,
    is_available: bool,
}

#[derive(FromRow)]
struct CartTotalsRow {
    total_items: i64,
    total_price: i64,
}

/// Add `quantity` of a menu item, merging into the existing line for the pair.
/// Stock is not checked here; checkout does that.
pub async fn add_item(
    pool: &DbPool,
    student_id: Uuid,
    menu_id: Uuid,
    quantity: i32,
) -> AppResult<CartItem> {
    if quantity <= 0 {
        return Err(AppError::bad_request("quantity must be greater than 0"));
    }

    let menu_exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM menus WHERE id = $1 AND deleted_at IS NULL")
            .bind(menu_id)
            .fetch_optional(pool)
            .await?;
    if menu_exists.is_none() {
        return Err(AppError::NotFound);
    }

    let item = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items (id, student_id, menu_id, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (student_id, menu_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity, updated_at = NOW()
        RETURNING id, student_id, menu_id, quantity, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(menu_id)
    .bind(quantity)
    .fetch_one(pool)
    .await?;

    Ok(item)
}

async fn find_line(pool: &DbPool, student_id: Uuid, line_id: Uuid) -> AppResult<CartItem> {
    let line = sqlx::query_as::<_, CartItem>(
        "SELECT id, student_id, menu_id, quantity, created_at, updated_at FROM cart_items WHERE id = $1",
    )
    .bind(line_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    if line.student_id != student_id {
        return Err(AppError::Forbidden);
    }
    Ok(line)
}

pub async fn update_line(
    pool: &DbPool,
    student_id: Uuid,
    line_id: Uuid,
    quantity: i32,
) -> AppResult<CartItem> {
    if quantity < 1 {
        return Err(AppError::bad_request("quantity must be at least 1"));
    }
    find_line(pool, student_id, line_id).await?;

    let item = sqlx::query_as::<_, CartItem>(
        r#"
        UPDATE cart_items
        SET quantity = $3, updated_at = NOW()
        WHERE id = $1 AND student_id = $2
        RETURNING id, student_id, menu_id, quantity, created_at, updated_at
        "#,
    )
    .bind(line_id)
    .bind(student_id)
    .bind(quantity)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(item)
}

pub async fn remove_line(pool: &DbPool, student_id: Uuid, line_id: Uuid) -> AppResult<CartItem> {
    let line = find_line(pool, student_id, line_id).await?;

    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND student_id = $2")
        .bind(line_id)
        .bind(student_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(line)
}

/// Delete every line of the student's cart, returning how many went.
pub async fn clear(pool: &DbPool, student_id: Uuid) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE student_id = $1")
        .bind(student_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// `(total quantity, total at live list prices)`.
pub async fn cart_totals(pool: &DbPool, student_id: Uuid) -> AppResult<(i64, i64)> {
    let row = sqlx::query_as::<_, CartTotalsRow>(
        r#"
        SELECT COALESCE(SUM(ci.quantity), 0)::BIGINT AS total_items,
               COALESCE(SUM(ci.quantity::BIGINT * m.price), 0)::BIGINT AS total_price
        FROM cart_items ci
        JOIN menus m ON m.id = ci.menu_id
        WHERE ci.student_id = $1
        "#,
    )
    .bind(student_id)
    .fetch_one(pool)
    .await?;
    Ok((row.total_items, row.total_price))
}

pub async fn load_cart(pool: &DbPool, student_id: Uuid) -> AppResult<CartView> {
    let rows = sqlx::query_as::<_, CartWithMenuRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity,
               m.id AS menu_id, m.stan_id, m.name, m.price, m.stock, m.is_available
        FROM cart_items ci
        JOIN menus m ON m.id = ci.menu_id
        WHERE ci.student_id = $1
        ORDER BY m.stan_id, ci.created_at
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    let (total_items, total_price) = cart_totals(pool, student_id).await?;

    let items = rows
        .into_iter()
        .map(|row| CartLine {
            id: row.cart_id,
            subtotal: i64::from(row.quantity) * row.price,
            quantity: row.quantity,
            menu: CartMenu {
                id: row.menu_id,
                stan_id: row.stan_id,
                name: row.name,
                price: row.price,
                stock: row.stock,
                is_available: row.is_available,
            },
        })
        .collect();

    Ok(CartView {
        items,
        total_items,
        total_price,
    })
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let student = require_student(&state.orm, user).await?;
    let cart = load_cart(&state.pool, student.id).await?;
    Ok(ApiResponse::success("OK", cart, None))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let student = require_student(&state.orm, user).await?;
    let item = add_item(&state.pool, student.id, payload.menu_id, payload.quantity).await?;

    audit::record(
        &state.pool,
        user,
        "add_to_cart",
        format!("added {} x menu {} to cart", payload.quantity, payload.menu_id),
    )
    .await;

    Ok(ApiResponse::success("Added to cart", item, Some(Meta::empty())))
}

pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let student = require_student(&state.orm, user).await?;
    let item = update_line(&state.pool, student.id, line_id, payload.quantity).await?;

    audit::record(
        &state.pool,
        user,
        "update_cart",
        format!("set cart line {} to {}", item.id, item.quantity),
    )
    .await;

    Ok(ApiResponse::success("Cart updated", item, Some(Meta::empty())))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<Empty>> {
    let student = require_student(&state.orm, user).await?;
    let line = remove_line(&state.pool, student.id, line_id).await?;

    audit::record(
        &state.pool,
        user,
        "remove_from_cart",
        format!("removed menu {} from cart", line.menu_id),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from cart",
        Empty::default(),
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Empty>> {
    let student = require_student(&state.orm, user).await?;
    let removed = clear(&state.pool, student.id).await?;

    audit::record(
        &state.pool,
        user,
        "clear_cart",
        format!("cleared {removed} cart lines"),
    )
    .await;

    Ok(ApiResponse::success(
        "Cart cleared",
        Empty::default(),
        Some(Meta::empty()),
    ))
}
