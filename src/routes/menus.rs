use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::menus::{
        AdjustStockRequest, CreateMenuRequest, MenuList, MenuWithDiscount, SetAvailabilityRequest,
        SetStockRequest, StockList, UpdateMenuRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Menu,
    response::ApiResponse,
    routes::params::{LowStockQuery, MenuQuery},
    services::{menu_service, stock_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menus).post(create_menu))
        .route("/low-stock", get(low_stock))
        .route(
            "/{id}",
            get(get_menu).put(update_menu).delete(delete_menu),
        )
        .route("/{id}/stock", put(set_stock))
        .route("/{id}/stock/adjust", post(adjust_stock))
        .route("/{id}/availability", put(set_availability))
}

#[utoipa::path(
    get,
    path = "/api/menus",
    params(MenuQuery),
    responses((status = 200, description = "List menu items with current discounts", body = ApiResponse<MenuList>)),
    tag = "Menus"
)]
pub async fn list_menus(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<MenuList>>> {
    Ok(Json(menu_service::list_menus(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/menus/{id}",
    params(("id" = Uuid, Path, description = "Menu ID")),
    responses(
        (status = 200, description = "Menu item", body = ApiResponse<MenuWithDiscount>),
        (status = 404, description = "Menu not found")
    ),
    tag = "Menus"
)]
pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MenuWithDiscount>>> {
    Ok(Json(menu_service::get_menu(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/menus",
    request_body = CreateMenuRequest,
    responses(
        (status = 201, description = "Menu created", body = ApiResponse<Menu>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Not allowed for this stan")
    ),
    security(("bearer_auth" = [])),
    tag = "Menus"
)]
pub async fn create_menu(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMenuRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Menu>>)> {
    let resp = menu_service::create_menu(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/menus/{id}",
    params(("id" = Uuid, Path, description = "Menu ID")),
    request_body = UpdateMenuRequest,
    responses(
        (status = 200, description = "Menu updated", body = ApiResponse<Menu>),
        (status = 403, description = "Menu belongs to another stan"),
        (status = 404, description = "Menu not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Menus"
)]
pub async fn update_menu(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMenuRequest>,
) -> AppResult<Json<ApiResponse<Menu>>> {
    Ok(Json(menu_service::update_menu(&state, &user, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/menus/{id}",
    params(("id" = Uuid, Path, description = "Menu ID")),
    responses(
        (status = 200, description = "Menu deleted", body = ApiResponse<Menu>),
        (status = 404, description = "Menu not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Menus"
)]
pub async fn delete_menu(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Menu>>> {
    Ok(Json(menu_service::delete_menu(&state, &user, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/menus/{id}/stock",
    params(("id" = Uuid, Path, description = "Menu ID")),
    request_body = SetStockRequest,
    responses(
        (status = 200, description = "Stock set", body = ApiResponse<Menu>),
        (status = 400, description = "Negative stock")
    ),
    security(("bearer_auth" = [])),
    tag = "Menus"
)]
pub async fn set_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStockRequest>,
) -> AppResult<Json<ApiResponse<Menu>>> {
    Ok(Json(
        stock_service::set_menu_stock(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/menus/{id}/stock/adjust",
    params(("id" = Uuid, Path, description = "Menu ID")),
    request_body = AdjustStockRequest,
    responses((status = 200, description = "Stock adjusted, floored at zero", body = ApiResponse<Menu>)),
    security(("bearer_auth" = [])),
    tag = "Menus"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockRequest>,
) -> AppResult<Json<ApiResponse<Menu>>> {
    Ok(Json(
        stock_service::adjust_menu_stock(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/menus/{id}/availability",
    params(("id" = Uuid, Path, description = "Menu ID")),
    request_body = SetAvailabilityRequest,
    responses(
        (status = 200, description = "Availability updated", body = ApiResponse<Menu>),
        (status = 400, description = "No stock to make available")
    ),
    security(("bearer_auth" = [])),
    tag = "Menus"
)]
pub async fn set_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetAvailabilityRequest>,
) -> AppResult<Json<ApiResponse<Menu>>> {
    Ok(Json(
        stock_service::set_availability(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/menus/low-stock",
    params(LowStockQuery),
    responses((status = 200, description = "Items at or below the threshold", body = ApiResponse<StockList>)),
    security(("bearer_auth" = [])),
    tag = "Menus"
)]
pub async fn low_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<StockList>>> {
    Ok(Json(stock_service::list_low_stock(&state, &user, query).await?))
}
