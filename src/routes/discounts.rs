use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::discounts::{
        AssignMenuRequest, CreateDiscountRequest, DiscountList, DiscountWithMenus,
        UpdateDiscountRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Discount,
    response::ApiResponse,
    routes::params::DiscountQuery,
    services::discount_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_discounts).post(create_discount))
        .route(
            "/{id}",
            get(get_discount).put(update_discount).delete(delete_discount),
        )
        .route("/{id}/menus", post(assign_menu))
        .route("/{id}/menus/{menu_id}", delete(unassign_menu))
}

#[utoipa::path(
    get,
    path = "/api/discounts",
    params(DiscountQuery),
    responses((status = 200, description = "Discounts visible to the caller", body = ApiResponse<DiscountList>)),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn list_discounts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DiscountQuery>,
) -> AppResult<Json<ApiResponse<DiscountList>>> {
    Ok(Json(discount_service::list_discounts(&state, &user, query).await?))
}

#[utoipa::path(
    post,
    path = "/api/discounts",
    request_body = CreateDiscountRequest,
    responses(
        (status = 201, description = "Discount created", body = ApiResponse<DiscountWithMenus>),
        (status = 400, description = "Invalid percentage, window or menu list"),
        (status = 403, description = "Scope not allowed for the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn create_discount(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateDiscountRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DiscountWithMenus>>)> {
    let resp = discount_service::create_discount(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/discounts/{id}",
    params(("id" = Uuid, Path, description = "Discount ID")),
    responses(
        (status = 200, description = "Discount with linked menus", body = ApiResponse<DiscountWithMenus>),
        (status = 404, description = "Discount not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn get_discount(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DiscountWithMenus>>> {
    Ok(Json(discount_service::get_discount(&state, &user, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/discounts/{id}",
    params(("id" = Uuid, Path, description = "Discount ID")),
    request_body = UpdateDiscountRequest,
    responses(
        (status = 200, description = "Discount updated", body = ApiResponse<Discount>),
        (status = 400, description = "Invalid percentage or window"),
        (status = 404, description = "Discount not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn update_discount(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDiscountRequest>,
) -> AppResult<Json<ApiResponse<Discount>>> {
    Ok(Json(
        discount_service::update_discount(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/discounts/{id}",
    params(("id" = Uuid, Path, description = "Discount ID")),
    responses(
        (status = 200, description = "Discount deleted", body = ApiResponse<Discount>),
        (status = 404, description = "Discount not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn delete_discount(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Discount>>> {
    Ok(Json(discount_service::delete_discount(&state, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/discounts/{id}/menus",
    params(("id" = Uuid, Path, description = "Discount ID")),
    request_body = AssignMenuRequest,
    responses(
        (status = 200, description = "Menu linked to the discount", body = ApiResponse<DiscountWithMenus>),
        (status = 400, description = "Discount is not menu-scoped")
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn assign_menu(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignMenuRequest>,
) -> AppResult<Json<ApiResponse<DiscountWithMenus>>> {
    Ok(Json(
        discount_service::assign_menu(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/discounts/{id}/menus/{menu_id}",
    params(
        ("id" = Uuid, Path, description = "Discount ID"),
        ("menu_id" = Uuid, Path, description = "Menu ID")
    ),
    responses(
        (status = 200, description = "Menu unlinked", body = ApiResponse<DiscountWithMenus>),
        (status = 400, description = "A menu discount needs at least one menu")
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn unassign_menu(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, menu_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<DiscountWithMenus>>> {
    Ok(Json(
        discount_service::unassign_menu(&state, &user, id, menu_id).await?,
    ))
}
