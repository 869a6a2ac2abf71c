use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::{
        discounts::DiscountList,
        menus::MenuList,
        reports::StanRevenue,
        stans::{PaymentSettingsRequest, StanList, UpdateStanRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Stan,
    response::ApiResponse,
    routes::params::{DateRangeQuery, MenuQuery, Pagination},
    services::{discount_service, report_service, stan_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stans))
        .route("/me", get(my_stan).put(update_my_stan))
        .route("/me/payment", put(update_payment_settings))
        .route("/me/revenue", get(my_revenue))
        .route("/{id}", get(get_stan))
        .route("/{id}/menus", get(stan_menus))
        .route("/{id}/discounts", get(stan_discounts))
}

#[utoipa::path(
    get,
    path = "/api/stans",
    params(Pagination),
    responses((status = 200, description = "List stans", body = ApiResponse<StanList>)),
    tag = "Stans"
)]
pub async fn list_stans(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<StanList>>> {
    Ok(Json(stan_service::list_stans(&state, pagination).await?))
}

#[utoipa::path(
    get,
    path = "/api/stans/{id}",
    params(("id" = Uuid, Path, description = "Stan ID")),
    responses(
        (status = 200, description = "Stan", body = ApiResponse<Stan>),
        (status = 404, description = "Stan not found")
    ),
    tag = "Stans"
)]
pub async fn get_stan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Stan>>> {
    Ok(Json(stan_service::get_stan(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/stans/{id}/menus",
    params(("id" = Uuid, Path, description = "Stan ID"), MenuQuery),
    responses(
        (status = 200, description = "Menu of a stan with current discounts", body = ApiResponse<MenuList>),
        (status = 404, description = "Stan not found")
    ),
    tag = "Stans"
)]
pub async fn stan_menus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<MenuList>>> {
    Ok(Json(stan_service::list_stan_menus(&state, id, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/stans/{id}/discounts",
    params(("id" = Uuid, Path, description = "Stan ID")),
    responses(
        (status = 200, description = "Discounts running at the stan now", body = ApiResponse<DiscountList>),
        (status = 404, description = "Stan not found")
    ),
    tag = "Stans"
)]
pub async fn stan_discounts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DiscountList>>> {
    Ok(Json(
        discount_service::list_active_for_stan(&state, id, Utc::now()).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/stans/me",
    responses(
        (status = 200, description = "Caller's stan", body = ApiResponse<Stan>),
        (status = 403, description = "Caller has no stan")
    ),
    security(("bearer_auth" = [])),
    tag = "Stans"
)]
pub async fn my_stan(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Stan>>> {
    Ok(Json(stan_service::my_stan(&state, &user).await?))
}

#[utoipa::path(
    put,
    path = "/api/stans/me",
    request_body = UpdateStanRequest,
    responses((status = 200, description = "Stan updated", body = ApiResponse<Stan>)),
    security(("bearer_auth" = [])),
    tag = "Stans"
)]
pub async fn update_my_stan(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateStanRequest>,
) -> AppResult<Json<ApiResponse<Stan>>> {
    Ok(Json(stan_service::update_my_stan(&state, &user, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/stans/me/payment",
    request_body = PaymentSettingsRequest,
    responses(
        (status = 200, description = "Payment settings updated", body = ApiResponse<Stan>),
        (status = 400, description = "Invalid settings")
    ),
    security(("bearer_auth" = [])),
    tag = "Stans"
)]
pub async fn update_payment_settings(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PaymentSettingsRequest>,
) -> AppResult<Json<ApiResponse<Stan>>> {
    Ok(Json(
        stan_service::update_payment_settings(&state, &user, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/stans/me/revenue",
    params(DateRangeQuery),
    responses((status = 200, description = "Revenue of the caller's stan", body = ApiResponse<StanRevenue>)),
    security(("bearer_auth" = [])),
    tag = "Stans"
)]
pub async fn my_revenue(
    State(state): State<AppState>,
    user: AuthUser,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<Json<ApiResponse<StanRevenue>>> {
    Ok(Json(
        report_service::get_stan_revenue(&state, &user, None, range).await?,
    ))
}
