use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        activity_logs::{ActivityStats, CleanLogsResult},
        reports::{RevenueReport, StanRevenue, StanStatistics, StanStatisticsList},
        stans::CreateStanRequest,
        users::{UpdateRoleRequest, UserList},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Stan, User},
    response::ApiResponse,
    routes::params::{CleanLogsQuery, DateRangeQuery, UserQuery},
    services::{activity_log_service, report_service, stan_service, user_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/role", put(change_role))
        .route("/stans", post(create_stan))
        .route("/stans/{id}", delete(delete_stan))
        .route("/reports/revenue", get(revenue_report))
        .route("/reports/stans", get(list_stan_statistics))
        .route("/reports/stans/{id}", get(stan_statistics))
        .route("/reports/stans/{id}/revenue", get(stan_revenue))
        .route("/activity-logs", delete(clean_activity_logs))
        .route("/activity-logs/stats", get(activity_stats))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserQuery),
    responses(
        (status = 200, description = "All live users", body = ApiResponse<UserList>),
        (status = 403, description = "Superadmin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    Ok(Json(user_service::list_users(&state, &user, query).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = ApiResponse<User>),
        (status = 400, description = "Cannot change your own role"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn change_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(user_service::change_role(&state, &user, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated", body = ApiResponse<User>),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(user_service::delete_user(&state, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/stans",
    request_body = CreateStanRequest,
    responses(
        (status = 201, description = "Stan created for a vendor admin", body = ApiResponse<Stan>),
        (status = 409, description = "User already owns a stan")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_stan(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateStanRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Stan>>)> {
    let resp = stan_service::create_stan(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/stans/{id}",
    params(("id" = Uuid, Path, description = "Stan ID")),
    responses(
        (status = 200, description = "Stan deactivated", body = ApiResponse<Stan>),
        (status = 404, description = "Stan not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_stan(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Stan>>> {
    Ok(Json(stan_service::delete_stan(&state, &user, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/revenue",
    params(DateRangeQuery),
    responses((status = 200, description = "Platform revenue per stan", body = ApiResponse<RevenueReport>)),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn revenue_report(
    State(state): State<AppState>,
    user: AuthUser,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<Json<ApiResponse<RevenueReport>>> {
    Ok(Json(
        report_service::get_revenue_report(&state, &user, range).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/stans",
    params(DateRangeQuery),
    responses((status = 200, description = "Statistics for every stan", body = ApiResponse<StanStatisticsList>)),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_stan_statistics(
    State(state): State<AppState>,
    user: AuthUser,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<Json<ApiResponse<StanStatisticsList>>> {
    Ok(Json(
        report_service::list_stan_statistics(&state, &user, range).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/stans/{id}",
    params(("id" = Uuid, Path, description = "Stan ID"), DateRangeQuery),
    responses(
        (status = 200, description = "Menu and order statistics of one stan", body = ApiResponse<StanStatistics>),
        (status = 404, description = "Stan not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn stan_statistics(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<Json<ApiResponse<StanStatistics>>> {
    Ok(Json(
        report_service::get_stan_statistics(&state, &user, id, range).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/stans/{id}/revenue",
    params(("id" = Uuid, Path, description = "Stan ID"), DateRangeQuery),
    responses(
        (status = 200, description = "Revenue of one stan", body = ApiResponse<StanRevenue>),
        (status = 404, description = "Stan not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn stan_revenue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<Json<ApiResponse<StanRevenue>>> {
    Ok(Json(
        report_service::get_stan_revenue(&state, &user, Some(id), range).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/activity-logs/stats",
    responses((status = 200, description = "Activity counters", body = ApiResponse<ActivityStats>)),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn activity_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ActivityStats>>> {
    Ok(Json(
        activity_log_service::get_activity_stats(&state, &user).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/activity-logs",
    params(CleanLogsQuery),
    responses(
        (status = 200, description = "Old activity logs removed", body = ApiResponse<CleanLogsResult>),
        (status = 400, description = "Negative retention")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn clean_activity_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CleanLogsQuery>,
) -> AppResult<Json<ApiResponse<CleanLogsResult>>> {
    Ok(Json(
        activity_log_service::clean_old_logs(&state, &user, query).await?,
    ))
}
