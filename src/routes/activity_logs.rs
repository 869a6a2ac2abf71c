use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::activity_logs::ActivityLogList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::ActivityLog,
    response::ApiResponse,
    routes::params::ActivityLogQuery,
    services::activity_log_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_activity_logs))
        .route("/{id}", get(get_activity_log))
}

#[utoipa::path(
    get,
    path = "/api/activity-logs",
    params(ActivityLogQuery),
    responses((status = 200, description = "Own activity, or everyone's for superadmin", body = ApiResponse<ActivityLogList>)),
    security(("bearer_auth" = [])),
    tag = "Activity Logs"
)]
pub async fn list_activity_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ActivityLogQuery>,
) -> AppResult<Json<ApiResponse<ActivityLogList>>> {
    Ok(Json(
        activity_log_service::list_activity_logs(&state, &user, query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/activity-logs/{id}",
    params(("id" = Uuid, Path, description = "Activity log ID")),
    responses(
        (status = 200, description = "Activity log entry", body = ApiResponse<ActivityLog>),
        (status = 403, description = "Entry belongs to another user"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Activity Logs"
)]
pub async fn get_activity_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ActivityLog>>> {
    Ok(Json(
        activity_log_service::get_activity_log(&state, &user, id).await?,
    ))
}
