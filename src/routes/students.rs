use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::students::UpdateStudentRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Student,
    response::ApiResponse,
    services::student_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(my_profile).put(update_my_profile))
}

#[utoipa::path(
    get,
    path = "/api/students/me",
    responses(
        (status = 200, description = "Profile of the current student", body = ApiResponse<Student>),
        (status = 403, description = "Caller has no student profile")
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn my_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Student>>> {
    Ok(Json(student_service::my_profile(&state, &user).await?))
}

#[utoipa::path(
    put,
    path = "/api/students/me",
    request_body = UpdateStudentRequest,
    responses((status = 200, description = "Profile updated", body = ApiResponse<Student>)),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn update_my_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateStudentRequest>,
) -> AppResult<Json<ApiResponse<Student>>> {
    Ok(Json(
        student_service::update_my_profile(&state, &user, payload).await?,
    ))
}
