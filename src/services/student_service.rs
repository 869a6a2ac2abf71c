use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};

use crate::{
    audit,
    dto::students::UpdateStudentRequest,
    entity::students::ActiveModel as StudentActive,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Student,
    response::{ApiResponse, Meta},
    services::ownership::require_student,
    state::AppState,
};

pub async fn my_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Student>> {
    let student = require_student(&state.orm, user).await?;
    Ok(ApiResponse::success(
        "OK",
        Student::from(student),
        Some(Meta::empty()),
    ))
}

pub async fn update_my_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateStudentRequest,
) -> AppResult<ApiResponse<Student>> {
    let student = require_student(&state.orm, user).await?;
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::bad_request("name cannot be empty"));
    }

    let mut active: StudentActive = student.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(photo) = payload.photo {
        active.photo = Set(Some(photo));
    }
    active.updated_at = Set(Utc::now().into());
    let student = active.update(&state.orm).await?;

    audit::record(&state.pool, user, "update_profile", "updated student profile").await;

    Ok(ApiResponse::success(
        "Profile updated",
        Student::from(student),
        Some(Meta::empty()),
    ))
}
