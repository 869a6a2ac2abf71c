mod common;

use canteen_api::{
    dto::users::UpdateRoleRequest,
    entity::users::UserRole,
    error::AppError,
    services::{stan_service, user_service},
};

#[tokio::test]
async fn role_change_waits_for_the_stan_to_go() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let superadmin = common::create_user(&state, UserRole::Superadmin).await?;
    let (vendor, stan) = common::create_vendor(&state).await?;

    let err = user_service::change_role(
        &state,
        &superadmin,
        vendor.user_id,
        UpdateRoleRequest { role: UserRole::Siswa },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    stan_service::delete_stan(&state, &superadmin, stan.id).await?;
    let updated = user_service::change_role(
        &state,
        &superadmin,
        vendor.user_id,
        UpdateRoleRequest { role: UserRole::Siswa },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.role, UserRole::Siswa);
    Ok(())
}

#[tokio::test]
async fn student_with_profile_keeps_role() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let superadmin = common::create_user(&state, UserRole::Superadmin).await?;
    let (siswa, _) = common::create_student(&state).await?;
    let bare = common::create_user(&state, UserRole::AdminStan).await?;

    let err = user_service::change_role(
        &state,
        &superadmin,
        siswa.user_id,
        UpdateRoleRequest { role: UserRole::AdminStan },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let updated = user_service::change_role(
        &state,
        &superadmin,
        bare.user_id,
        UpdateRoleRequest { role: UserRole::Siswa },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.role, UserRole::Siswa);
    Ok(())
}
