use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::restrictions::{
        CreateRestrictMerchantRequest, CreateRestrictUserRequest, RestrictMerchantList,
        RestrictUserList, UpdateRestrictionRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::{MemberRole, RestrictMerchant, RestrictUser},
    policy::{self, Action},
    response::{ApiResponse, Meta},
    services::member_service,
};

/// Records an admin-imposed state change on a user account. Re-restricting
/// the same user by the same admin overwrites that admin's record.
pub async fn create_user_restriction(
    pool: &DbPool,
    caller: &AuthMember,
    payload: CreateRestrictUserRequest,
) -> AppResult<ApiResponse<RestrictUser>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;
    ensure_target_role(pool, payload.user_id, MemberRole::User).await?;

    let record: RestrictUser = sqlx::query_as(
        r#"
        INSERT INTO restrict_user (admin_id, user_id, original_state, latest_state)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (admin_id, user_id)
        DO UPDATE SET original_state = EXCLUDED.original_state,
                      latest_state = EXCLUDED.latest_state,
                      created_at = now()
        RETURNING *
        "#,
    )
    .bind(caller.member_id)
    .bind(payload.user_id)
    .bind(payload.original_state)
    .bind(payload.latest_state)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(caller.member_id),
        "restrict_user",
        Some("restrict_user"),
        Some(serde_json::json!({
            "user_id": payload.user_id,
            "latest_state": payload.latest_state,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User restricted",
        record,
        Some(Meta::empty()),
    ))
}

pub async fn find_all_user_restrictions(
    pool: &DbPool,
    caller: &AuthMember,
) -> AppResult<ApiResponse<RestrictUserList>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;

    let items: Vec<RestrictUser> =
        sqlx::query_as("SELECT * FROM restrict_user ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;

    Ok(ApiResponse::success(
        "Restrictions",
        RestrictUserList { items },
        None,
    ))
}

pub async fn find_user_restrictions(
    pool: &DbPool,
    caller: &AuthMember,
    user_id: Uuid,
) -> AppResult<ApiResponse<RestrictUserList>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;

    let items: Vec<RestrictUser> =
        sqlx::query_as("SELECT * FROM restrict_user WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    Ok(ApiResponse::success(
        "Restrictions",
        RestrictUserList { items },
        None,
    ))
}

pub async fn update_user_restriction(
    pool: &DbPool,
    caller: &AuthMember,
    user_id: Uuid,
    patch: UpdateRestrictionRequest,
) -> AppResult<ApiResponse<RestrictUser>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;

    let updated: Option<RestrictUser> = sqlx::query_as(
        r#"
        UPDATE restrict_user SET
            original_state = COALESCE($3, original_state),
            latest_state = COALESCE($4, latest_state)
        WHERE admin_id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(caller.member_id)
    .bind(user_id)
    .bind(patch.original_state)
    .bind(patch.latest_state)
    .fetch_optional(pool)
    .await?;

    let updated = updated
        .ok_or_else(|| AppError::NotFound(format!("RestrictUser for user {user_id} not found")))?;

    Ok(ApiResponse::success(
        "Restriction updated",
        updated,
        Some(Meta::empty()),
    ))
}

pub async fn remove_user_restriction(
    pool: &DbPool,
    caller: &AuthMember,
    user_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;

    let result = sqlx::query("DELETE FROM restrict_user WHERE admin_id = $1 AND user_id = $2")
        .bind(caller.member_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "RestrictUser for user {user_id} not found"
        )));
    }

    Ok(ApiResponse::success(
        "Restriction removed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn create_merchant_restriction(
    pool: &DbPool,
    caller: &AuthMember,
    payload: CreateRestrictMerchantRequest,
) -> AppResult<ApiResponse<RestrictMerchant>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;
    ensure_target_role(pool, payload.merchant_id, MemberRole::Merchant).await?;

    let record: RestrictMerchant = sqlx::query_as(
        r#"
        INSERT INTO restrict_merchant (admin_id, merchant_id, original_state, latest_state)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (admin_id, merchant_id)
        DO UPDATE SET original_state = EXCLUDED.original_state,
                      latest_state = EXCLUDED.latest_state,
                      created_at = now()
        RETURNING *
        "#,
    )
    .bind(caller.member_id)
    .bind(payload.merchant_id)
    .bind(payload.original_state)
    .bind(payload.latest_state)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(caller.member_id),
        "restrict_merchant",
        Some("restrict_merchant"),
        Some(serde_json::json!({
            "merchant_id": payload.merchant_id,
            "latest_state": payload.latest_state,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Merchant restricted",
        record,
        Some(Meta::empty()),
    ))
}

pub async fn find_all_merchant_restrictions(
    pool: &DbPool,
    caller: &AuthMember,
) -> AppResult<ApiResponse<RestrictMerchantList>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;

    let items: Vec<RestrictMerchant> =
        sqlx::query_as("SELECT * FROM restrict_merchant ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;

    Ok(ApiResponse::success(
        "Restrictions",
        RestrictMerchantList { items },
        None,
    ))
}

pub async fn find_merchant_restrictions(
    pool: &DbPool,
    caller: &AuthMember,
    merchant_id: Uuid,
) -> AppResult<ApiResponse<RestrictMerchantList>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;

    let items: Vec<RestrictMerchant> = sqlx::query_as(
        "SELECT * FROM restrict_merchant WHERE merchant_id = $1 ORDER BY created_at DESC",
    )
    .bind(merchant_id)
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::success(
        "Restrictions",
        RestrictMerchantList { items },
        None,
    ))
}

pub async fn update_merchant_restriction(
    pool: &DbPool,
    caller: &AuthMember,
    merchant_id: Uuid,
    patch: UpdateRestrictionRequest,
) -> AppResult<ApiResponse<RestrictMerchant>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;

    let updated: Option<RestrictMerchant> = sqlx::query_as(
        r#"
        UPDATE restrict_merchant SET
            original_state = COALESCE($3, original_state),
            latest_state = COALESCE($4, latest_state)
        WHERE admin_id = $1 AND merchant_id = $2
        RETURNING *
        "#,
    )
    .bind(caller.member_id)
    .bind(merchant_id)
    .bind(patch.original_state)
    .bind(patch.latest_state)
    .fetch_optional(pool)
    .await?;

    let updated = updated.ok_or_else(|| {
        AppError::NotFound(format!("RestrictMerchant for merchant {merchant_id} not found"))
    })?;

    Ok(ApiResponse::success(
        "Restriction updated",
        updated,
        Some(Meta::empty()),
    ))
}

pub async fn remove_merchant_restriction(
    pool: &DbPool,
    caller: &AuthMember,
    merchant_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;

    let result =
        sqlx::query("DELETE FROM restrict_merchant WHERE admin_id = $1 AND merchant_id = $2")
            .bind(caller.member_id)
            .bind(merchant_id)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "RestrictMerchant for merchant {merchant_id} not found"
        )));
    }

    Ok(ApiResponse::success(
        "Restriction removed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn ensure_target_role(pool: &DbPool, target: Uuid, role: MemberRole) -> AppResult<()> {
    let member = member_service::get_member(pool, target).await?;
    if member.role != role {
        return Err(AppError::Forbidden(format!(
            "Target member is not a {role}"
        )));
    }
    Ok(())
}
