use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::coupons::{CreateManageRequest, ManageList},
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::Manage,
    policy::{self, Action},
    response::{ApiResponse, Meta},
    services::coupon_service,
};

pub async fn create(
    pool: &DbPool,
    caller: &AuthMember,
    payload: CreateManageRequest,
) -> AppResult<ApiResponse<Manage>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;
    coupon_service::get_coupon(pool, payload.coupon_id).await?;

    let existing: Option<Manage> =
        sqlx::query_as("SELECT * FROM manage WHERE admin_id = $1 AND coupon_id = $2")
            .bind(caller.member_id)
            .bind(payload.coupon_id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "Coupon is already managed by this admin".into(),
        ));
    }

    let link: Manage =
        sqlx::query_as("INSERT INTO manage (admin_id, coupon_id) VALUES ($1, $2) RETURNING *")
            .bind(caller.member_id)
            .bind(payload.coupon_id)
            .fetch_one(pool)
            .await?;

    Ok(ApiResponse::success(
        "Coupon managed",
        link,
        Some(Meta::empty()),
    ))
}

pub async fn find_all(pool: &DbPool, caller: &AuthMember) -> AppResult<ApiResponse<ManageList>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;

    let items: Vec<Manage> = sqlx::query_as("SELECT * FROM manage ORDER BY admin_id, coupon_id")
        .fetch_all(pool)
        .await?;

    Ok(ApiResponse::success("Managed coupons", ManageList { items }, None))
}

pub async fn remove(
    pool: &DbPool,
    caller: &AuthMember,
    coupon_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    policy::ensure(caller, Action::RestrictionManage, None)?;

    let result = sqlx::query("DELETE FROM manage WHERE admin_id = $1 AND coupon_id = $2")
        .bind(caller.member_id)
        .bind(coupon_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Manage link not found".into()));
    }

    Ok(ApiResponse::success(
        "Coupon unmanaged",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
