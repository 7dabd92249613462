use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::claims::{ClaimList, ClaimWithCoupon, CreateClaimRequest, UpdateClaimRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::{Claim, Coupon},
    policy::{self, Action},
    response::{ApiResponse, Meta},
};

/// Redeem a coupon by its code: once per user, never after expiry. The
/// composite (user, coupon) key backs the duplicate check at the storage
/// layer, so a racing second claim fails with 409 instead of slipping in.
pub async fn create(
    pool: &DbPool,
    caller: &AuthMember,
    payload: CreateClaimRequest,
) -> AppResult<ApiResponse<Claim>> {
    policy::ensure(caller, Action::ClaimCoupon, None)?;

    let coupon: Option<Coupon> =
        sqlx::query_as("SELECT * FROM coupons WHERE redemption_code = $1")
            .bind(&payload.redemption_code)
            .fetch_optional(pool)
            .await?;
    let coupon = coupon.ok_or_else(|| {
        AppError::NotFound("Coupon not found for this redemption code".into())
    })?;

    if coupon.is_expired(Utc::now()) {
        return Err(AppError::Conflict("Coupon is expired".into()));
    }

    let existing: Option<Claim> =
        sqlx::query_as("SELECT * FROM claims WHERE user_id = $1 AND coupon_id = $2")
            .bind(caller.member_id)
            .bind(coupon.id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "You have already claimed this coupon".into(),
        ));
    }

    let claim: Claim = sqlx::query_as(
        "INSERT INTO claims (user_id, coupon_id, state) VALUES ($1, $2, 0) RETURNING *",
    )
    .bind(caller.member_id)
    .bind(coupon.id)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(caller.member_id),
        "coupon_claim",
        Some("claims"),
        Some(serde_json::json!({ "coupon_id": coupon.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Coupon claimed", claim, Some(Meta::empty())))
}

pub async fn find_all(pool: &DbPool, caller: &AuthMember) -> AppResult<ApiResponse<ClaimList>> {
    // Owner-scoped with no owner: only admins pass.
    policy::ensure(caller, Action::ClaimManage, None)?;

    let items = claims_with_coupons(pool, None).await?;
    Ok(ApiResponse::success("Claims", ClaimList { items }, None))
}

pub async fn find_mine(pool: &DbPool, caller: &AuthMember) -> AppResult<ApiResponse<ClaimList>> {
    let items = claims_with_coupons(pool, Some(caller.member_id)).await?;
    Ok(ApiResponse::success("Claims", ClaimList { items }, None))
}

pub async fn update(
    pool: &DbPool,
    caller: &AuthMember,
    user_id: Uuid,
    coupon_id: Uuid,
    payload: UpdateClaimRequest,
) -> AppResult<ApiResponse<Claim>> {
    let claim = get_claim(pool, user_id, coupon_id).await?;
    policy::ensure(caller, Action::ClaimManage, Some(claim.user_id))?;

    // state 1 marks the claim as used and stamps the moment.
    let used_at = if payload.state == 1 { Some(Utc::now()) } else { None };

    let updated: Claim = sqlx::query_as(
        r#"
        UPDATE claims SET state = $3, used_at = $4
        WHERE user_id = $1 AND coupon_id = $2
        RETURNING *
        "#,
    )
    .bind(claim.user_id)
    .bind(claim.coupon_id)
    .bind(payload.state)
    .bind(used_at)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success("Claim updated", updated, Some(Meta::empty())))
}

pub async fn remove(
    pool: &DbPool,
    caller: &AuthMember,
    user_id: Uuid,
    coupon_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let claim = get_claim(pool, user_id, coupon_id).await?;
    policy::ensure(caller, Action::ClaimManage, Some(claim.user_id))?;

    sqlx::query("DELETE FROM claims WHERE user_id = $1 AND coupon_id = $2")
        .bind(claim.user_id)
        .bind(claim.coupon_id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Claim deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn get_claim(pool: &DbPool, user_id: Uuid, coupon_id: Uuid) -> AppResult<Claim> {
    let claim: Option<Claim> =
        sqlx::query_as("SELECT * FROM claims WHERE user_id = $1 AND coupon_id = $2")
            .bind(user_id)
            .bind(coupon_id)
            .fetch_optional(pool)
            .await?;
    claim.ok_or_else(|| AppError::NotFound("Claim not found".into()))
}

async fn claims_with_coupons(
    pool: &DbPool,
    user_id: Option<Uuid>,
) -> AppResult<Vec<ClaimWithCoupon>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        user_id: Uuid,
        coupon_id: Uuid,
        state: i32,
        used_at: Option<chrono::DateTime<Utc>>,
        claimed_at: chrono::DateTime<Utc>,
        #[sqlx(flatten)]
        coupon: Coupon,
    }

    let rows: Vec<Row> = sqlx::query_as(
        r#"
        SELECT cl.user_id, cl.coupon_id, cl.state, cl.used_at, cl.claimed_at, c.*
        FROM claims cl
        JOIN coupons c ON c.id = cl.coupon_id
        WHERE ($1::uuid IS NULL OR cl.user_id = $1)
        ORDER BY cl.claimed_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ClaimWithCoupon {
            claim: Claim {
                user_id: row.user_id,
                coupon_id: row.coupon_id,
                state: row.state,
                used_at: row.used_at,
                claimed_at: row.claimed_at,
            },
            coupon: row.coupon,
        })
        .collect())
}
