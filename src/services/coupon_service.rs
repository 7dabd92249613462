use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::coupons::{CouponList, CreateCouponRequest, UpdateCouponRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::Coupon,
    policy::{self, Action},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

/// Coupons are always owned by their issuer: a merchant issues shop coupons,
/// an admin storewide ones.
pub async fn create(
    pool: &DbPool,
    caller: &AuthMember,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    policy::ensure(caller, Action::CouponIssue, None)?;

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM coupons WHERE redemption_code = $1")
            .bind(&payload.redemption_code)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Redemption code already exists".into()));
    }

    let coupon: Coupon = sqlx::query_as(
        r#"
        INSERT INTO coupons (id, amount, valid_date, discount, description,
                             redemption_code, owner_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.amount.unwrap_or(1))
    .bind(payload.valid_date)
    .bind(payload.discount)
    .bind(&payload.description)
    .bind(&payload.redemption_code)
    .bind(caller.member_id)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Coupon created",
        coupon,
        Some(Meta::empty()),
    ))
}

pub async fn find_all(pool: &DbPool, pagination: Pagination) -> AppResult<ApiResponse<CouponList>> {
    let (page, limit, offset) = pagination.normalize();

    let items: Vec<Coupon> =
        sqlx::query_as("SELECT * FROM coupons ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
        .fetch_one(pool)
        .await?;

    let meta = Meta::paged(page, limit, total);
    Ok(ApiResponse::success("Coupons", CouponList { items }, Some(meta)))
}

pub async fn find_mine(pool: &DbPool, caller: &AuthMember) -> AppResult<ApiResponse<CouponList>> {
    let items: Vec<Coupon> =
        sqlx::query_as("SELECT * FROM coupons WHERE owner_id = $1 ORDER BY created_at DESC")
            .bind(caller.member_id)
            .fetch_all(pool)
            .await?;

    Ok(ApiResponse::success("Coupons", CouponList { items }, None))
}

pub async fn find_by_id(
    pool: &DbPool,
    caller: &AuthMember,
    id: Uuid,
) -> AppResult<ApiResponse<Coupon>> {
    let coupon = get_coupon(pool, id).await?;
    policy::ensure(caller, Action::CouponManage, Some(coupon.owner_id))?;
    Ok(ApiResponse::success("Coupon", coupon, None))
}

pub async fn update(
    pool: &DbPool,
    caller: &AuthMember,
    id: Uuid,
    patch: UpdateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    let coupon = get_coupon(pool, id).await?;
    policy::ensure(caller, Action::CouponManage, Some(coupon.owner_id))?;

    let updated: Coupon = sqlx::query_as(
        r#"
        UPDATE coupons SET
            amount = COALESCE($2, amount),
            valid_date = COALESCE($3, valid_date),
            discount = COALESCE($4, discount),
            description = COALESCE($5, description),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(coupon.id)
    .bind(patch.amount)
    .bind(patch.valid_date)
    .bind(patch.discount)
    .bind(patch.description)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Coupon updated",
        updated,
        Some(Meta::empty()),
    ))
}

pub async fn remove(
    pool: &DbPool,
    caller: &AuthMember,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let coupon = get_coupon(pool, id).await?;
    policy::ensure(caller, Action::CouponManage, Some(coupon.owner_id))?;

    sqlx::query("DELETE FROM coupons WHERE id = $1")
        .bind(coupon.id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Coupon deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn get_coupon(pool: &DbPool, id: Uuid) -> AppResult<Coupon> {
    let coupon: Option<Coupon> = sqlx::query_as("SELECT * FROM coupons WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    coupon.ok_or_else(|| AppError::NotFound(format!("Coupon with ID {id} not found")))
}
