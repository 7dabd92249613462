use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::subscriptions::{
        CreateSubscriptionRequest, SubscriberCount, SubscriptionList, SubscriptionView,
        UpdateSubscriptionRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::MemberRole,
    policy::{self, Action},
    response::{ApiResponse, Meta},
    services::member_service,
};

pub async fn create(
    pool: &DbPool,
    caller: &AuthMember,
    payload: CreateSubscriptionRequest,
) -> AppResult<ApiResponse<SubscriptionView>> {
    policy::ensure(caller, Action::Subscribe, None)?;

    let user = member_service::get_member(pool, caller.member_id).await?;
    if user.role != MemberRole::User {
        return Err(AppError::Conflict(
            "Only users can subscribe to merchants".into(),
        ));
    }

    let merchant = member_service::get_member(pool, payload.merchant_id).await?;
    if merchant.role != MemberRole::Merchant {
        return Err(AppError::Conflict("Can only subscribe to merchants".into()));
    }

    let existing: Option<(i32,)> = sqlx::query_as(
        "SELECT state FROM subscriptions WHERE user_id = $1 AND merchant_id = $2",
    )
    .bind(caller.member_id)
    .bind(merchant.id)
    .fetch_optional(pool)
    .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Subscription already exists".into()));
    }

    let state = payload.state.unwrap_or(0);
    sqlx::query("INSERT INTO subscriptions (user_id, merchant_id, state) VALUES ($1, $2, $3)")
        .bind(caller.member_id)
        .bind(merchant.id)
        .bind(state)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Subscribed",
        SubscriptionView {
            user_id: caller.member_id,
            user_name: user.user_name,
            merchant_id: merchant.id,
            merchant_name: merchant.merchant_name,
            state,
        },
        Some(Meta::empty()),
    ))
}

pub async fn find_all(pool: &DbPool) -> AppResult<ApiResponse<SubscriptionList>> {
    let items = fetch_views(pool, None, None).await?;
    Ok(ApiResponse::success(
        "Subscriptions",
        SubscriptionList { items },
        None,
    ))
}

pub async fn find_one(
    pool: &DbPool,
    user_id: Uuid,
    merchant_id: Uuid,
) -> AppResult<ApiResponse<SubscriptionView>> {
    let view = get_view(pool, user_id, merchant_id).await?;
    Ok(ApiResponse::success("Subscription", view, None))
}

pub async fn find_by_user(pool: &DbPool, user_id: Uuid) -> AppResult<ApiResponse<SubscriptionList>> {
    let items = fetch_views(pool, Some(user_id), None).await?;
    Ok(ApiResponse::success(
        "Subscriptions",
        SubscriptionList { items },
        None,
    ))
}

pub async fn find_by_merchant(
    pool: &DbPool,
    merchant_id: Uuid,
) -> AppResult<ApiResponse<SubscriptionList>> {
    let items = fetch_views(pool, None, Some(merchant_id)).await?;
    Ok(ApiResponse::success(
        "Subscribers",
        SubscriptionList { items },
        None,
    ))
}

/// The subscriber count is always a live COUNT; there is no stored counter
/// to drift.
pub async fn count_by_merchant(
    pool: &DbPool,
    merchant_id: Uuid,
) -> AppResult<ApiResponse<SubscriberCount>> {
    let subscriber_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE merchant_id = $1")
            .bind(merchant_id)
            .fetch_one(pool)
            .await?;

    Ok(ApiResponse::success(
        "Subscriber count",
        SubscriberCount {
            merchant_id,
            subscriber_count,
        },
        None,
    ))
}

pub async fn update(
    pool: &DbPool,
    caller: &AuthMember,
    user_id: Uuid,
    merchant_id: Uuid,
    payload: UpdateSubscriptionRequest,
) -> AppResult<ApiResponse<SubscriptionView>> {
    policy::ensure(caller, Action::SubscriptionManage, Some(user_id))?;
    get_view(pool, user_id, merchant_id).await?;

    sqlx::query("UPDATE subscriptions SET state = $3 WHERE user_id = $1 AND merchant_id = $2")
        .bind(user_id)
        .bind(merchant_id)
        .bind(payload.state)
        .execute(pool)
        .await?;

    let view = get_view(pool, user_id, merchant_id).await?;
    Ok(ApiResponse::success(
        "Subscription updated",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn remove(
    pool: &DbPool,
    caller: &AuthMember,
    user_id: Uuid,
    merchant_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    policy::ensure(caller, Action::SubscriptionManage, Some(user_id))?;

    let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND merchant_id = $2")
        .bind(user_id)
        .bind(merchant_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Subscription not found for user {user_id} and merchant {merchant_id}"
        )));
    }

    Ok(ApiResponse::success(
        "Unsubscribed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn get_view(pool: &DbPool, user_id: Uuid, merchant_id: Uuid) -> AppResult<SubscriptionView> {
    let mut views = fetch_views(pool, Some(user_id), Some(merchant_id)).await?;
    if views.is_empty() {
        return Err(AppError::NotFound(format!(
            "Subscription not found for user {user_id} and merchant {merchant_id}"
        )));
    }
    Ok(views.remove(0))
}

async fn fetch_views(
    pool: &DbPool,
    user_id: Option<Uuid>,
    merchant_id: Option<Uuid>,
) -> AppResult<Vec<SubscriptionView>> {
    let views: Vec<SubscriptionView> = sqlx::query_as(
        r#"
        SELECT s.user_id, u.user_name, s.merchant_id, m.merchant_name, s.state
        FROM subscriptions s
        JOIN members u ON u.id = s.user_id
        JOIN members m ON m.id = s.merchant_id
        WHERE ($1::uuid IS NULL OR s.user_id = $1)
          AND ($2::uuid IS NULL OR s.merchant_id = $2)
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(merchant_id)
    .fetch_all(pool)
    .await?;
    Ok(views)
}
