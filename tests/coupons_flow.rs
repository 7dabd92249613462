mod common;

use chrono::{Duration, Utc};
use obs_backend::{
    dto::{
        claims::CreateClaimRequest,
        coupons::CreateCouponRequest,
        subscriptions::CreateSubscriptionRequest,
    },
    error::AppError,
    services::{claim_service, coupon_service, subscription_service},
};

fn coupon_request(code: &str, valid_date: Option<chrono::DateTime<Utc>>) -> CreateCouponRequest {
    CreateCouponRequest {
        amount: Some(100),
        valid_date,
        discount: 0.9,
        description: format!("{code} promotion"),
        redemption_code: code.into(),
    }
}

// Coupon code uniqueness, one-claim-per-pair, expiry, and the live
// subscriber count moving by exactly one in each direction.
#[tokio::test]
async fn claims_and_subscription_counts_flow() -> anyhow::Result<()> {
    let pool = match common::setup_pool().await? {
        Some(pool) => pool,
        None => return Ok(()),
    };

    let shop =
        common::register_merchant(&pool, "shop1", "Shop1", "shop1@example.com", "0944000001")
            .await?;
    let user = common::register_user(&pool, "claimer", "claimer@example.com", "0944000002").await?;

    coupon_service::create(&pool, &shop.auth, coupon_request("SAVE10", None)).await?;

    let dup_code = coupon_service::create(&pool, &shop.auth, coupon_request("SAVE10", None)).await;
    match dup_code {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "Redemption code already exists"),
        other => panic!("expected Conflict, got {other:?}"),
    }

    // First claim lands; the second for the same (user, coupon) conflicts.
    let claim = claim_service::create(
        &pool,
        &user.auth,
        CreateClaimRequest {
            redemption_code: "SAVE10".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(claim.user_id, user.id);
    assert_eq!(claim.state, 0);

    let again = claim_service::create(
        &pool,
        &user.auth,
        CreateClaimRequest {
            redemption_code: "SAVE10".into(),
        },
    )
    .await;
    match again {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "You have already claimed this coupon"),
        other => panic!("expected Conflict, got {other:?}"),
    }

    // An expired coupon can no longer be claimed.
    coupon_service::create(
        &pool,
        &shop.auth,
        coupon_request("LATE10", Some(Utc::now() - Duration::days(1))),
    )
    .await?;
    let expired = claim_service::create(
        &pool,
        &user.auth,
        CreateClaimRequest {
            redemption_code: "LATE10".into(),
        },
    )
    .await;
    match expired {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "Coupon is expired"),
        other => panic!("expected Conflict, got {other:?}"),
    }

    // Unknown code is NotFound, not Conflict.
    let unknown = claim_service::create(
        &pool,
        &user.auth,
        CreateClaimRequest {
            redemption_code: "NOPE".into(),
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    // Subscribing moves the live count from 0 to 1; duplicates conflict.
    let count_now = subscription_service::count_by_merchant(&pool, shop.id).await?;
    assert_eq!(count_now.data.unwrap().subscriber_count, 0);

    subscription_service::create(
        &pool,
        &user.auth,
        CreateSubscriptionRequest {
            merchant_id: shop.id,
            state: Some(1),
        },
    )
    .await?;
    let count_now = subscription_service::count_by_merchant(&pool, shop.id).await?;
    assert_eq!(count_now.data.unwrap().subscriber_count, 1);

    let dup_sub = subscription_service::create(
        &pool,
        &user.auth,
        CreateSubscriptionRequest {
            merchant_id: shop.id,
            state: None,
        },
    )
    .await;
    assert!(matches!(dup_sub, Err(AppError::Conflict(_))));
    let count_now = subscription_service::count_by_merchant(&pool, shop.id).await?;
    assert_eq!(count_now.data.unwrap().subscriber_count, 1);

    // Unsubscribing drops the count back to 0 and stays there.
    subscription_service::remove(&pool, &user.auth, user.id, shop.id).await?;
    let count_now = subscription_service::count_by_merchant(&pool, shop.id).await?;
    assert_eq!(count_now.data.unwrap().subscriber_count, 0);

    let gone = subscription_service::remove(&pool, &user.auth, user.id, shop.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
    let count_now = subscription_service::count_by_merchant(&pool, shop.id).await?;
    assert_eq!(count_now.data.unwrap().subscriber_count, 0);

    Ok(())
}
