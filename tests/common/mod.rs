#![allow(dead_code)]

use obs_backend::{
    db::DbPool,
    dto::members::RegisterMemberRequest,
    middleware::auth::AuthMember,
    models::MemberRole,
    services::member_service,
};
use uuid::Uuid;

/// Connect, migrate and wipe every table. Returns None (and the caller
/// skips) when no database is configured in the environment.
pub async fn setup_pool() -> anyhow::Result<Option<DbPool>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = obs_backend::db::create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    sqlx::query(
        r#"
        TRUNCATE TABLE order_items, orders, cart_items, claims, manage, coupons,
                       subscriptions, favorites, reviews, restrict_user, restrict_merchant,
                       belongs_to, book_images, books, categories, audit_logs, members
        RESTART IDENTITY CASCADE
        "#,
    )
    .execute(&pool)
    .await?;

    Ok(Some(pool))
}

pub struct Registered {
    pub id: Uuid,
    pub auth: AuthMember,
}

pub async fn register_user(
    pool: &DbPool,
    account: &str,
    email: &str,
    phone: &str,
) -> anyhow::Result<Registered> {
    register(
        pool,
        RegisterMemberRequest {
            email: email.into(),
            account: account.into(),
            password: "secret123".into(),
            phone_number: phone.into(),
            role: MemberRole::User,
            user_name: Some(account.to_string()),
            level: None,
            merchant_name: None,
            merchant_address: None,
        },
    )
    .await
}

pub async fn register_merchant(
    pool: &DbPool,
    account: &str,
    shop_name: &str,
    email: &str,
    phone: &str,
) -> anyhow::Result<Registered> {
    register(
        pool,
        RegisterMemberRequest {
            email: email.into(),
            account: account.into(),
            password: "secret123".into(),
            phone_number: phone.into(),
            role: MemberRole::Merchant,
            user_name: None,
            level: None,
            merchant_name: Some(shop_name.into()),
            merchant_address: Some("1 Market Street".into()),
        },
    )
    .await
}

pub async fn register_admin(
    pool: &DbPool,
    account: &str,
    email: &str,
    phone: &str,
) -> anyhow::Result<Registered> {
    register(
        pool,
        RegisterMemberRequest {
            email: email.into(),
            account: account.into(),
            password: "secret123".into(),
            phone_number: phone.into(),
            role: MemberRole::Admin,
            user_name: None,
            level: None,
            merchant_name: None,
            merchant_address: None,
        },
    )
    .await
}

async fn register(pool: &DbPool, request: RegisterMemberRequest) -> anyhow::Result<Registered> {
    let view = member_service::register(pool, request)
        .await
        .map_err(|e| anyhow::anyhow!("register failed: {e}"))?
        .data
        .expect("member view");

    Ok(Registered {
        id: view.id,
        auth: AuthMember {
            member_id: view.id,
            account: view.account,
            role: view.role,
        },
    })
}
