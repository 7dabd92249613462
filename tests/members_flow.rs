mod common;

use obs_backend::{
    dto::members::{LoginRequest, RegisterMemberRequest, UpdateMemberRequest},
    error::AppError,
    models::MemberRole,
    services::member_service,
};

fn empty_patch() -> UpdateMemberRequest {
    UpdateMemberRequest {
        email: None,
        account: None,
        password: None,
        phone_number: None,
        user_name: None,
        level: None,
        user_state: None,
        merchant_name: None,
        merchant_address: None,
        merchant_state: None,
    }
}

// Registration uniqueness, login, role-field isolation and deletion in one
// sequential flow against a real database.
#[tokio::test]
async fn register_login_update_and_delete_flow() -> anyhow::Result<()> {
    let pool = match common::setup_pool().await? {
        Some(pool) => pool,
        None => return Ok(()),
    };

    let alice = common::register_user(&pool, "alice", "alice@example.com", "0911000001").await?;
    let admin = common::register_admin(&pool, "root", "root@example.com", "0911000009").await?;

    // Same account again: Conflict("Account already exists").
    let dup = member_service::register(
        &pool,
        RegisterMemberRequest {
            email: "other@example.com".into(),
            account: "alice".into(),
            password: "secret123".into(),
            phone_number: "0911000002".into(),
            role: MemberRole::User,
            user_name: Some("Alice Two".into()),
            level: None,
            merchant_name: None,
            merchant_address: None,
        },
    )
    .await;
    match dup {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "Account already exists"),
        other => panic!("expected Conflict, got {other:?}"),
    }

    // Login succeeds with the right password and issues a bearer token.
    let login = member_service::login(
        &pool,
        LoginRequest {
            account: "alice".into(),
            password: "secret123".into(),
        },
    )
    .await?;
    assert!(!login.data.unwrap().access_token.is_empty());

    // Wrong password and unknown account both yield the same 401 shape.
    for (account, password) in [("alice", "wrong"), ("nobody", "secret123")] {
        let failed = member_service::login(
            &pool,
            LoginRequest {
                account: account.into(),
                password: password.into(),
            },
        )
        .await;
        match failed {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid account or password"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    // A user may rename themselves but never receive merchant fields.
    let mut rename = empty_patch();
    rename.user_name = Some("Alice Liddell".into());
    let updated = member_service::update(&pool, &alice.auth, alice.id, rename).await?;
    assert_eq!(updated.data.unwrap().user_name.as_deref(), Some("Alice Liddell"));

    let mut cross_role = empty_patch();
    cross_role.merchant_name = Some("Sneaky Shop".into());
    let rejected = member_service::update(&pool, &alice.auth, alice.id, cross_role).await;
    assert!(matches!(rejected, Err(AppError::Conflict(_))));

    // Only self or admin may touch the record.
    let mut foreign = empty_patch();
    foreign.user_name = Some("Mallory".into());
    let forbidden = member_service::update(&pool, &alice.auth, admin.id, foreign).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden(_))));

    // Admin hard-deletes the account; a second lookup is NotFound.
    member_service::remove(&pool, &admin.auth, alice.id).await?;
    let gone = member_service::find_by_id(&pool, alice.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));

    Ok(())
}
