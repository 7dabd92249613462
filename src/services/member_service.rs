use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    config,
    db::DbPool,
    dto::members::{
        Claims, LoginRequest, LoginResponse, MemberList, MemberTypeResponse, MemberView,
        MerchantWithBooks, RegisterMemberRequest, UpdateMemberRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::{Book, Member, MemberRole},
    policy::{self, Action},
    response::{ApiResponse, Meta},
    services::book_service,
};

pub async fn register(
    pool: &DbPool,
    payload: RegisterMemberRequest,
) -> AppResult<ApiResponse<MemberView>> {
    validate_required_fields(&payload)?;

    ensure_unique_fields(
        pool,
        UniqueFields {
            email: Some(&payload.email),
            account: Some(&payload.account),
            phone_number: Some(&payload.phone_number),
            merchant_name: payload.merchant_name.as_deref(),
        },
        payload.role,
        None,
    )
    .await?;

    let password_hash = hash_password(&payload.password)?;
    let id = Uuid::new_v4();

    // Fields outside the chosen role stay NULL; the update path keeps them so.
    let (user_name, level, user_state, merchant_name, merchant_address, merchant_state) =
        match payload.role {
            MemberRole::User => (
                payload.user_name.clone(),
                Some(payload.level.unwrap_or(0)),
                Some(0),
                None,
                None,
                None,
            ),
            MemberRole::Merchant => (
                None,
                None,
                None,
                payload.merchant_name.clone(),
                payload.merchant_address.clone(),
                Some(0),
            ),
            MemberRole::Admin => (None, None, None, None, None, None),
        };

    let member: Member = sqlx::query_as(
        r#"
        INSERT INTO members (id, email, account, password_hash, phone_number, role,
                             user_name, level, user_state,
                             merchant_name, merchant_address, merchant_state)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&payload.email)
    .bind(&payload.account)
    .bind(&password_hash)
    .bind(&payload.phone_number)
    .bind(payload.role)
    .bind(user_name)
    .bind(level)
    .bind(user_state)
    .bind(merchant_name)
    .bind(merchant_address)
    .bind(merchant_state)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(member.id),
        "member_register",
        Some("members"),
        Some(serde_json::json!({ "member_id": member.id, "role": member.role })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Member created",
        MemberView::from_member(member, None),
        None,
    ))
}

pub async fn login(pool: &DbPool, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { account, password } = payload;

    // Same error for unknown account and bad password; no account enumeration.
    let member: Option<Member> = sqlx::query_as("SELECT * FROM members WHERE account = $1")
        .bind(account.as_str())
        .fetch_optional(pool)
        .await?;

    let member = match member {
        Some(m) => m,
        None => return Err(AppError::Unauthorized("Invalid account or password".into())),
    };

    if !verify_password(&password, &member.password_hash)? {
        return Err(AppError::Unauthorized("Invalid account or password".into()));
    }

    let access_token = issue_token(&member)?;

    if let Err(err) = log_audit(
        pool,
        Some(member.id),
        "member_login",
        Some("members"),
        Some(serde_json::json!({ "member_id": member.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { access_token },
        Some(Meta::empty()),
    ))
}

pub async fn find_all(pool: &DbPool) -> AppResult<ApiResponse<MemberList>> {
    let members: Vec<Member> = sqlx::query_as("SELECT * FROM members ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    let items = members
        .into_iter()
        .map(|m| MemberView::from_member(m, None))
        .collect();

    Ok(ApiResponse::success("Members", MemberList { items }, None))
}

pub async fn find_by_id(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<MemberView>> {
    let member = get_member(pool, id).await?;
    let subscriber_count = subscriber_count_for(pool, &member).await?;

    Ok(ApiResponse::success(
        "Member",
        MemberView::from_member(member, subscriber_count),
        None,
    ))
}

pub async fn find_member_type(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<MemberTypeResponse>> {
    let member = get_member(pool, id).await?;
    Ok(ApiResponse::success(
        "Member type",
        MemberTypeResponse {
            id: member.id,
            role: member.role,
        },
        None,
    ))
}

/// A merchant's public page: profile plus their catalog with images.
pub async fn find_merchant_books(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<MerchantWithBooks>> {
    let member = get_member(pool, id).await?;
    let subscriber_count = subscriber_count_for(pool, &member).await?;

    let books: Vec<Book> =
        sqlx::query_as("SELECT * FROM books WHERE merchant_id = $1 ORDER BY created_at DESC")
            .bind(id)
            .fetch_all(pool)
            .await?;

    let books = book_service::attach_images(pool, books).await?;

    Ok(ApiResponse::success(
        "Merchant books",
        MerchantWithBooks {
            member: MemberView::from_member(member, subscriber_count),
            books,
        },
        None,
    ))
}

pub async fn update(
    pool: &DbPool,
    caller: &AuthMember,
    id: Uuid,
    patch: UpdateMemberRequest,
) -> AppResult<ApiResponse<MemberView>> {
    let member = get_member(pool, id).await?;
    policy::ensure(caller, Action::MemberManage, Some(member.id))?;

    ensure_role_fields(member.role, &patch)?;

    ensure_unique_fields(
        pool,
        UniqueFields {
            email: patch.email.as_deref(),
            account: patch.account.as_deref(),
            phone_number: patch.phone_number.as_deref(),
            merchant_name: patch.merchant_name.as_deref(),
        },
        member.role,
        Some(member.id),
    )
    .await?;

    let password_hash = match patch.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let updated: Member = sqlx::query_as(
        r#"
        UPDATE members SET
            email = COALESCE($2, email),
            account = COALESCE($3, account),
            password_hash = COALESCE($4, password_hash),
            phone_number = COALESCE($5, phone_number),
            user_name = COALESCE($6, user_name),
            level = COALESCE($7, level),
            user_state = COALESCE($8, user_state),
            merchant_name = COALESCE($9, merchant_name),
            merchant_address = COALESCE($10, merchant_address),
            merchant_state = COALESCE($11, merchant_state),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(member.id)
    .bind(patch.email)
    .bind(patch.account)
    .bind(password_hash)
    .bind(patch.phone_number)
    .bind(patch.user_name)
    .bind(patch.level)
    .bind(patch.user_state)
    .bind(patch.merchant_name)
    .bind(patch.merchant_address)
    .bind(patch.merchant_state)
    .fetch_one(pool)
    .await?;

    let subscriber_count = subscriber_count_for(pool, &updated).await?;
    Ok(ApiResponse::success(
        "Member updated",
        MemberView::from_member(updated, subscriber_count),
        Some(Meta::empty()),
    ))
}

pub async fn remove(
    pool: &DbPool,
    caller: &AuthMember,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let member = get_member(pool, id).await?;
    policy::ensure(caller, Action::MemberManage, Some(member.id))?;

    sqlx::query("DELETE FROM members WHERE id = $1")
        .bind(member.id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Member deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn get_member(pool: &DbPool, id: Uuid) -> AppResult<Member> {
    let member: Option<Member> = sqlx::query_as("SELECT * FROM members WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    member.ok_or_else(|| AppError::NotFound(format!("Member with ID {id} not found")))
}

async fn subscriber_count_for(pool: &DbPool, member: &Member) -> AppResult<Option<i64>> {
    if member.role != MemberRole::Merchant {
        return Ok(None);
    }
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE merchant_id = $1")
            .bind(member.id)
            .fetch_one(pool)
            .await?;
    Ok(Some(count))
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn issue_token(member: &Member) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config::jwt_expiry_hours()))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: member.id.to_string(),
        account: member.account.clone(),
        role: member.role,
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config::jwt_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
    Ok(token)
}

fn validate_required_fields(dto: &RegisterMemberRequest) -> AppResult<()> {
    if dto.email.trim().is_empty() {
        return Err(AppError::BadRequest("Email is required".into()));
    }
    if dto.account.trim().is_empty() {
        return Err(AppError::BadRequest("Account is required".into()));
    }
    if dto.password.trim().is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }
    if dto.phone_number.trim().is_empty() {
        return Err(AppError::BadRequest("Phone number is required".into()));
    }

    match dto.role {
        MemberRole::User => {
            if dto
                .user_name
                .as_deref()
                .is_none_or(|name| name.trim().is_empty())
            {
                return Err(AppError::BadRequest(
                    "User name is required for User type".into(),
                ));
            }
        }
        MemberRole::Merchant => {
            if dto
                .merchant_name
                .as_deref()
                .is_none_or(|name| name.trim().is_empty())
            {
                return Err(AppError::BadRequest(
                    "Merchant name is required for Merchant type".into(),
                ));
            }
            if dto
                .merchant_address
                .as_deref()
                .is_none_or(|addr| addr.trim().is_empty())
            {
                return Err(AppError::BadRequest(
                    "Merchant address is required for Merchant type".into(),
                ));
            }
        }
        MemberRole::Admin => {}
    }

    Ok(())
}

/// A patch may only touch fields belonging to the target's role; the role tag
/// is matched exhaustively so a new role cannot silently skip validation.
fn ensure_role_fields(role: MemberRole, patch: &UpdateMemberRequest) -> AppResult<()> {
    let reject = |field: &str| {
        Err(AppError::Conflict(format!(
            "Since the type is {role}, the {field} cannot be modified."
        )))
    };

    match role {
        MemberRole::Admin => {
            if patch.user_name.is_some() {
                return reject("UserName");
            }
            if patch.level.is_some() {
                return reject("Level");
            }
            if patch.user_state.is_some() {
                return reject("UserState");
            }
            if patch.merchant_name.is_some() {
                return reject("MerchantName");
            }
            if patch.merchant_address.is_some() {
                return reject("MerchantAddress");
            }
            if patch.merchant_state.is_some() {
                return reject("MerchantState");
            }
        }
        MemberRole::User => {
            if patch.merchant_name.is_some() {
                return reject("MerchantName");
            }
            if patch.merchant_address.is_some() {
                return reject("MerchantAddress");
            }
            if patch.merchant_state.is_some() {
                return reject("MerchantState");
            }
        }
        MemberRole::Merchant => {
            if patch.user_name.is_some() {
                return reject("UserName");
            }
            if patch.level.is_some() {
                return reject("Level");
            }
            if patch.user_state.is_some() {
                return reject("UserState");
            }
        }
    }

    Ok(())
}

struct UniqueFields<'a> {
    email: Option<&'a str>,
    account: Option<&'a str>,
    phone_number: Option<&'a str>,
    merchant_name: Option<&'a str>,
}

async fn ensure_unique_fields(
    pool: &DbPool,
    fields: UniqueFields<'_>,
    target_role: MemberRole,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    if let Some(email) = fields.email {
        if member_exists(pool, "email", email, exclude).await? {
            return Err(AppError::Conflict("Email already exists".into()));
        }
    }

    if let Some(account) = fields.account {
        if member_exists(pool, "account", account, exclude).await? {
            return Err(AppError::Conflict("Account already exists".into()));
        }
    }

    // Admin desks may share a phone number.
    if target_role != MemberRole::Admin {
        if let Some(phone) = fields.phone_number {
            if member_exists(pool, "phone_number", phone, exclude).await? {
                return Err(AppError::Conflict("Phone number already exists".into()));
            }
        }
    }

    if target_role == MemberRole::Merchant {
        if let Some(name) = fields.merchant_name {
            if member_exists(pool, "merchant_name", name, exclude).await? {
                return Err(AppError::Conflict("Merchant name already exists".into()));
            }
        }
    }

    Ok(())
}

async fn member_exists(
    pool: &DbPool,
    column: &'static str,
    value: &str,
    exclude: Option<Uuid>,
) -> AppResult<bool> {
    // `column` is a compile-time constant from this module, never user input.
    let sql =
        format!("SELECT id FROM members WHERE {column} = $1 AND ($2::uuid IS NULL OR id <> $2)");
    let existing: Option<(Uuid,)> = sqlx::query_as(&sql)
        .bind(value)
        .bind(exclude)
        .fetch_optional(pool)
        .await?;
    Ok(existing.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch() -> UpdateMemberRequest {
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

    fn register_request(role: MemberRole) -> RegisterMemberRequest {
        RegisterMemberRequest {
            email: "a@example.com".into(),
            account: "alice".into(),
            password: "secret".into(),
            phone_number: "0912345678".into(),
            role,
            user_name: Some("Alice".into()),
            level: None,
            merchant_name: Some("Shop1".into()),
            merchant_address: Some("1 Main St".into()),
        }
    }

    #[test]
    fn user_patch_cannot_carry_merchant_fields() {
        let mut p = patch();
        p.merchant_name = Some("Shop1".into());
        let err = ensure_role_fields(MemberRole::User, &p).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn merchant_patch_cannot_carry_user_fields() {
        let mut p = patch();
        p.user_state = Some(1);
        let err = ensure_role_fields(MemberRole::Merchant, &p).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn admin_patch_rejects_every_role_field() {
        let mut p = patch();
        p.level = Some(3);
        assert!(ensure_role_fields(MemberRole::Admin, &p).is_err());

        let mut p = patch();
        p.merchant_address = Some("2 Side St".into());
        assert!(ensure_role_fields(MemberRole::Admin, &p).is_err());
    }

    #[test]
    fn shared_fields_pass_for_every_role() {
        let mut p = patch();
        p.email = Some("new@example.com".into());
        p.password = Some("hunter2".into());
        for role in [MemberRole::User, MemberRole::Merchant, MemberRole::Admin] {
            assert!(ensure_role_fields(role, &p).is_ok());
        }
    }

    #[test]
    fn registration_requires_role_specific_fields() {
        let mut dto = register_request(MemberRole::User);
        dto.user_name = None;
        assert!(matches!(
            validate_required_fields(&dto),
            Err(AppError::BadRequest(_))
        ));

        let mut dto = register_request(MemberRole::Merchant);
        dto.merchant_address = Some("  ".into());
        assert!(matches!(
            validate_required_fields(&dto),
            Err(AppError::BadRequest(_))
        ));

        assert!(validate_required_fields(&register_request(MemberRole::Admin)).is_ok());
    }

    #[test]
    fn issued_token_round_trips_through_the_extractor_path() {
        use jsonwebtoken::{DecodingKey, Validation, decode};

        let now = Utc::now();
        let member = Member {
            id: Uuid::new_v4(),
            email: "a@example.com".into(),
            account: "alice".into(),
            password_hash: "x".into(),
            phone_number: "0912345678".into(),
            role: MemberRole::Merchant,
            user_name: None,
            level: None,
            user_state: None,
            merchant_name: Some("Shop1".into()),
            merchant_address: Some("1 Main St".into()),
            merchant_state: Some(0),
            created_at: now,
            updated_at: now,
        };

        let token = issue_token(&member).unwrap();
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(config::jwt_secret().as_bytes()),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, member.id.to_string());
        assert_eq!(decoded.claims.account, "alice");
        assert_eq!(decoded.claims.role, MemberRole::Merchant);
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }
}
