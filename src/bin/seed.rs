use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use obs_backend::{config::AppConfig, db::create_pool, models::MemberRole};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_member(
        &pool,
        MemberSeed {
            email: "admin@example.com",
            account: "admin",
            password: "admin123",
            phone_number: "0900000001",
            role: MemberRole::Admin,
            user_name: None,
            merchant_name: None,
            merchant_address: None,
        },
    )
    .await?;

    let merchant_id = ensure_member(
        &pool,
        MemberSeed {
            email: "shop@example.com",
            account: "shop1",
            password: "shop123",
            phone_number: "0900000002",
            role: MemberRole::Merchant,
            user_name: None,
            merchant_name: Some("Shop1"),
            merchant_address: Some("1 Market Street"),
        },
    )
    .await?;

    let user_id = ensure_member(
        &pool,
        MemberSeed {
            email: "user@example.com",
            account: "alice",
            password: "user123",
            phone_number: "0900000003",
            role: MemberRole::User,
            user_name: Some("Alice"),
            merchant_name: None,
            merchant_address: None,
        },
    )
    .await?;

    seed_books(&pool, merchant_id).await?;
    seed_category(&pool, "Programming").await?;

    println!("Seed completed. Admin: {admin_id}, Merchant: {merchant_id}, User: {user_id}");
    Ok(())
}

struct MemberSeed<'a> {
    email: &'a str,
    account: &'a str,
    password: &'a str,
    phone_number: &'a str,
    role: MemberRole,
    user_name: Option<&'a str>,
    merchant_name: Option<&'a str>,
    merchant_address: Option<&'a str>,
}

async fn ensure_member(pool: &sqlx::PgPool, seed: MemberSeed<'_>) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM members WHERE account = $1")
        .bind(seed.account)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(seed.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO members (id, email, account, password_hash, phone_number, role,
                             user_name, user_state, merchant_name, merchant_address, merchant_state)
        VALUES ($1, $2, $3, $4, $5, $6, $7,
                CASE WHEN $6 = 'user'::member_role THEN 0 END,
                $8, $9,
                CASE WHEN $6 = 'merchant'::member_role THEN 0 END)
        "#,
    )
    .bind(id)
    .bind(seed.email)
    .bind(seed.account)
    .bind(password_hash)
    .bind(seed.phone_number)
    .bind(seed.role)
    .bind(seed.user_name)
    .bind(seed.merchant_name)
    .bind(seed.merchant_address)
    .execute(pool)
    .await?;

    Ok(id)
}

async fn seed_books(pool: &sqlx::PgPool, merchant_id: Uuid) -> anyhow::Result<()> {
    let books = [
        ("9781593278281", "The Rust Programming Language", 1200, 25),
        ("9781718500440", "Rust for Rustaceans", 950, 12),
        ("9781098119225", "Designing Data-Intensive Apps", 1450, 8),
    ];

    for (isbn, name, price, stock) in books {
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM books WHERE isbn = $1 AND merchant_id = $2")
                .bind(isbn)
                .bind(merchant_id)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO books (id, isbn, name, description, price, inventory_quantity,
                               author, publisher, status, merchant_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(isbn)
        .bind(name)
        .bind(format!("{name} (seeded copy)"))
        .bind(price)
        .bind(stock)
        .bind("Various")
        .bind("No Starch Press")
        .bind(merchant_id)
        .execute(pool)
        .await?;
    }

    Ok(())
}

async fn seed_category(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(())
}
