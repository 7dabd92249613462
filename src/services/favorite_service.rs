use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::favorites::{AddFavoriteRequest, FavoriteBookList},
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::{Book, Favorite},
    policy::{self, Action},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::book_service,
};

pub async fn create(
    pool: &DbPool,
    caller: &AuthMember,
    payload: AddFavoriteRequest,
) -> AppResult<ApiResponse<Favorite>> {
    policy::ensure(caller, Action::FavoriteUse, None)?;
    book_service::get_book(pool, payload.book_id).await?;

    let existing: Option<Favorite> =
        sqlx::query_as("SELECT * FROM favorites WHERE user_id = $1 AND book_id = $2")
            .bind(caller.member_id)
            .bind(payload.book_id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Already favorited".into()));
    }

    let favorite: Favorite =
        sqlx::query_as("INSERT INTO favorites (user_id, book_id) VALUES ($1, $2) RETURNING *")
            .bind(caller.member_id)
            .bind(payload.book_id)
            .fetch_one(pool)
            .await?;

    Ok(ApiResponse::success(
        "Added to favorites",
        favorite,
        Some(Meta::empty()),
    ))
}

pub async fn find_mine(
    pool: &DbPool,
    caller: &AuthMember,
    pagination: Pagination,
) -> AppResult<ApiResponse<FavoriteBookList>> {
    policy::ensure(caller, Action::FavoriteUse, None)?;
    let (page, limit, offset) = pagination.normalize();

    let books: Vec<Book> = sqlx::query_as(
        r#"
        SELECT b.*
        FROM favorites f
        JOIN books b ON b.id = f.book_id
        WHERE f.user_id = $1
        ORDER BY f.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(caller.member_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE user_id = $1")
        .bind(caller.member_id)
        .fetch_one(pool)
        .await?;

    let items = book_service::attach_images(pool, books).await?;
    let meta = Meta::paged(page, limit, total);
    Ok(ApiResponse::success(
        "Favorites",
        FavoriteBookList { items },
        Some(meta),
    ))
}

pub async fn remove(
    pool: &DbPool,
    caller: &AuthMember,
    book_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    policy::ensure(caller, Action::FavoriteUse, None)?;

    let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND book_id = $2")
        .bind(caller.member_id)
        .bind(book_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Favorite not found".into()));
    }

    Ok(ApiResponse::success(
        "Removed from favorites",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
