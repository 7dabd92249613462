use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::{
        belongs_to::{BatchBelongsToRequest, BelongsToList, CreateBelongsToRequest},
        books::BookList,
        categories::CategoryList,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::{BelongsTo, Book, Category},
    policy::{self, Action},
    response::{ApiResponse, Meta},
    services::{book_service, category_service},
};

pub async fn create(
    pool: &DbPool,
    caller: &AuthMember,
    payload: CreateBelongsToRequest,
) -> AppResult<ApiResponse<BelongsTo>> {
    let book = book_service::get_book(pool, payload.book_id).await?;
    policy::ensure(caller, Action::BookManage, Some(book.merchant_id))?;
    category_service::get_category(pool, payload.category_id).await?;

    if association_exists(pool, payload.book_id, payload.category_id).await? {
        return Err(AppError::Conflict(
            "This book is already assigned to this category".into(),
        ));
    }

    let link: BelongsTo = sqlx::query_as(
        "INSERT INTO belongs_to (book_id, category_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(payload.book_id)
    .bind(payload.category_id)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Category assigned",
        link,
        Some(Meta::empty()),
    ))
}

pub async fn remove(
    pool: &DbPool,
    caller: &AuthMember,
    book_id: Uuid,
    category_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let book = book_service::get_book(pool, book_id).await?;
    policy::ensure(caller, Action::BookManage, Some(book.merchant_id))?;

    let result = sqlx::query("DELETE FROM belongs_to WHERE book_id = $1 AND category_id = $2")
        .bind(book_id)
        .bind(category_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "This book is not assigned to this category".into(),
        ));
    }

    Ok(ApiResponse::success(
        "Category unassigned",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Best-effort batch add: unknown categories and existing links are skipped,
/// never reported as failures.
pub async fn add_book_to_categories(
    pool: &DbPool,
    caller: &AuthMember,
    payload: BatchBelongsToRequest,
) -> AppResult<ApiResponse<BelongsToList>> {
    let book = book_service::get_book(pool, payload.book_id).await?;
    policy::ensure(caller, Action::BookManage, Some(book.merchant_id))?;

    let mut items = Vec::new();
    for category_id in payload.category_ids {
        let category: Option<(i32,)> = sqlx::query_as("SELECT id FROM categories WHERE id = $1")
            .bind(category_id)
            .fetch_optional(pool)
            .await?;
        if category.is_none() {
            continue;
        }

        let link: Option<BelongsTo> = sqlx::query_as(
            r#"
            INSERT INTO belongs_to (book_id, category_id)
            VALUES ($1, $2)
            ON CONFLICT (book_id, category_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(payload.book_id)
        .bind(category_id)
        .fetch_optional(pool)
        .await?;

        if let Some(link) = link {
            items.push(link);
        }
    }

    Ok(ApiResponse::success(
        "Categories assigned",
        BelongsToList { items },
        Some(Meta::empty()),
    ))
}

pub async fn find_all(pool: &DbPool) -> AppResult<ApiResponse<BelongsToList>> {
    let items: Vec<BelongsTo> =
        sqlx::query_as("SELECT * FROM belongs_to ORDER BY book_id, category_id")
            .fetch_all(pool)
            .await?;
    Ok(ApiResponse::success("Associations", BelongsToList { items }, None))
}

pub async fn find_categories_by_book(
    pool: &DbPool,
    book_id: Uuid,
) -> AppResult<ApiResponse<CategoryList>> {
    book_service::get_book(pool, book_id).await?;

    let items: Vec<Category> = sqlx::query_as(
        r#"
        SELECT c.* FROM belongs_to bt
        JOIN categories c ON c.id = bt.category_id
        WHERE bt.book_id = $1
        ORDER BY c.name ASC
        "#,
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::success("Categories", CategoryList { items }, None))
}

pub async fn find_books_by_category(
    pool: &DbPool,
    category_id: i32,
) -> AppResult<ApiResponse<BookList>> {
    category_service::get_category(pool, category_id).await?;

    let books: Vec<Book> = sqlx::query_as(
        r#"
        SELECT b.* FROM belongs_to bt
        JOIN books b ON b.id = bt.book_id
        WHERE bt.category_id = $1
        ORDER BY b.created_at DESC
        "#,
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;

    let items = book_service::attach_images(pool, books).await?;
    Ok(ApiResponse::success("Books", BookList { items }, None))
}

async fn association_exists(pool: &DbPool, book_id: Uuid, category_id: i32) -> AppResult<bool> {
    let existing: Option<BelongsTo> =
        sqlx::query_as("SELECT * FROM belongs_to WHERE book_id = $1 AND category_id = $2")
            .bind(book_id)
            .bind(category_id)
            .fetch_optional(pool)
            .await?;
    Ok(existing.is_some())
}
