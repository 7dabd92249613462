use std::collections::HashMap;

use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::books::{
        AddBookImageRequest, BookList, BookSearchQuery, BookWithImages, CreateBookRequest,
        UpdateBookRequest, UpdateBookStatusRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::{Book, BookImage},
    policy::{self, Action},
    response::{ApiResponse, Meta},
    routes::params::{BookListQuery, BookSortBy, SortOrder},
};

pub async fn create(
    pool: &DbPool,
    caller: &AuthMember,
    payload: CreateBookRequest,
) -> AppResult<ApiResponse<BookWithImages>> {
    policy::ensure(caller, Action::BookPublish, None)?;
    validate_isbn(&payload.isbn)?;
    validate_price(payload.price)?;
    validate_inventory(payload.inventory_quantity)?;

    let status = payload.status.unwrap_or(1);
    validate_status(status)?;

    let mut tx = pool.begin().await?;

    let id = Uuid::new_v4();
    // The owner is always the authenticated merchant; the body carries none.
    let book: Book = sqlx::query_as(
        r#"
        INSERT INTO books (id, isbn, name, description, price, inventory_quantity,
                           author, publisher, status, merchant_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&payload.isbn)
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(payload.inventory_quantity)
    .bind(&payload.author)
    .bind(&payload.publisher)
    .bind(status)
    .bind(caller.member_id)
    .fetch_one(&mut *tx)
    .await?;

    let mut images = Vec::new();
    for image in payload.images.unwrap_or_default() {
        let saved: BookImage = sqlx::query_as(
            r#"
            INSERT INTO book_images (id, book_id, image_url, display_order, is_cover)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(book.id)
        .bind(&image.image_url)
        .bind(image.display_order)
        .bind(image.is_cover)
        .fetch_one(&mut *tx)
        .await?;
        images.push(saved);
    }

    tx.commit().await?;

    if let Err(err) = log_audit(
        pool,
        Some(caller.member_id),
        "book_create",
        Some("books"),
        Some(serde_json::json!({ "book_id": book.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Book created",
        BookWithImages { book, images },
        Some(Meta::empty()),
    ))
}

pub async fn find_all(pool: &DbPool, query: BookListQuery) -> AppResult<ApiResponse<BookList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let sort_by = query.sort_by.unwrap_or(BookSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sql = format!(
        "SELECT * FROM books ORDER BY {} {} LIMIT $1 OFFSET $2",
        sort_by.as_sql(),
        sort_order.as_sql()
    );

    let books: Vec<Book> = sqlx::query_as(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await?;

    let items = attach_images(pool, books).await?;
    let meta = Meta::paged(page, limit, total);
    Ok(ApiResponse::success("Books", BookList { items }, Some(meta)))
}

pub async fn find_by_id(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<BookWithImages>> {
    let book = get_book(pool, id).await?;
    let item = with_images(pool, book).await?;
    Ok(ApiResponse::success("Book", item, None))
}

pub async fn find_by_isbn(pool: &DbPool, isbn: &str) -> AppResult<ApiResponse<BookWithImages>> {
    let book: Option<Book> = sqlx::query_as("SELECT * FROM books WHERE isbn = $1")
        .bind(isbn)
        .fetch_optional(pool)
        .await?;
    let book =
        book.ok_or_else(|| AppError::NotFound(format!("Book with ISBN {isbn} not found")))?;

    let item = with_images(pool, book).await?;
    Ok(ApiResponse::success("Book", item, None))
}

/// Named filters AND together; `keyword` ORs across the text columns,
/// merchant name included. Only listed books are searchable.
pub async fn search(pool: &DbPool, query: BookSearchQuery) -> AppResult<ApiResponse<BookList>> {
    let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
        "SELECT b.* FROM books b JOIN members m ON m.id = b.merchant_id WHERE b.status = 1",
    );

    let like = |term: &str| format!("%{term}%");

    if let Some(isbn) = query.isbn.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND b.isbn ILIKE ").push_bind(like(isbn));
    }
    if let Some(name) = query.name.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND b.name ILIKE ").push_bind(like(name));
    }
    if let Some(author) = query.author.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND b.author ILIKE ").push_bind(like(author));
    }
    if let Some(publisher) = query.publisher.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND b.publisher ILIKE ").push_bind(like(publisher));
    }
    if let Some(merchant) = query.merchant_name.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND m.merchant_name ILIKE ").push_bind(like(merchant));
    }

    if let Some(keyword) = query.keyword.as_deref().filter(|s| !s.is_empty()) {
        let pattern = like(keyword);
        qb.push(" AND (b.isbn ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.author ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.publisher ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR m.merchant_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(" ORDER BY b.created_at DESC");

    let books: Vec<Book> = qb.build_query_as().fetch_all(pool).await?;
    let items = attach_images(pool, books).await?;

    Ok(ApiResponse::success("Search results", BookList { items }, None))
}

pub async fn update(
    pool: &DbPool,
    caller: &AuthMember,
    id: Uuid,
    patch: UpdateBookRequest,
) -> AppResult<ApiResponse<BookWithImages>> {
    let book = get_book(pool, id).await?;
    policy::ensure(caller, Action::BookManage, Some(book.merchant_id))?;

    if let Some(price) = patch.price {
        validate_price(price)?;
    }
    if let Some(inventory) = patch.inventory_quantity {
        validate_inventory(inventory)?;
    }

    if let Some(isbn) = patch.isbn.as_deref() {
        validate_isbn(isbn)?;
        if isbn != book.isbn {
            let existing: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM books WHERE isbn = $1 AND id <> $2")
                    .bind(isbn)
                    .bind(book.id)
                    .fetch_optional(pool)
                    .await?;
            if existing.is_some() {
                return Err(AppError::Conflict("ISBN already exists".into()));
            }
        }
    }

    let updated: Book = sqlx::query_as(
        r#"
        UPDATE books SET
            isbn = COALESCE($2, isbn),
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            price = COALESCE($5, price),
            inventory_quantity = COALESCE($6, inventory_quantity),
            author = COALESCE($7, author),
            publisher = COALESCE($8, publisher),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(book.id)
    .bind(patch.isbn)
    .bind(patch.name)
    .bind(patch.description)
    .bind(patch.price)
    .bind(patch.inventory_quantity)
    .bind(patch.author)
    .bind(patch.publisher)
    .fetch_one(pool)
    .await?;

    let item = with_images(pool, updated).await?;
    Ok(ApiResponse::success("Book updated", item, Some(Meta::empty())))
}

pub async fn update_status(
    pool: &DbPool,
    caller: &AuthMember,
    id: Uuid,
    payload: UpdateBookStatusRequest,
) -> AppResult<ApiResponse<BookWithImages>> {
    let book = get_book(pool, id).await?;
    policy::ensure(caller, Action::BookManage, Some(book.merchant_id))?;
    validate_status(payload.status)?;

    let updated: Book = sqlx::query_as(
        "UPDATE books SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(book.id)
    .bind(payload.status)
    .fetch_one(pool)
    .await?;

    let item = with_images(pool, updated).await?;
    Ok(ApiResponse::success(
        "Book status updated",
        item,
        Some(Meta::empty()),
    ))
}

pub async fn remove(
    pool: &DbPool,
    caller: &AuthMember,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let book = get_book(pool, id).await?;
    policy::ensure(caller, Action::BookManage, Some(book.merchant_id))?;

    // Images and associations cascade with the book row.
    sqlx::query("DELETE FROM books WHERE id = $1")
        .bind(book.id)
        .execute(pool)
        .await?;

    if let Err(err) = log_audit(
        pool,
        Some(caller.member_id),
        "book_delete",
        Some("books"),
        Some(serde_json::json!({ "book_id": book.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Book deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn add_image(
    pool: &DbPool,
    caller: &AuthMember,
    book_id: Uuid,
    payload: AddBookImageRequest,
) -> AppResult<ApiResponse<BookImage>> {
    let book = get_book(pool, book_id).await?;
    policy::ensure(caller, Action::BookManage, Some(book.merchant_id))?;

    let image: BookImage = sqlx::query_as(
        r#"
        INSERT INTO book_images (id, book_id, image_url, display_order, is_cover)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(book.id)
    .bind(&payload.image_url)
    .bind(payload.display_order)
    .bind(payload.is_cover)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success("Image added", image, Some(Meta::empty())))
}

pub async fn remove_image(
    pool: &DbPool,
    caller: &AuthMember,
    image_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let image: Option<BookImage> = sqlx::query_as("SELECT * FROM book_images WHERE id = $1")
        .bind(image_id)
        .fetch_optional(pool)
        .await?;
    let image =
        image.ok_or_else(|| AppError::NotFound(format!("Image with ID {image_id} not found")))?;

    let book = get_book(pool, image.book_id).await?;
    policy::ensure(caller, Action::BookManage, Some(book.merchant_id))?;

    sqlx::query("DELETE FROM book_images WHERE id = $1")
        .bind(image.id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Image removed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn get_book(pool: &DbPool, id: Uuid) -> AppResult<Book> {
    let book: Option<Book> = sqlx::query_as("SELECT * FROM books WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    book.ok_or_else(|| AppError::NotFound(format!("Book with ID {id} not found")))
}

async fn with_images(pool: &DbPool, book: Book) -> AppResult<BookWithImages> {
    let images: Vec<BookImage> =
        sqlx::query_as("SELECT * FROM book_images WHERE book_id = $1 ORDER BY display_order, id")
            .bind(book.id)
            .fetch_all(pool)
            .await?;
    Ok(BookWithImages { book, images })
}

/// One images query for a page of books, grouped back onto each book.
pub async fn attach_images(pool: &DbPool, books: Vec<Book>) -> AppResult<Vec<BookWithImages>> {
    if books.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = books.iter().map(|b| b.id).collect();
    let images: Vec<BookImage> = sqlx::query_as(
        "SELECT * FROM book_images WHERE book_id = ANY($1) ORDER BY display_order, id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_book: HashMap<Uuid, Vec<BookImage>> = HashMap::new();
    for image in images {
        by_book.entry(image.book_id).or_default().push(image);
    }

    Ok(books
        .into_iter()
        .map(|book| {
            let images = by_book.remove(&book.id).unwrap_or_default();
            BookWithImages { book, images }
        })
        .collect())
}

fn validate_isbn(isbn: &str) -> AppResult<()> {
    if isbn.len() != 13 {
        return Err(AppError::BadRequest("ISBN must be 13 characters".into()));
    }
    Ok(())
}

fn validate_price(price: i32) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::BadRequest("Price must be greater than 0".into()));
    }
    Ok(())
}

fn validate_inventory(quantity: i32) -> AppResult<()> {
    if quantity < 0 {
        return Err(AppError::BadRequest(
            "InventoryQuantity must not be negative".into(),
        ));
    }
    Ok(())
}

fn validate_status(status: i32) -> AppResult<()> {
    if status != 0 && status != 1 {
        return Err(AppError::BadRequest(
            "Status must be 0 (sold out) or 1 (available)".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_must_be_positive() {
        assert!(validate_price(0).is_err());
        assert!(validate_price(-5).is_err());
        assert!(validate_price(1).is_ok());
    }

    #[test]
    fn inventory_may_be_zero_but_not_negative() {
        assert!(validate_inventory(0).is_ok());
        assert!(validate_inventory(-1).is_err());
    }

    #[test]
    fn status_is_binary() {
        assert!(validate_status(0).is_ok());
        assert!(validate_status(1).is_ok());
        assert!(validate_status(2).is_err());
    }

    #[test]
    fn isbn_must_be_thirteen_chars() {
        assert!(validate_isbn("9781593278281").is_ok());
        assert!(validate_isbn("123").is_err());
    }
}
