use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::cart::{
        AddCartItemRequest, CartItemView, CartMerchantGroup, CartView, UpdateCartItemRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::{Book, BookImage, CartItem},
    policy::{self, Action},
    response::{ApiResponse, Meta},
};

#[derive(sqlx::FromRow)]
struct CartBookRow {
    quantity: i32,
    merchant_name: Option<String>,
    #[sqlx(flatten)]
    book: Book,
}

/// Adding accumulates onto any existing row; the combined quantity may never
/// exceed the book's current inventory. The book row is locked so a
/// concurrent order or adjustment cannot slip between check and write.
pub async fn add_item(
    pool: &DbPool,
    caller: &AuthMember,
    payload: AddCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    policy::ensure(caller, Action::CartUse, None)?;

    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".into(),
        ));
    }

    let mut tx = pool.begin().await?;

    let book = lock_available_book(&mut tx, payload.book_id).await?;

    let existing: Option<(i32,)> =
        sqlx::query_as("SELECT quantity FROM cart_items WHERE user_id = $1 AND book_id = $2")
            .bind(caller.member_id)
            .bind(payload.book_id)
            .fetch_optional(&mut *tx)
            .await?;

    let new_quantity = existing.map(|(q,)| q).unwrap_or(0) + payload.quantity;
    if new_quantity > book.inventory_quantity {
        return Err(AppError::BadRequest("Amount exceeds inventory".into()));
    }

    let item: CartItem = sqlx::query_as(
        r#"
        INSERT INTO cart_items (user_id, book_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, book_id)
        DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()
        RETURNING *
        "#,
    )
    .bind(caller.member_id)
    .bind(payload.book_id)
    .bind(new_quantity)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(ApiResponse::success("Added to cart", item, None))
}

/// The cart, grouped per merchant; each line carries its book and cover
/// image(s) only.
pub async fn find_my_cart(pool: &DbPool, caller: &AuthMember) -> AppResult<ApiResponse<CartView>> {
    policy::ensure(caller, Action::CartUse, None)?;

    let rows = fetch_cart_rows(pool, caller.member_id, None).await?;
    let merchants = group_by_merchant(pool, rows).await?;

    Ok(ApiResponse::success("Cart", CartView { merchants }, None))
}

pub async fn find_by_merchant(
    pool: &DbPool,
    caller: &AuthMember,
    merchant_id: Uuid,
) -> AppResult<ApiResponse<CartMerchantGroup>> {
    policy::ensure(caller, Action::CartUse, None)?;

    let rows = fetch_cart_rows(pool, caller.member_id, Some(merchant_id)).await?;
    let mut merchants = group_by_merchant(pool, rows).await?;

    let group = merchants.pop().unwrap_or(CartMerchantGroup {
        merchant_id,
        merchant_name: None,
        items: Vec::new(),
    });

    Ok(ApiResponse::success("Cart items", group, None))
}

pub async fn update_item(
    pool: &DbPool,
    caller: &AuthMember,
    book_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    policy::ensure(caller, Action::CartUse, None)?;

    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".into(),
        ));
    }

    let mut tx = pool.begin().await?;

    let existing: Option<CartItem> =
        sqlx::query_as("SELECT * FROM cart_items WHERE user_id = $1 AND book_id = $2")
            .bind(caller.member_id)
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?;
    if existing.is_none() {
        return Err(AppError::NotFound("Cart item not found".into()));
    }

    let book = lock_available_book(&mut tx, book_id).await?;
    if payload.quantity > book.inventory_quantity {
        return Err(AppError::BadRequest("Amount exceeds inventory".into()));
    }

    let item: CartItem = sqlx::query_as(
        r#"
        UPDATE cart_items SET quantity = $3, updated_at = now()
        WHERE user_id = $1 AND book_id = $2
        RETURNING *
        "#,
    )
    .bind(caller.member_id)
    .bind(book_id)
    .bind(payload.quantity)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(ApiResponse::success("Cart item updated", item, None))
}

pub async fn remove_item(
    pool: &DbPool,
    caller: &AuthMember,
    book_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    policy::ensure(caller, Action::CartUse, None)?;

    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND book_id = $2")
        .bind(caller.member_id)
        .bind(book_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Cart item not found".into()));
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn remove_by_merchant(
    pool: &DbPool,
    caller: &AuthMember,
    merchant_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    policy::ensure(caller, Action::CartUse, None)?;

    sqlx::query(
        r#"
        DELETE FROM cart_items ci
        USING books b
        WHERE b.id = ci.book_id AND ci.user_id = $1 AND b.merchant_id = $2
        "#,
    )
    .bind(caller.member_id)
    .bind(merchant_id)
    .execute(pool)
    .await?;

    Ok(ApiResponse::success(
        "Merchant items removed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn clear(
    pool: &DbPool,
    caller: &AuthMember,
) -> AppResult<ApiResponse<serde_json::Value>> {
    policy::ensure(caller, Action::CartUse, None)?;

    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(caller.member_id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Cart cleared",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn lock_available_book(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    book_id: Uuid,
) -> AppResult<Book> {
    let book: Option<Book> = sqlx::query_as("SELECT * FROM books WHERE id = $1 FOR UPDATE")
        .bind(book_id)
        .fetch_optional(&mut **tx)
        .await?;

    let book =
        book.ok_or_else(|| AppError::NotFound(format!("Book with ID {book_id} not found")))?;

    if book.status != 1 {
        return Err(AppError::BadRequest("Book is not available".into()));
    }

    Ok(book)
}

async fn fetch_cart_rows(
    pool: &DbPool,
    user_id: Uuid,
    merchant_id: Option<Uuid>,
) -> AppResult<Vec<CartBookRow>> {
    let rows: Vec<CartBookRow> = sqlx::query_as(
        r#"
        SELECT ci.quantity, m.merchant_name, b.*
        FROM cart_items ci
        JOIN books b ON b.id = ci.book_id
        JOIN members m ON m.id = b.merchant_id
        WHERE ci.user_id = $1 AND ($2::uuid IS NULL OR b.merchant_id = $2)
        ORDER BY b.merchant_id, ci.created_at
        "#,
    )
    .bind(user_id)
    .bind(merchant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn group_by_merchant(
    pool: &DbPool,
    rows: Vec<CartBookRow>,
) -> AppResult<Vec<CartMerchantGroup>> {
    let book_ids: Vec<Uuid> = rows.iter().map(|r| r.book.id).collect();

    let mut covers: HashMap<Uuid, Vec<BookImage>> = HashMap::new();
    if !book_ids.is_empty() {
        let images: Vec<BookImage> = sqlx::query_as(
            r#"
            SELECT * FROM book_images
            WHERE book_id = ANY($1) AND is_cover = TRUE
            ORDER BY display_order, id
            "#,
        )
        .bind(&book_ids)
        .fetch_all(pool)
        .await?;
        for image in images {
            covers.entry(image.book_id).or_default().push(image);
        }
    }

    let mut groups: Vec<CartMerchantGroup> = Vec::new();
    for row in rows {
        let images = covers.remove(&row.book.id).unwrap_or_default();
        let merchant_id = row.book.merchant_id;
        let item = CartItemView {
            quantity: row.quantity,
            book: row.book,
            images,
        };

        match groups.iter_mut().find(|g| g.merchant_id == merchant_id) {
            Some(group) => group.items.push(item),
            None => groups.push(CartMerchantGroup {
                merchant_id,
                merchant_name: row.merchant_name,
                items: vec![item],
            }),
        }
    }

    Ok(groups)
}
