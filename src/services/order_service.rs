use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::{Book, MemberRole, Order, OrderItem},
    policy::{self, Action},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
};

/// Places an order. Header, line items and the inventory decrement commit in
/// one transaction; the referenced book rows are locked first, so a
/// concurrent order cannot oversell the same copies.
pub async fn create(
    pool: &DbPool,
    caller: &AuthMember,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    policy::ensure(caller, Action::OrderPlace, None)?;

    let user: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM members WHERE id = $1 AND role = $2")
            .bind(caller.member_id)
            .bind(MemberRole::User)
            .fetch_optional(pool)
            .await?;
    if user.is_none() {
        return Err(AppError::BadRequest("Only users can create orders".into()));
    }

    if payload.items.is_empty() {
        return Err(AppError::BadRequest(
            "Order must contain at least one item".into(),
        ));
    }

    let book_ids: Vec<Uuid> = payload.items.iter().map(|item| item.book_id).collect();
    let unique_ids: HashSet<Uuid> = book_ids.iter().copied().collect();
    if unique_ids.len() != book_ids.len() {
        return Err(AppError::BadRequest("Order contains duplicate books".into()));
    }

    let mut tx = pool.begin().await?;

    let books: Vec<Book> = sqlx::query_as("SELECT * FROM books WHERE id = ANY($1) FOR UPDATE")
        .bind(&book_ids)
        .fetch_all(&mut *tx)
        .await?;

    if books.len() != unique_ids.len() {
        return Err(AppError::NotFound("Some books not found".into()));
    }

    for item in &payload.items {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".into(),
            ));
        }
        let book = books
            .iter()
            .find(|b| b.id == item.book_id)
            .ok_or_else(|| AppError::NotFound(format!("Book with ID {} not found", item.book_id)))?;
        if book.status != 1 {
            return Err(AppError::BadRequest(format!(
                "Book {} is not available",
                book.name
            )));
        }
        if book.inventory_quantity < item.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient inventory for book: {}",
                book.name
            )));
        }
    }

    let merchant_ids: HashSet<Uuid> = books.iter().map(|b| b.merchant_id).collect();
    if merchant_ids.len() > 1 {
        return Err(AppError::BadRequest(
            "All books in an order must belong to the same merchant".into(),
        ));
    }
    let merchant_id = match merchant_ids.iter().next() {
        Some(id) => *id,
        None => {
            return Err(AppError::BadRequest(
                "Order must contain at least one item".into(),
            ));
        }
    };

    let merchant: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM members WHERE id = $1 AND role = $2")
            .bind(merchant_id)
            .bind(MemberRole::Merchant)
            .fetch_optional(&mut *tx)
            .await?;
    if merchant.is_none() {
        return Err(AppError::NotFound("Merchant not found".into()));
    }

    if let Some(coupon_id) = payload.coupon_id {
        let coupon: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM coupons WHERE id = $1")
            .bind(coupon_id)
            .fetch_optional(&mut *tx)
            .await?;
        if coupon.is_none() {
            return Err(AppError::NotFound("Coupon not found".into()));
        }
    }

    let mut total_price: i64 = 0;
    let mut total_quantity: i32 = 0;
    for item in &payload.items {
        let book = books
            .iter()
            .find(|b| b.id == item.book_id)
            .ok_or_else(|| AppError::NotFound(format!("Book with ID {} not found", item.book_id)))?;
        total_price += i64::from(book.price) * i64::from(item.quantity);
        total_quantity += item.quantity;
    }

    let order: Order = sqlx::query_as(
        r#"
        INSERT INTO orders (id, shipping_address, payment_method, total_price,
                            total_quantity, state, coupon_id, user_id, merchant_id)
        VALUES ($1, $2, $3, $4, $5, 0, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.shipping_address)
    .bind(payload.payment_method)
    .bind(total_price)
    .bind(total_quantity)
    .bind(payload.coupon_id)
    .bind(caller.member_id)
    .bind(merchant_id)
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::new();
    for item in &payload.items {
        let saved: OrderItem = sqlx::query_as(
            "INSERT INTO order_items (order_id, book_id, quantity) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(order.id)
        .bind(item.book_id)
        .bind(item.quantity)
        .fetch_one(&mut *tx)
        .await?;
        items.push(saved);

        sqlx::query(
            r#"
            UPDATE books
            SET inventory_quantity = inventory_quantity - $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(item.book_id)
        .bind(item.quantity)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    if let Err(err) = log_audit(
        pool,
        Some(caller.member_id),
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "merchant_id": merchant_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

/// Admin sees everything; a user their own orders; a merchant their shop's.
pub async fn find_all(
    pool: &DbPool,
    caller: &AuthMember,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let (user_filter, merchant_filter) = scope_filters(caller);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sql = format!(
        r#"
        SELECT * FROM orders
        WHERE ($1::uuid IS NULL OR user_id = $1)
          AND ($2::uuid IS NULL OR merchant_id = $2)
          AND ($3::int IS NULL OR state = $3)
        ORDER BY order_date {}
        LIMIT $4 OFFSET $5
        "#,
        sort_order.as_sql()
    );

    let items: Vec<Order> = sqlx::query_as(&sql)
        .bind(user_filter)
        .bind(merchant_filter)
        .bind(query.state)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM orders
        WHERE ($1::uuid IS NULL OR user_id = $1)
          AND ($2::uuid IS NULL OR merchant_id = $2)
          AND ($3::int IS NULL OR state = $3)
        "#,
    )
    .bind(user_filter)
    .bind(merchant_filter)
    .bind(query.state)
    .fetch_one(pool)
    .await?;

    let meta = Meta::paged(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn find_by_id(
    pool: &DbPool,
    caller: &AuthMember,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = get_order(pool, id).await?;
    policy::ensure(caller, Action::OrderView, Some(scope_owner(caller, &order)))?;

    let items = order_items(pool, order.id).await?;
    Ok(ApiResponse::success(
        "Order",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

/// Users may change shipping address and payment method on their own orders;
/// merchants only the state of their shop's orders; admins anything.
pub async fn update(
    pool: &DbPool,
    caller: &AuthMember,
    id: Uuid,
    patch: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let order = get_order(pool, id).await?;
    policy::ensure(caller, Action::OrderUpdate, Some(scope_owner(caller, &order)))?;

    match caller.role {
        MemberRole::User => {
            if patch.state.is_some() {
                return Err(AppError::Forbidden(
                    "Users can only update shipping address and payment method".into(),
                ));
            }
        }
        MemberRole::Merchant => {
            if patch.shipping_address.is_some() || patch.payment_method.is_some() {
                return Err(AppError::Forbidden(
                    "Merchants can only update order state".into(),
                ));
            }
        }
        MemberRole::Admin => {}
    }

    let updated: Order = sqlx::query_as(
        r#"
        UPDATE orders SET
            shipping_address = COALESCE($2, shipping_address),
            payment_method = COALESCE($3, payment_method),
            state = COALESCE($4, state)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(order.id)
    .bind(patch.shipping_address)
    .bind(patch.payment_method)
    .bind(patch.state)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(caller.member_id),
        "order_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": updated.id, "state": updated.state })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Order updated", updated, Some(Meta::empty())))
}

pub async fn remove(
    pool: &DbPool,
    caller: &AuthMember,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let order = get_order(pool, id).await?;

    if caller.role == MemberRole::Merchant {
        return Err(AppError::Forbidden("Merchants cannot delete orders".into()));
    }
    policy::ensure(caller, Action::OrderDelete, Some(order.user_id))?;

    sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(order.id)
        .execute(pool)
        .await?;

    if let Err(err) = log_audit(
        pool,
        Some(caller.member_id),
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn get_order(pool: &DbPool, id: Uuid) -> AppResult<Order> {
    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    order.ok_or_else(|| AppError::NotFound(format!("Order with ID {id} not found")))
}

async fn order_items(pool: &DbPool, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    let items: Vec<OrderItem> =
        sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY book_id")
            .bind(order_id)
            .fetch_all(pool)
            .await?;
    Ok(items)
}

fn scope_filters(caller: &AuthMember) -> (Option<Uuid>, Option<Uuid>) {
    match caller.role {
        MemberRole::Admin => (None, None),
        MemberRole::User => (Some(caller.member_id), None),
        MemberRole::Merchant => (None, Some(caller.member_id)),
    }
}

/// Which side of the order the caller must own for owner-scoped decisions.
fn scope_owner(caller: &AuthMember, order: &Order) -> Uuid {
    match caller.role {
        MemberRole::Merchant => order.merchant_id,
        _ => order.user_id,
    }
}
