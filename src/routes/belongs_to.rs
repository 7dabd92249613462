use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::{
        belongs_to::{BatchBelongsToRequest, BelongsToList, CreateBelongsToRequest},
        books::BookList,
        categories::CategoryList,
    },
    error::AppResult,
    middleware::auth::AuthMember,
    models::BelongsTo,
    response::ApiResponse,
    services::belongs_to_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", post(create_link).get(list_links))
        .route("/batch", post(batch_link))
        .route("/book/{book_id}", get(categories_of_book))
        .route("/category/{category_id}", get(books_in_category))
        .route("/{book_id}/{category_id}", delete(remove_link))
}

#[utoipa::path(
    post,
    path = "/api/belongs-to",
    request_body = CreateBelongsToRequest,
    responses(
        (status = 200, description = "Assign book to category", body = ApiResponse<BelongsTo>),
        (status = 403, description = "Not the book's merchant or an admin"),
        (status = 404, description = "Book or category not found"),
        (status = 409, description = "Association already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "BelongsTo"
)]
pub async fn create_link(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<CreateBelongsToRequest>,
) -> AppResult<Json<ApiResponse<BelongsTo>>> {
    let resp = belongs_to_service::create(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/belongs-to/batch",
    request_body = BatchBelongsToRequest,
    responses(
        (status = 200, description = "Best-effort batch assign; unknown categories and existing links are skipped", body = ApiResponse<BelongsToList>),
        (status = 403, description = "Not the book's merchant or an admin"),
        (status = 404, description = "Book not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "BelongsTo"
)]
pub async fn batch_link(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<BatchBelongsToRequest>,
) -> AppResult<Json<ApiResponse<BelongsToList>>> {
    let resp = belongs_to_service::add_book_to_categories(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/belongs-to",
    responses(
        (status = 200, description = "All associations", body = ApiResponse<BelongsToList>),
    ),
    tag = "BelongsTo"
)]
pub async fn list_links(State(pool): State<DbPool>) -> AppResult<Json<ApiResponse<BelongsToList>>> {
    let resp = belongs_to_service::find_all(&pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/belongs-to/book/{book_id}",
    params(("book_id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Categories of a book", body = ApiResponse<CategoryList>),
        (status = 404, description = "Book not found"),
    ),
    tag = "BelongsTo"
)]
pub async fn categories_of_book(
    State(pool): State<DbPool>,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = belongs_to_service::find_categories_by_book(&pool, book_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/belongs-to/category/{category_id}",
    params(("category_id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Books in a category", body = ApiResponse<BookList>),
        (status = 404, description = "Category not found"),
    ),
    tag = "BelongsTo"
)]
pub async fn books_in_category(
    State(pool): State<DbPool>,
    Path(category_id): Path<i32>,
) -> AppResult<Json<ApiResponse<BookList>>> {
    let resp = belongs_to_service::find_books_by_category(&pool, category_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/belongs-to/{book_id}/{category_id}",
    params(
        ("book_id" = Uuid, Path, description = "Book ID"),
        ("category_id" = i32, Path, description = "Category ID"),
    ),
    responses(
        (status = 200, description = "Remove association"),
        (status = 403, description = "Not the book's merchant or an admin"),
        (status = 404, description = "Association not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "BelongsTo"
)]
pub async fn remove_link(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path((book_id, category_id)): Path<(Uuid, i32)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = belongs_to_service::remove(&pool, &caller, book_id, category_id).await?;
    Ok(Json(resp))
}
