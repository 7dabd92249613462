use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::books::{
        AddBookImageRequest, BookList, BookSearchQuery, BookWithImages, CreateBookRequest,
        UpdateBookRequest, UpdateBookStatusRequest,
    },
    error::AppResult,
    middleware::auth::AuthMember,
    models::BookImage,
    response::ApiResponse,
    routes::{params::BookListQuery, uploads},
    services::book_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", post(create_book).get(list_books))
        .route("/search", get(search_books))
        .route("/upload-image", post(uploads::upload_image))
        .route("/isbn/{isbn}", get(get_book_by_isbn))
        .route("/{id}", get(get_book).patch(update_book).delete(delete_book))
        .route("/{id}/status", patch(update_book_status))
        .route("/{id}/images", post(add_book_image))
        .route("/images/{image_id}", delete(remove_book_image))
}

#[utoipa::path(
    post,
    path = "/api/books",
    request_body = CreateBookRequest,
    responses(
        (status = 200, description = "Create a book owned by the calling merchant", body = ApiResponse<BookWithImages>),
        (status = 400, description = "Invalid price, inventory, ISBN or status"),
        (status = 403, description = "Caller is not a merchant"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn create_book(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<CreateBookRequest>,
) -> AppResult<Json<ApiResponse<BookWithImages>>> {
    let resp = book_service::create(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/books",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("sort_by" = Option<String>, Query, description = "created_at, price or name"),
        ("sort_order" = Option<String>, Query, description = "asc or desc"),
    ),
    responses(
        (status = 200, description = "List books", body = ApiResponse<BookList>),
    ),
    tag = "Books"
)]
pub async fn list_books(
    State(pool): State<DbPool>,
    Query(query): Query<BookListQuery>,
) -> AppResult<Json<ApiResponse<BookList>>> {
    let resp = book_service::find_all(&pool, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/books/search",
    params(
        ("keyword" = Option<String>, Query, description = "Free text, ORed across the text columns"),
        ("isbn" = Option<String>, Query, description = "ISBN substring"),
        ("name" = Option<String>, Query, description = "Title substring"),
        ("author" = Option<String>, Query, description = "Author substring"),
        ("publisher" = Option<String>, Query, description = "Publisher substring"),
        ("merchant_name" = Option<String>, Query, description = "Shop name substring"),
    ),
    responses(
        (status = 200, description = "Search listed books", body = ApiResponse<BookList>),
    ),
    tag = "Books"
)]
pub async fn search_books(
    State(pool): State<DbPool>,
    Query(query): Query<BookSearchQuery>,
) -> AppResult<Json<ApiResponse<BookList>>> {
    let resp = book_service::search(&pool, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Get book", body = ApiResponse<BookWithImages>),
        (status = 404, description = "Book not found"),
    ),
    tag = "Books"
)]
pub async fn get_book(
    State(pool): State<DbPool>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookWithImages>>> {
    let resp = book_service::find_by_id(&pool, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/books/isbn/{isbn}",
    params(("isbn" = String, Path, description = "13-character ISBN")),
    responses(
        (status = 200, description = "Get book by ISBN", body = ApiResponse<BookWithImages>),
        (status = 404, description = "Book not found"),
    ),
    tag = "Books"
)]
pub async fn get_book_by_isbn(
    State(pool): State<DbPool>,
    Path(isbn): Path<String>,
) -> AppResult<Json<ApiResponse<BookWithImages>>> {
    let resp = book_service::find_by_isbn(&pool, &isbn).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Update book", body = ApiResponse<BookWithImages>),
        (status = 403, description = "Not the owning merchant or an admin"),
        (status = 409, description = "ISBN already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn update_book(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookRequest>,
) -> AppResult<Json<ApiResponse<BookWithImages>>> {
    let resp = book_service::update(&pool, &caller, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/books/{id}/status",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = UpdateBookStatusRequest,
    responses(
        (status = 200, description = "Set listing status", body = ApiResponse<BookWithImages>),
        (status = 400, description = "Status outside {0, 1}"),
        (status = 403, description = "Not the owning merchant or an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn update_book_status(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookStatusRequest>,
) -> AppResult<Json<ApiResponse<BookWithImages>>> {
    let resp = book_service::update_status(&pool, &caller, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Delete book and its images"),
        (status = 403, description = "Not the owning merchant or an admin"),
        (status = 404, description = "Book not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn delete_book(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = book_service::remove(&pool, &caller, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/books/{id}/images",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = AddBookImageRequest,
    responses(
        (status = 200, description = "Add book image", body = ApiResponse<BookImage>),
        (status = 403, description = "Not the owning merchant or an admin"),
        (status = 404, description = "Book not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn add_book_image(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddBookImageRequest>,
) -> AppResult<Json<ApiResponse<BookImage>>> {
    let resp = book_service::add_image(&pool, &caller, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/books/images/{image_id}",
    params(("image_id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Remove book image"),
        (status = 403, description = "Not the owning merchant or an admin"),
        (status = 404, description = "Image not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn remove_book_image(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(image_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = book_service::remove_image(&pool, &caller, image_id).await?;
    Ok(Json(resp))
}
