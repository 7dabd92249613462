use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
    error::AppResult,
    middleware::auth::AuthMember,
    models::Review,
    response::ApiResponse,
    routes::params::Pagination,
    services::review_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", post(create_review))
        .route("/mine", get(my_reviews))
        .route("/book/{book_id}", get(reviews_of_book))
        .route("/{book_id}", patch(update_review).delete(delete_review))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Create review", body = ApiResponse<Review>),
        (status = 400, description = "Stars outside 1..5"),
        (status = 403, description = "Caller is not a user"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Review already exists for this book"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::create(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reviews/book/{book_id}",
    params(
        ("book_id" = Uuid, Path, description = "Book ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Reviews of a book", body = ApiResponse<ReviewList>),
        (status = 404, description = "Book not found"),
    ),
    tag = "Reviews"
)]
pub async fn reviews_of_book(
    State(pool): State<DbPool>,
    Path(book_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::find_by_book(&pool, book_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reviews/mine",
    responses(
        (status = 200, description = "The caller's reviews", body = ApiResponse<ReviewList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn my_reviews(
    State(pool): State<DbPool>,
    caller: AuthMember,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::find_mine(&pool, &caller).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/reviews/{book_id}",
    params(("book_id" = Uuid, Path, description = "Book ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Update the caller's review", body = ApiResponse<Review>),
        (status = 404, description = "Review not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn update_review(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(book_id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::update(&pool, &caller, book_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{book_id}",
    params(("book_id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Delete the caller's review"),
        (status = 404, description = "Review not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = review_service::remove(&pool, &caller, book_id).await?;
    Ok(Json(resp))
}
