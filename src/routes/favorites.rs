use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::favorites::{AddFavoriteRequest, FavoriteBookList},
    error::AppResult,
    middleware::auth::AuthMember,
    models::Favorite,
    response::ApiResponse,
    routes::params::Pagination,
    services::favorite_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", get(list_favorites).post(add_favorite))
        .route("/{book_id}", delete(remove_favorite))
}

#[utoipa::path(
    post,
    path = "/api/favorites",
    request_body = AddFavoriteRequest,
    responses(
        (status = 200, description = "Add favorite", body = ApiResponse<Favorite>),
        (status = 403, description = "Caller is not a user"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Already favorited"),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn add_favorite(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<AddFavoriteRequest>,
) -> AppResult<Json<ApiResponse<Favorite>>> {
    let resp = favorite_service::create(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/favorites",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "The caller's favorite books", body = ApiResponse<FavoriteBookList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn list_favorites(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<FavoriteBookList>>> {
    let resp = favorite_service::find_mine(&pool, &caller, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/favorites/{book_id}",
    params(("book_id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Remove favorite"),
        (status = 404, description = "Favorite not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn remove_favorite(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = favorite_service::remove(&pool, &caller, book_id).await?;
    Ok(Json(resp))
}
