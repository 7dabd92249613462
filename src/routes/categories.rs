use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};

use crate::{
    db::DbPool,
    dto::categories::{
        CategoryList, CategorySearchQuery, CreateCategoryRequest, UpdateCategoryRequest,
    },
    error::AppResult,
    middleware::auth::AuthMember,
    models::Category,
    response::ApiResponse,
    services::category_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", post(create_category).get(list_categories))
        .route("/search", get(search_categories))
        .route(
            "/{id}",
            get(get_category).patch(update_category).delete(delete_category),
        )
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Create category", body = ApiResponse<Category>),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Category name already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::create(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>),
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(pool): State<DbPool>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::find_all(&pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/search",
    params(("name" = String, Query, description = "Name substring")),
    responses(
        (status = 200, description = "Search categories by name", body = ApiResponse<CategoryList>),
    ),
    tag = "Categories"
)]
pub async fn search_categories(
    State(pool): State<DbPool>,
    Query(query): Query<CategorySearchQuery>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::search_by_name(&pool, &query.name).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(pool): State<DbPool>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::find_by_id(&pool, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Update category", body = ApiResponse<Category>),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Category name already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::update(&pool, &caller, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Delete category"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = category_service::remove(&pool, &caller, id).await?;
    Ok(Json(resp))
}
