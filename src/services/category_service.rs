use crate::{
    db::DbPool,
    dto::categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::Category,
    policy::{self, Action},
    response::{ApiResponse, Meta},
};

pub async fn create(
    pool: &DbPool,
    caller: &AuthMember,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    policy::ensure(caller, Action::CategoryManage, None)?;

    if category_name_taken(pool, &payload.name, None).await? {
        return Err(AppError::Conflict(format!(
            "Category with name \"{}\" already exists",
            payload.name
        )));
    }

    let category: Category = sqlx::query_as(
        "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING *",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Category created",
        category,
        Some(Meta::empty()),
    ))
}

pub async fn find_all(pool: &DbPool) -> AppResult<ApiResponse<CategoryList>> {
    let items: Vec<Category> = sqlx::query_as("SELECT * FROM categories ORDER BY name ASC")
        .fetch_all(pool)
        .await?;
    Ok(ApiResponse::success("Categories", CategoryList { items }, None))
}

pub async fn find_by_id(pool: &DbPool, id: i32) -> AppResult<ApiResponse<Category>> {
    let category = get_category(pool, id).await?;
    Ok(ApiResponse::success("Category", category, None))
}

pub async fn search_by_name(pool: &DbPool, name: &str) -> AppResult<ApiResponse<CategoryList>> {
    let items: Vec<Category> =
        sqlx::query_as("SELECT * FROM categories WHERE name ILIKE $1 ORDER BY name ASC")
            .bind(format!("%{name}%"))
            .fetch_all(pool)
            .await?;
    Ok(ApiResponse::success("Categories", CategoryList { items }, None))
}

pub async fn update(
    pool: &DbPool,
    caller: &AuthMember,
    id: i32,
    patch: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    policy::ensure(caller, Action::CategoryManage, None)?;
    let category = get_category(pool, id).await?;

    if let Some(name) = patch.name.as_deref() {
        if name != category.name && category_name_taken(pool, name, Some(category.id)).await? {
            return Err(AppError::Conflict(format!(
                "Category with name \"{name}\" already exists"
            )));
        }
    }

    let updated: Category = sqlx::query_as(
        r#"
        UPDATE categories SET
            name = COALESCE($2, name),
            description = COALESCE($3, description)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(category.id)
    .bind(patch.name)
    .bind(patch.description)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Category updated",
        updated,
        Some(Meta::empty()),
    ))
}

pub async fn remove(
    pool: &DbPool,
    caller: &AuthMember,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    policy::ensure(caller, Action::CategoryManage, None)?;
    let category = get_category(pool, id).await?;

    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category.id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Category deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn get_category(pool: &DbPool, id: i32) -> AppResult<Category> {
    let category: Option<Category> = sqlx::query_as("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    category.ok_or_else(|| AppError::NotFound(format!("Category with ID \"{id}\" not found")))
}

async fn category_name_taken(pool: &DbPool, name: &str, exclude: Option<i32>) -> AppResult<bool> {
    let existing: Option<(i32,)> = sqlx::query_as(
        "SELECT id FROM categories WHERE name = $1 AND ($2::int IS NULL OR id <> $2)",
    )
    .bind(name)
    .bind(exclude)
    .fetch_optional(pool)
    .await?;
    Ok(existing.is_some())
}
