use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::restrictions::{
        CreateRestrictMerchantRequest, CreateRestrictUserRequest, RestrictMerchantList,
        RestrictUserList, UpdateRestrictionRequest,
    },
    error::AppResult,
    middleware::auth::AuthMember,
    models::{RestrictMerchant, RestrictUser},
    response::ApiResponse,
    services::restriction_service,
};

pub fn user_router() -> Router<DbPool> {
    Router::new()
        .route("/", post(restrict_user).get(list_user_restrictions))
        .route(
            "/{user_id}",
            get(get_user_restrictions)
                .patch(update_user_restriction)
                .delete(delete_user_restriction),
        )
}

pub fn merchant_router() -> Router<DbPool> {
    Router::new()
        .route("/", post(restrict_merchant).get(list_merchant_restrictions))
        .route(
            "/{merchant_id}",
            get(get_merchant_restrictions)
                .patch(update_merchant_restriction)
                .delete(delete_merchant_restriction),
        )
}

#[utoipa::path(
    post,
    path = "/api/restrict-user",
    request_body = CreateRestrictUserRequest,
    responses(
        (status = 200, description = "Record a disciplinary state change on a user", body = ApiResponse<RestrictUser>),
        (status = 403, description = "Caller is not an admin, or target is not a user"),
        (status = 404, description = "Target not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restrictions"
)]
pub async fn restrict_user(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<CreateRestrictUserRequest>,
) -> AppResult<Json<ApiResponse<RestrictUser>>> {
    let resp = restriction_service::create_user_restriction(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restrict-user",
    responses(
        (status = 200, description = "All user restrictions", body = ApiResponse<RestrictUserList>),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restrictions"
)]
pub async fn list_user_restrictions(
    State(pool): State<DbPool>,
    caller: AuthMember,
) -> AppResult<Json<ApiResponse<RestrictUserList>>> {
    let resp = restriction_service::find_all_user_restrictions(&pool, &caller).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restrict-user/{user_id}",
    params(("user_id" = Uuid, Path, description = "Target user ID")),
    responses(
        (status = 200, description = "Restrictions recorded for one user", body = ApiResponse<RestrictUserList>),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restrictions"
)]
pub async fn get_user_restrictions(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RestrictUserList>>> {
    let resp = restriction_service::find_user_restrictions(&pool, &caller, user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/restrict-user/{user_id}",
    params(("user_id" = Uuid, Path, description = "Target user ID")),
    request_body = UpdateRestrictionRequest,
    responses(
        (status = 200, description = "Update the caller's record for this user", body = ApiResponse<RestrictUser>),
        (status = 404, description = "No record by this admin for this user"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restrictions"
)]
pub async fn update_user_restriction(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateRestrictionRequest>,
) -> AppResult<Json<ApiResponse<RestrictUser>>> {
    let resp =
        restriction_service::update_user_restriction(&pool, &caller, user_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/restrict-user/{user_id}",
    params(("user_id" = Uuid, Path, description = "Target user ID")),
    responses(
        (status = 200, description = "Delete the caller's record for this user"),
        (status = 404, description = "No record by this admin for this user"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restrictions"
)]
pub async fn delete_user_restriction(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = restriction_service::remove_user_restriction(&pool, &caller, user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/restrict-merchant",
    request_body = CreateRestrictMerchantRequest,
    responses(
        (status = 200, description = "Record a disciplinary state change on a merchant", body = ApiResponse<RestrictMerchant>),
        (status = 403, description = "Caller is not an admin, or target is not a merchant"),
        (status = 404, description = "Target not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restrictions"
)]
pub async fn restrict_merchant(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<CreateRestrictMerchantRequest>,
) -> AppResult<Json<ApiResponse<RestrictMerchant>>> {
    let resp = restriction_service::create_merchant_restriction(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restrict-merchant",
    responses(
        (status = 200, description = "All merchant restrictions", body = ApiResponse<RestrictMerchantList>),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restrictions"
)]
pub async fn list_merchant_restrictions(
    State(pool): State<DbPool>,
    caller: AuthMember,
) -> AppResult<Json<ApiResponse<RestrictMerchantList>>> {
    let resp = restriction_service::find_all_merchant_restrictions(&pool, &caller).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restrict-merchant/{merchant_id}",
    params(("merchant_id" = Uuid, Path, description = "Target merchant ID")),
    responses(
        (status = 200, description = "Restrictions recorded for one merchant", body = ApiResponse<RestrictMerchantList>),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restrictions"
)]
pub async fn get_merchant_restrictions(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(merchant_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RestrictMerchantList>>> {
    let resp =
        restriction_service::find_merchant_restrictions(&pool, &caller, merchant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/restrict-merchant/{merchant_id}",
    params(("merchant_id" = Uuid, Path, description = "Target merchant ID")),
    request_body = UpdateRestrictionRequest,
    responses(
        (status = 200, description = "Update the caller's record for this merchant", body = ApiResponse<RestrictMerchant>),
        (status = 404, description = "No record by this admin for this merchant"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restrictions"
)]
pub async fn update_merchant_restriction(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(merchant_id): Path<Uuid>,
    Json(payload): Json<UpdateRestrictionRequest>,
) -> AppResult<Json<ApiResponse<RestrictMerchant>>> {
    let resp =
        restriction_service::update_merchant_restriction(&pool, &caller, merchant_id, payload)
            .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/restrict-merchant/{merchant_id}",
    params(("merchant_id" = Uuid, Path, description = "Target merchant ID")),
    responses(
        (status = 200, description = "Delete the caller's record for this merchant"),
        (status = 404, description = "No record by this admin for this merchant"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restrictions"
)]
pub async fn delete_merchant_restriction(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(merchant_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp =
        restriction_service::remove_merchant_restriction(&pool, &caller, merchant_id).await?;
    Ok(Json(resp))
}
