use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::coupons::{
        CouponList, CreateCouponRequest, CreateManageRequest, ManageList, UpdateCouponRequest,
    },
    error::AppResult,
    middleware::auth::AuthMember,
    models::{Coupon, Manage},
    response::ApiResponse,
    routes::params::Pagination,
    services::{coupon_service, manage_service},
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", post(create_coupon).get(list_coupons))
        .route("/mine", get(my_coupons))
        .route("/{id}", get(get_coupon).patch(update_coupon).delete(delete_coupon))
}

pub fn manage_router() -> Router<DbPool> {
    Router::new()
        .route("/", post(create_manage).get(list_manage))
        .route("/{coupon_id}", delete(delete_manage))
}

#[utoipa::path(
    post,
    path = "/api/coupons",
    request_body = CreateCouponRequest,
    responses(
        (status = 200, description = "Create a coupon owned by the caller", body = ApiResponse<Coupon>),
        (status = 403, description = "Caller is not a merchant or admin"),
        (status = 409, description = "Redemption code already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn create_coupon(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<CreateCouponRequest>,
) -> AppResult<Json<ApiResponse<Coupon>>> {
    let resp = coupon_service::create(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/coupons",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List coupons", body = ApiResponse<CouponList>),
    ),
    tag = "Coupons"
)]
pub async fn list_coupons(
    State(pool): State<DbPool>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CouponList>>> {
    let resp = coupon_service::find_all(&pool, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/coupons/mine",
    responses(
        (status = 200, description = "Coupons owned by the caller", body = ApiResponse<CouponList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn my_coupons(
    State(pool): State<DbPool>,
    caller: AuthMember,
) -> AppResult<Json<ApiResponse<CouponList>>> {
    let resp = coupon_service::find_mine(&pool, &caller).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon ID")),
    responses(
        (status = 200, description = "Get coupon", body = ApiResponse<Coupon>),
        (status = 403, description = "Not the owner or an admin"),
        (status = 404, description = "Coupon not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn get_coupon(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Coupon>>> {
    let resp = coupon_service::find_by_id(&pool, &caller, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon ID")),
    request_body = UpdateCouponRequest,
    responses(
        (status = 200, description = "Update coupon", body = ApiResponse<Coupon>),
        (status = 403, description = "Not the owner or an admin"),
        (status = 404, description = "Coupon not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn update_coupon(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCouponRequest>,
) -> AppResult<Json<ApiResponse<Coupon>>> {
    let resp = coupon_service::update(&pool, &caller, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon ID")),
    responses(
        (status = 200, description = "Delete coupon"),
        (status = 403, description = "Not the owner or an admin"),
        (status = 404, description = "Coupon not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn delete_coupon(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = coupon_service::remove(&pool, &caller, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/manage",
    request_body = CreateManageRequest,
    responses(
        (status = 200, description = "Link the calling admin to a coupon", body = ApiResponse<Manage>),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Link already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Manage"
)]
pub async fn create_manage(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<CreateManageRequest>,
) -> AppResult<Json<ApiResponse<Manage>>> {
    let resp = manage_service::create(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/manage",
    responses(
        (status = 200, description = "All admin/coupon links", body = ApiResponse<ManageList>),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Manage"
)]
pub async fn list_manage(
    State(pool): State<DbPool>,
    caller: AuthMember,
) -> AppResult<Json<ApiResponse<ManageList>>> {
    let resp = manage_service::find_all(&pool, &caller).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/manage/{coupon_id}",
    params(("coupon_id" = Uuid, Path, description = "Coupon ID")),
    responses(
        (status = 200, description = "Remove the calling admin's link"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Link not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Manage"
)]
pub async fn delete_manage(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(coupon_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = manage_service::remove(&pool, &caller, coupon_id).await?;
    Ok(Json(resp))
}
