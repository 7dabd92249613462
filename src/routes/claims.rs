use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::claims::{ClaimList, CreateClaimRequest, UpdateClaimRequest},
    error::AppResult,
    middleware::auth::AuthMember,
    models::Claim,
    response::ApiResponse,
    services::claim_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", post(create_claim).get(list_claims))
        .route("/mine", get(my_claims))
        .route("/{user_id}/{coupon_id}", patch(update_claim).delete(delete_claim))
}

#[utoipa::path(
    post,
    path = "/api/claims",
    request_body = CreateClaimRequest,
    responses(
        (status = 200, description = "Redeem a coupon code", body = ApiResponse<Claim>),
        (status = 403, description = "Caller is not a user"),
        (status = 404, description = "No coupon for this code"),
        (status = 409, description = "Coupon expired or already claimed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Claims"
)]
pub async fn create_claim(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<CreateClaimRequest>,
) -> AppResult<Json<ApiResponse<Claim>>> {
    let resp = claim_service::create(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/claims",
    responses(
        (status = 200, description = "All claims (admin only)", body = ApiResponse<ClaimList>),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Claims"
)]
pub async fn list_claims(
    State(pool): State<DbPool>,
    caller: AuthMember,
) -> AppResult<Json<ApiResponse<ClaimList>>> {
    let resp = claim_service::find_all(&pool, &caller).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/claims/mine",
    responses(
        (status = 200, description = "The caller's claims with coupons", body = ApiResponse<ClaimList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Claims"
)]
pub async fn my_claims(
    State(pool): State<DbPool>,
    caller: AuthMember,
) -> AppResult<Json<ApiResponse<ClaimList>>> {
    let resp = claim_service::find_mine(&pool, &caller).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/claims/{user_id}/{coupon_id}",
    params(
        ("user_id" = Uuid, Path, description = "Claiming user ID"),
        ("coupon_id" = Uuid, Path, description = "Coupon ID"),
    ),
    request_body = UpdateClaimRequest,
    responses(
        (status = 200, description = "Update claim state; state 1 stamps used_at", body = ApiResponse<Claim>),
        (status = 403, description = "Not the claim owner or an admin"),
        (status = 404, description = "Claim not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Claims"
)]
pub async fn update_claim(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path((user_id, coupon_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateClaimRequest>,
) -> AppResult<Json<ApiResponse<Claim>>> {
    let resp = claim_service::update(&pool, &caller, user_id, coupon_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/claims/{user_id}/{coupon_id}",
    params(
        ("user_id" = Uuid, Path, description = "Claiming user ID"),
        ("coupon_id" = Uuid, Path, description = "Coupon ID"),
    ),
    responses(
        (status = 200, description = "Delete claim"),
        (status = 403, description = "Not the claim owner or an admin"),
        (status = 404, description = "Claim not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Claims"
)]
pub async fn delete_claim(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path((user_id, coupon_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = claim_service::remove(&pool, &caller, user_id, coupon_id).await?;
    Ok(Json(resp))
}
