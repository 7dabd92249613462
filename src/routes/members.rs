use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::members::{
        LoginRequest, LoginResponse, MemberList, MemberTypeResponse, MemberView,
        MerchantWithBooks, RegisterMemberRequest, UpdateMemberRequest,
    },
    error::AppResult,
    middleware::auth::AuthMember,
    response::ApiResponse,
    services::member_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", post(register).get(list_members))
        .route("/login", post(login))
        .route("/{id}", get(get_member).patch(update_member).delete(delete_member))
        .route("/{id}/type", get(get_member_type))
        .route("/{id}/books", get(get_merchant_books))
}

#[utoipa::path(
    post,
    path = "/api/members",
    request_body = RegisterMemberRequest,
    responses(
        (status = 200, description = "Register a member", body = ApiResponse<MemberView>),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "Email, account, phone or shop name already taken"),
    ),
    tag = "Members"
)]
pub async fn register(
    State(pool): State<DbPool>,
    Json(payload): Json<RegisterMemberRequest>,
) -> AppResult<Json<ApiResponse<MemberView>>> {
    let resp = member_service::register(&pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/members/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid account or password"),
    ),
    tag = "Members"
)]
pub async fn login(
    State(pool): State<DbPool>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = member_service::login(&pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/members",
    responses(
        (status = 200, description = "List members", body = ApiResponse<MemberList>),
    ),
    tag = "Members"
)]
pub async fn list_members(State(pool): State<DbPool>) -> AppResult<Json<ApiResponse<MemberList>>> {
    let resp = member_service::find_all(&pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/members/{id}",
    params(("id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Get member", body = ApiResponse<MemberView>),
        (status = 404, description = "Member not found"),
    ),
    tag = "Members"
)]
pub async fn get_member(
    State(pool): State<DbPool>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MemberView>>> {
    let resp = member_service::find_by_id(&pool, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/members/{id}/type",
    params(("id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Get member role", body = ApiResponse<MemberTypeResponse>),
        (status = 404, description = "Member not found"),
    ),
    tag = "Members"
)]
pub async fn get_member_type(
    State(pool): State<DbPool>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MemberTypeResponse>>> {
    let resp = member_service::find_member_type(&pool, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/members/{id}/books",
    params(("id" = Uuid, Path, description = "Merchant ID")),
    responses(
        (status = 200, description = "Merchant profile with catalog", body = ApiResponse<MerchantWithBooks>),
        (status = 404, description = "Member not found"),
    ),
    tag = "Members"
)]
pub async fn get_merchant_books(
    State(pool): State<DbPool>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MerchantWithBooks>>> {
    let resp = member_service::find_merchant_books(&pool, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/members/{id}",
    params(("id" = Uuid, Path, description = "Member ID")),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Update member", body = ApiResponse<MemberView>),
        (status = 403, description = "Not the member or an admin"),
        (status = 409, description = "Field not owned by the member's role, or uniqueness violated"),
    ),
    security(("bearer_auth" = [])),
    tag = "Members"
)]
pub async fn update_member(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMemberRequest>,
) -> AppResult<Json<ApiResponse<MemberView>>> {
    let resp = member_service::update(&pool, &caller, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/members/{id}",
    params(("id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Delete member"),
        (status = 403, description = "Not the member or an admin"),
        (status = 404, description = "Member not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Members"
)]
pub async fn delete_member(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = member_service::remove(&pool, &caller, id).await?;
    Ok(Json(resp))
}
