use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::subscriptions::{
        CreateSubscriptionRequest, SubscriberCount, SubscriptionList, SubscriptionView,
        UpdateSubscriptionRequest,
    },
    error::AppResult,
    middleware::auth::AuthMember,
    response::ApiResponse,
    services::subscription_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", post(subscribe).get(list_subscriptions))
        .route("/user/{user_id}", get(subscriptions_of_user))
        .route("/merchant/{merchant_id}", get(subscribers_of_merchant))
        .route("/merchant/{merchant_id}/count", get(subscriber_count))
        .route(
            "/{user_id}/{merchant_id}",
            get(get_subscription)
                .patch(update_subscription)
                .delete(unsubscribe),
        )
}

#[utoipa::path(
    post,
    path = "/api/subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscribe the caller to a merchant", body = ApiResponse<SubscriptionView>),
        (status = 404, description = "Merchant not found"),
        (status = 409, description = "Already subscribed or target is not a merchant"),
    ),
    security(("bearer_auth" = [])),
    tag = "Subscriptions"
)]
pub async fn subscribe(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<CreateSubscriptionRequest>,
) -> AppResult<Json<ApiResponse<SubscriptionView>>> {
    let resp = subscription_service::create(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/subscriptions",
    responses(
        (status = 200, description = "All subscriptions", body = ApiResponse<SubscriptionList>),
    ),
    tag = "Subscriptions"
)]
pub async fn list_subscriptions(
    State(pool): State<DbPool>,
) -> AppResult<Json<ApiResponse<SubscriptionList>>> {
    let resp = subscription_service::find_all(&pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/user/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Subscriptions of a user", body = ApiResponse<SubscriptionList>),
    ),
    tag = "Subscriptions"
)]
pub async fn subscriptions_of_user(
    State(pool): State<DbPool>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SubscriptionList>>> {
    let resp = subscription_service::find_by_user(&pool, user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/merchant/{merchant_id}",
    params(("merchant_id" = Uuid, Path, description = "Merchant ID")),
    responses(
        (status = 200, description = "Subscribers of a merchant", body = ApiResponse<SubscriptionList>),
    ),
    tag = "Subscriptions"
)]
pub async fn subscribers_of_merchant(
    State(pool): State<DbPool>,
    Path(merchant_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SubscriptionList>>> {
    let resp = subscription_service::find_by_merchant(&pool, merchant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/merchant/{merchant_id}/count",
    params(("merchant_id" = Uuid, Path, description = "Merchant ID")),
    responses(
        (status = 200, description = "Live subscriber count", body = ApiResponse<SubscriberCount>),
    ),
    tag = "Subscriptions"
)]
pub async fn subscriber_count(
    State(pool): State<DbPool>,
    Path(merchant_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SubscriberCount>>> {
    let resp = subscription_service::count_by_merchant(&pool, merchant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/{user_id}/{merchant_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("merchant_id" = Uuid, Path, description = "Merchant ID"),
    ),
    responses(
        (status = 200, description = "Get one subscription", body = ApiResponse<SubscriptionView>),
        (status = 404, description = "Subscription not found"),
    ),
    tag = "Subscriptions"
)]
pub async fn get_subscription(
    State(pool): State<DbPool>,
    Path((user_id, merchant_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<SubscriptionView>>> {
    let resp = subscription_service::find_one(&pool, user_id, merchant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/subscriptions/{user_id}/{merchant_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("merchant_id" = Uuid, Path, description = "Merchant ID"),
    ),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Toggle the notification state", body = ApiResponse<SubscriptionView>),
        (status = 403, description = "Not the subscriber or an admin"),
        (status = 404, description = "Subscription not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Subscriptions"
)]
pub async fn update_subscription(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path((user_id, merchant_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateSubscriptionRequest>,
) -> AppResult<Json<ApiResponse<SubscriptionView>>> {
    let resp =
        subscription_service::update(&pool, &caller, user_id, merchant_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/subscriptions/{user_id}/{merchant_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("merchant_id" = Uuid, Path, description = "Merchant ID"),
    ),
    responses(
        (status = 200, description = "Unsubscribe"),
        (status = 403, description = "Not the subscriber or an admin"),
        (status = 404, description = "Subscription not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Subscriptions"
)]
pub async fn unsubscribe(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path((user_id, merchant_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = subscription_service::remove(&pool, &caller, user_id, merchant_id).await?;
    Ok(Json(resp))
}
