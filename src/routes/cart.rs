use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::cart::{
        AddCartItemRequest, CartItemView, CartMerchantGroup, CartView, UpdateCartItemRequest,
    },
    error::AppResult,
    middleware::auth::AuthMember,
    models::CartItem,
    response::ApiResponse,
    services::cart_service,
};

pub fn router() -> Router<DbPool> {
    Router::new()
        .route("/", get(my_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/{book_id}", patch(update_item).delete(remove_item))
        .route(
            "/merchant/{merchant_id}",
            get(items_by_merchant).delete(remove_by_merchant),
        )
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Add to cart; quantity accumulates onto any existing row", body = ApiResponse<CartItem>),
        (status = 400, description = "Book unavailable or combined quantity exceeds inventory"),
        (status = 404, description = "Book not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_item(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::add_item(&pool, &caller, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart grouped per merchant with cover images", body = ApiResponse<CartView>),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn my_cart(
    State(pool): State<DbPool>,
    caller: AuthMember,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::find_my_cart(&pool, &caller).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart/merchant/{merchant_id}",
    params(("merchant_id" = Uuid, Path, description = "Merchant ID")),
    responses(
        (status = 200, description = "The caller's cart items for one merchant", body = ApiResponse<CartMerchantGroup>),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn items_by_merchant(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(merchant_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartMerchantGroup>>> {
    let resp = cart_service::find_by_merchant(&pool, &caller, merchant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{book_id}",
    params(("book_id" = Uuid, Path, description = "Book ID")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Set cart quantity", body = ApiResponse<CartItem>),
        (status = 400, description = "Quantity exceeds inventory"),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_item(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(book_id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::update_item(&pool, &caller, book_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{book_id}",
    params(("book_id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Remove a cart item"),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_item(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::remove_item(&pool, &caller, book_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/merchant/{merchant_id}",
    params(("merchant_id" = Uuid, Path, description = "Merchant ID")),
    responses(
        (status = 200, description = "Remove every cart item from one merchant"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_by_merchant(
    State(pool): State<DbPool>,
    caller: AuthMember,
    Path(merchant_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::remove_by_merchant(&pool, &caller, merchant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Clear the cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(pool): State<DbPool>,
    caller: AuthMember,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::clear(&pool, &caller).await?;
    Ok(Json(resp))
}
