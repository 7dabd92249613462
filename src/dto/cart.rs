use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Book, BookImage};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub book_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

/// A cart line with its book; only cover images are carried.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemView {
    pub quantity: i32,
    pub book: Book,
    pub images: Vec<BookImage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartMerchantGroup {
    pub merchant_id: Uuid,
    pub merchant_name: Option<String>,
    pub items: Vec<CartItemView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub merchants: Vec<CartMerchantGroup>,
}
