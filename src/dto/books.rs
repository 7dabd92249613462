use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Book, BookImage};

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewBookImage {
    pub image_url: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub is_cover: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookRequest {
    pub isbn: String,
    pub name: String,
    pub description: String,
    pub price: i32,
    pub inventory_quantity: i32,
    pub author: String,
    pub publisher: String,
    pub status: Option<i32>,
    pub images: Option<Vec<NewBookImage>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookRequest {
    pub isbn: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i32>,
    pub inventory_quantity: Option<i32>,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookStatusRequest {
    pub status: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddBookImageRequest {
    pub image_url: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub is_cover: bool,
}

/// Search filters: named filters AND together, `keyword` ORs across the
/// text columns. Only listed (status=1) books are searched.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BookSearchQuery {
    pub keyword: Option<String>,
    pub isbn: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub merchant_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookWithImages {
    pub book: Book,
    pub images: Vec<BookImage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookList {
    pub items: Vec<BookWithImages>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedImage {
    pub url: String,
    pub filename: String,
    pub size: u64,
}
