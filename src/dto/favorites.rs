use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::books::BookWithImages;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddFavoriteRequest {
    pub book_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteBookList {
    pub items: Vec<BookWithImages>,
}
