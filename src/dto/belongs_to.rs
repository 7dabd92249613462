use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::BelongsTo;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBelongsToRequest {
    pub book_id: Uuid,
    pub category_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchBelongsToRequest {
    pub book_id: Uuid,
    pub category_ids: Vec<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BelongsToList {
    pub items: Vec<BelongsTo>,
}
