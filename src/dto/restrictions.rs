use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{RestrictMerchant, RestrictUser};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestrictUserRequest {
    pub user_id: Uuid,
    pub original_state: i32,
    pub latest_state: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestrictMerchantRequest {
    pub merchant_id: Uuid,
    pub original_state: i32,
    pub latest_state: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRestrictionRequest {
    pub original_state: Option<i32>,
    pub latest_state: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestrictUserList {
    pub items: Vec<RestrictUser>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestrictMerchantList {
    pub items: Vec<RestrictMerchant>,
}
