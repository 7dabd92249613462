use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Claim, Coupon};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClaimRequest {
    pub redemption_code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateClaimRequest {
    pub state: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimWithCoupon {
    pub claim: Claim,
    pub coupon: Coupon,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimList {
    pub items: Vec<ClaimWithCoupon>,
}
