use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Coupon, Manage};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCouponRequest {
    pub amount: Option<i32>,
    pub valid_date: Option<DateTime<Utc>>,
    pub discount: f64,
    pub description: String,
    pub redemption_code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCouponRequest {
    pub amount: Option<i32>,
    pub valid_date: Option<DateTime<Utc>>,
    pub discount: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CouponList {
    pub items: Vec<Coupon>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateManageRequest {
    pub coupon_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ManageList {
    pub items: Vec<Manage>,
}
