use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    pub merchant_id: Uuid,
    pub state: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSubscriptionRequest {
    pub state: i32,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct SubscriptionView {
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub merchant_id: Uuid,
    pub merchant_name: Option<String>,
    pub state: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionList {
    pub items: Vec<SubscriptionView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriberCount {
    pub merchant_id: Uuid,
    pub subscriber_count: i64,
}
