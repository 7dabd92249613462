use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::books::BookWithImages;
use crate::models::{Member, MemberRole};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterMemberRequest {
    pub email: String,
    pub account: String,
    pub password: String,
    pub phone_number: String,
    pub role: MemberRole,
    pub user_name: Option<String>,
    pub level: Option<i32>,
    pub merchant_name: Option<String>,
    pub merchant_address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMemberRequest {
    pub email: Option<String>,
    pub account: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub user_name: Option<String>,
    pub level: Option<i32>,
    pub user_state: Option<i32>,
    pub merchant_name: Option<String>,
    pub merchant_address: Option<String>,
    pub merchant_state: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub account: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Bearer token payload: `{sub, account, type, exp}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub account: String,
    #[serde(rename = "type")]
    pub role: MemberRole,
    pub exp: usize,
}

/// Outward view of a member; merchants carry a subscriber count computed
/// from the subscriptions table at read time.
#[derive(Debug, Serialize, ToSchema)]
pub struct MemberView {
    pub id: Uuid,
    pub email: String,
    pub account: String,
    pub phone_number: String,
    pub role: MemberRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_state: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_state: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberView {
    pub fn from_member(member: Member, subscriber_count: Option<i64>) -> Self {
        Self {
            id: member.id,
            email: member.email,
            account: member.account,
            phone_number: member.phone_number,
            role: member.role,
            user_name: member.user_name,
            level: member.level,
            user_state: member.user_state,
            merchant_name: member.merchant_name,
            merchant_address: member.merchant_address,
            merchant_state: member.merchant_state,
            subscriber_count,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberList {
    pub items: Vec<MemberView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberTypeResponse {
    pub id: Uuid,
    pub role: MemberRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MerchantWithBooks {
    pub member: MemberView,
    pub books: Vec<BookWithImages>,
}
