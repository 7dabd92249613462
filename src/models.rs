use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Account role. Persisted as the `member_role` Postgres enum; the role tag
/// decides which profile fields of a member are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    User,
    Merchant,
    Admin,
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MemberRole::User => "User",
            MemberRole::Merchant => "Merchant",
            MemberRole::Admin => "Admin",
        };
        write!(f, "{name}")
    }
}

/// One row of `members`. Fields outside the member's role stay NULL.
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Member {
    pub id: Uuid,
    pub email: String,
    pub account: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone_number: String,
    pub role: MemberRole,
    pub user_name: Option<String>,
    pub level: Option<i32>,
    pub user_state: Option<i32>,
    pub merchant_name: Option<String>,
    pub merchant_address: Option<String>,
    pub merchant_state: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Book {
    pub id: Uuid,
    pub isbn: String,
    pub name: String,
    pub description: String,
    pub price: i32,
    pub inventory_quantity: i32,
    pub author: String,
    pub publisher: String,
    /// 0 = unavailable, 1 = listed.
    pub status: i32,
    pub merchant_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct BookImage {
    pub id: Uuid,
    pub book_id: Uuid,
    pub image_url: String,
    pub display_order: i32,
    pub is_cover: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct BelongsTo {
    pub book_id: Uuid,
    pub category_id: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct CartItem {
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub shipping_address: String,
    pub payment_method: i32,
    pub total_price: i64,
    pub total_quantity: i32,
    pub state: i32,
    pub coupon_id: Option<Uuid>,
    pub user_id: Uuid,
    pub merchant_id: Uuid,
    pub order_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct OrderItem {
    pub order_id: Uuid,
    pub book_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Coupon {
    pub id: Uuid,
    pub amount: i32,
    pub valid_date: Option<DateTime<Utc>>,
    pub discount: f64,
    pub description: String,
    pub redemption_code: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_date.is_some_and(|valid| valid < now)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Claim {
    pub user_id: Uuid,
    pub coupon_id: Uuid,
    pub state: i32,
    pub used_at: Option<DateTime<Utc>>,
    pub claimed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Manage {
    pub admin_id: Uuid,
    pub coupon_id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Subscription {
    pub user_id: Uuid,
    pub merchant_id: Uuid,
    pub state: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Favorite {
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Review {
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub stars: i32,
    pub description: String,
    pub review_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct RestrictUser {
    pub admin_id: Uuid,
    pub user_id: Uuid,
    pub original_state: i32,
    pub latest_state: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct RestrictMerchant {
    pub admin_id: Uuid,
    pub merchant_id: Uuid,
    pub original_state: i32,
    pub latest_state: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(valid_date: Option<DateTime<Utc>>) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4(),
            amount: 1,
            valid_date,
            discount: 0.9,
            description: "test".into(),
            redemption_code: "CODE".into(),
            owner_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn coupon_without_valid_date_never_expires() {
        let now = Utc::now();
        assert!(!coupon(None).is_expired(now));
    }

    #[test]
    fn coupon_expiry_is_a_strict_cutoff() {
        let now = Utc::now();
        assert!(coupon(Some(now - Duration::hours(1))).is_expired(now));
        assert!(!coupon(Some(now + Duration::hours(1))).is_expired(now));
    }
}
