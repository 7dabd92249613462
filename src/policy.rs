//! Declarative authorization: one (role, action) table instead of per-handler
//! if-chains. Owner-scoped decisions are resolved against the id the service
//! passes in (book owner, order owner, subscription user, ...).

use uuid::Uuid;

use crate::{error::AppError, middleware::auth::AuthMember, models::MemberRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Update or delete a member record.
    MemberManage,
    /// Create a book listing.
    BookPublish,
    /// Mutate an existing book, its images, its status, or its categories.
    BookManage,
    /// Create/update/delete categories.
    CategoryManage,
    /// Any cart operation; carts belong to the user persona.
    CartUse,
    /// Place an order.
    OrderPlace,
    /// Read a single order.
    OrderView,
    /// Patch an order (field restrictions are enforced by the order service).
    OrderUpdate,
    /// Delete an order; merchants can never do this.
    OrderDelete,
    /// Create a coupon.
    CouponIssue,
    /// Update or delete a coupon.
    CouponManage,
    /// Redeem a coupon code.
    ClaimCoupon,
    /// Update or delete a claim.
    ClaimManage,
    /// Subscribe to a merchant.
    Subscribe,
    /// Update or delete a subscription.
    SubscriptionManage,
    /// Add/remove favorites.
    FavoriteUse,
    /// Create/update/delete reviews.
    ReviewWrite,
    /// Restriction records and the admin/coupon manage table.
    RestrictionManage,
    /// Upload catalog images.
    UploadImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    OwnerOnly,
    Deny,
}

pub fn decide(role: MemberRole, action: Action) -> Decision {
    use Action::*;
    use MemberRole::*;

    match (role, action) {
        // Admins pass every management gate but have no user persona: they
        // cannot hold carts, place orders, claim coupons, follow merchants,
        // favorite books, or review them.
        (Admin, CartUse | OrderPlace | ClaimCoupon | Subscribe | FavoriteUse | ReviewWrite) => {
            Decision::Deny
        }
        (Admin, _) => Decision::Allow,

        (User, CartUse | OrderPlace | ClaimCoupon | Subscribe | FavoriteUse | ReviewWrite) => {
            Decision::Allow
        }
        (
            User,
            MemberManage | OrderView | OrderUpdate | OrderDelete | ClaimManage
            | SubscriptionManage,
        ) => Decision::OwnerOnly,
        (User, _) => Decision::Deny,

        (Merchant, BookPublish | CouponIssue | UploadImage) => Decision::Allow,
        (Merchant, MemberManage | BookManage | CouponManage | OrderView | OrderUpdate) => {
            Decision::OwnerOnly
        }
        (Merchant, _) => Decision::Deny,
    }
}

/// Check `action` for `caller`, comparing against `owner` when the table says
/// the action is owner-scoped.
pub fn ensure(caller: &AuthMember, action: Action, owner: Option<Uuid>) -> Result<(), AppError> {
    match decide(caller.role, action) {
        Decision::Allow => Ok(()),
        Decision::OwnerOnly if owner.is_some_and(|id| id == caller.member_id) => Ok(()),
        Decision::OwnerOnly | Decision::Deny => Err(AppError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: MemberRole) -> AuthMember {
        AuthMember {
            member_id: Uuid::new_v4(),
            account: "tester".into(),
            role,
        }
    }

    #[test]
    fn admin_passes_management_gates() {
        for action in [
            Action::MemberManage,
            Action::BookManage,
            Action::CategoryManage,
            Action::OrderDelete,
            Action::RestrictionManage,
        ] {
            assert_eq!(decide(MemberRole::Admin, action), Decision::Allow);
        }
    }

    #[test]
    fn admin_has_no_user_persona() {
        for action in [
            Action::CartUse,
            Action::OrderPlace,
            Action::ClaimCoupon,
            Action::Subscribe,
            Action::FavoriteUse,
            Action::ReviewWrite,
        ] {
            assert_eq!(decide(MemberRole::Admin, action), Decision::Deny);
        }
    }

    #[test]
    fn merchants_never_delete_orders() {
        assert_eq!(
            decide(MemberRole::Merchant, Action::OrderDelete),
            Decision::Deny
        );
    }

    #[test]
    fn users_touch_only_their_own_records() {
        let me = caller(MemberRole::User);
        assert!(ensure(&me, Action::MemberManage, Some(me.member_id)).is_ok());
        assert!(ensure(&me, Action::MemberManage, Some(Uuid::new_v4())).is_err());
        assert!(ensure(&me, Action::MemberManage, None).is_err());
    }

    #[test]
    fn users_cannot_publish_books() {
        assert_eq!(
            decide(MemberRole::User, Action::BookPublish),
            Decision::Deny
        );
    }

    #[test]
    fn merchant_book_mutation_is_owner_scoped() {
        let shop = caller(MemberRole::Merchant);
        assert!(ensure(&shop, Action::BookManage, Some(shop.member_id)).is_ok());
        assert!(ensure(&shop, Action::BookManage, Some(Uuid::new_v4())).is_err());
    }
}
