use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        belongs_to::BelongsToList,
        books::{BookList, BookWithImages, UploadedImage},
        cart::{CartItemView, CartMerchantGroup, CartView},
        categories::CategoryList,
        claims::{ClaimList, ClaimWithCoupon},
        coupons::{CouponList, ManageList},
        favorites::FavoriteBookList,
        members::{LoginResponse, MemberList, MemberTypeResponse, MemberView, MerchantWithBooks},
        orders::{OrderList, OrderWithItems},
        reviews::ReviewList,
        subscriptions::{SubscriberCount, SubscriptionList, SubscriptionView},
    },
    models::{
        BelongsTo, Book, BookImage, CartItem, Category, Claim, Coupon, Favorite, Manage, Member,
        MemberRole, Order, OrderItem, RestrictMerchant, RestrictUser, Review, Subscription,
    },
    response::{ApiResponse, Meta},
    routes::{
        belongs_to, books, cart, categories, claims, coupons, favorites, health, members, orders,
        restrictions, reviews, subscriptions, uploads,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        members::register,
        members::login,
        members::list_members,
        members::get_member,
        members::get_member_type,
        members::get_merchant_books,
        members::update_member,
        members::delete_member,
        books::create_book,
        books::list_books,
        books::search_books,
        books::get_book,
        books::get_book_by_isbn,
        books::update_book,
        books::update_book_status,
        books::delete_book,
        books::add_book_image,
        books::remove_book_image,
        uploads::upload_image,
        categories::create_category,
        categories::list_categories,
        categories::search_categories,
        categories::get_category,
        categories::update_category,
        categories::delete_category,
        belongs_to::create_link,
        belongs_to::batch_link,
        belongs_to::list_links,
        belongs_to::categories_of_book,
        belongs_to::books_in_category,
        belongs_to::remove_link,
        cart::add_item,
        cart::my_cart,
        cart::items_by_merchant,
        cart::update_item,
        cart::remove_item,
        cart::remove_by_merchant,
        cart::clear_cart,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        coupons::create_coupon,
        coupons::list_coupons,
        coupons::my_coupons,
        coupons::get_coupon,
        coupons::update_coupon,
        coupons::delete_coupon,
        coupons::create_manage,
        coupons::list_manage,
        coupons::delete_manage,
        claims::create_claim,
        claims::list_claims,
        claims::my_claims,
        claims::update_claim,
        claims::delete_claim,
        subscriptions::subscribe,
        subscriptions::list_subscriptions,
        subscriptions::subscriptions_of_user,
        subscriptions::subscribers_of_merchant,
        subscriptions::subscriber_count,
        subscriptions::get_subscription,
        subscriptions::update_subscription,
        subscriptions::unsubscribe,
        favorites::add_favorite,
        favorites::list_favorites,
        favorites::remove_favorite,
        reviews::create_review,
        reviews::reviews_of_book,
        reviews::my_reviews,
        reviews::update_review,
        reviews::delete_review,
        restrictions::restrict_user,
        restrictions::list_user_restrictions,
        restrictions::get_user_restrictions,
        restrictions::update_user_restriction,
        restrictions::delete_user_restriction,
        restrictions::restrict_merchant,
        restrictions::list_merchant_restrictions,
        restrictions::get_merchant_restrictions,
        restrictions::update_merchant_restriction,
        restrictions::delete_merchant_restriction,
    ),
    components(
        schemas(
            MemberRole,
            Member,
            Book,
            BookImage,
            Category,
            BelongsTo,
            CartItem,
            Order,
            OrderItem,
            Coupon,
            Claim,
            Manage,
            Subscription,
            Favorite,
            Review,
            RestrictUser,
            RestrictMerchant,
            MemberView,
            MemberList,
            MemberTypeResponse,
            MerchantWithBooks,
            LoginResponse,
            BookWithImages,
            BookList,
            UploadedImage,
            CategoryList,
            BelongsToList,
            CartItemView,
            CartMerchantGroup,
            CartView,
            OrderWithItems,
            OrderList,
            CouponList,
            ManageList,
            ClaimWithCoupon,
            ClaimList,
            SubscriptionView,
            SubscriptionList,
            SubscriberCount,
            FavoriteBookList,
            ReviewList,
            Meta,
            ApiResponse<Book>,
            ApiResponse<BookList>,
            ApiResponse<MemberView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CartView>,
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Members", description = "Registration, login and member profiles"),
        (name = "Books", description = "Catalog listings, images and search"),
        (name = "Categories", description = "Category management"),
        (name = "BelongsTo", description = "Book/category associations"),
        (name = "Cart", description = "Per-user pending purchases"),
        (name = "Orders", description = "Order placement and lifecycle"),
        (name = "Coupons", description = "Discount instruments"),
        (name = "Manage", description = "Admin/coupon management links"),
        (name = "Claims", description = "Coupon redemptions"),
        (name = "Subscriptions", description = "User follows of merchants"),
        (name = "Favorites", description = "Per-user book bookmarks"),
        (name = "Reviews", description = "Per-user book reviews"),
        (name = "Restrictions", description = "Admin disciplinary records"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
