pub mod belongs_to_service;
pub mod book_service;
pub mod cart_service;
pub mod category_service;
pub mod claim_service;
pub mod coupon_service;
pub mod favorite_service;
pub mod manage_service;
pub mod member_service;
pub mod order_service;
pub mod restriction_service;
pub mod review_service;
pub mod subscription_service;
