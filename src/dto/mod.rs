pub mod belongs_to;
pub mod books;
pub mod cart;
pub mod categories;
pub mod claims;
pub mod coupons;
pub mod favorites;
pub mod members;
pub mod orders;
pub mod restrictions;
pub mod reviews;
pub mod subscriptions;
