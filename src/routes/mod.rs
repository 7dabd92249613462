use axum::Router;

use crate::db::DbPool;

pub mod belongs_to;
pub mod books;
pub mod cart;
pub mod categories;
pub mod claims;
pub mod coupons;
pub mod doc;
pub mod favorites;
pub mod health;
pub mod members;
pub mod orders;
pub mod params;
pub mod restrictions;
pub mod reviews;
pub mod subscriptions;
pub mod uploads;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<DbPool> {
    Router::new()
        .nest("/members", members::router())
        .nest("/books", books::router())
        .nest("/categories", categories::router())
        .nest("/belongs-to", belongs_to::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/coupons", coupons::router())
        .nest("/manage", coupons::manage_router())
        .nest("/claims", claims::router())
        .nest("/subscriptions", subscriptions::router())
        .nest("/favorites", favorites::router())
        .nest("/reviews", reviews::router())
        .nest("/restrict-user", restrictions::user_router())
        .nest("/restrict-merchant", restrictions::merchant_router())
}
