mod common;

use obs_backend::{
    dto::{
        belongs_to::{BatchBelongsToRequest, CreateBelongsToRequest},
        books::{BookSearchQuery, CreateBookRequest},
        categories::CreateCategoryRequest,
    },
    error::AppError,
    services::{belongs_to_service, book_service, category_service},
};

fn book_request(isbn: &str, name: &str, author: &str, status: i32) -> CreateBookRequest {
    CreateBookRequest {
        isbn: isbn.into(),
        name: name.into(),
        description: format!("All about {name}"),
        price: 450,
        inventory_quantity: 10,
        author: author.into(),
        publisher: "No Starch Press".into(),
        status: Some(status),
        images: None,
    }
}

// Category uniqueness, book/category association rules (including the
// best-effort batch), and the status-gated AND/OR search.
#[tokio::test]
async fn categories_associations_and_search_flow() -> anyhow::Result<()> {
    let pool = match common::setup_pool().await? {
        Some(pool) => pool,
        None => return Ok(()),
    };

    let admin = common::register_admin(&pool, "root", "root@example.com", "0933000001").await?;
    let shop =
        common::register_merchant(&pool, "shop1", "Shop1", "shop1@example.com", "0933000002")
            .await?;
    let user = common::register_user(&pool, "reader", "reader@example.com", "0933000003").await?;

    let programming = category_service::create(
        &pool,
        &admin.auth,
        CreateCategoryRequest {
            name: "Programming".into(),
            description: None,
        },
    )
    .await?
    .data
    .unwrap();

    let dup = category_service::create(
        &pool,
        &admin.auth,
        CreateCategoryRequest {
            name: "Programming".into(),
            description: None,
        },
    )
    .await;
    assert!(matches!(dup, Err(AppError::Conflict(_))));

    let listed = book_service::create(
        &pool,
        &shop.auth,
        book_request("9781593278281", "The Rust Programming Language", "Klabnik", 1),
    )
    .await?
    .data
    .unwrap()
    .book;
    let unlisted = book_service::create(
        &pool,
        &shop.auth,
        book_request("9781593278282", "Rust Drafts", "Klabnik", 0),
    )
    .await?
    .data
    .unwrap()
    .book;

    // Linking once succeeds; the same link again is a Conflict.
    belongs_to_service::create(
        &pool,
        &shop.auth,
        CreateBelongsToRequest {
            book_id: listed.id,
            category_id: programming.id,
        },
    )
    .await?;
    let dup_link = belongs_to_service::create(
        &pool,
        &shop.auth,
        CreateBelongsToRequest {
            book_id: listed.id,
            category_id: programming.id,
        },
    )
    .await;
    assert!(matches!(dup_link, Err(AppError::Conflict(_))));

    // Only the owning merchant or an admin may link.
    let foreign_link = belongs_to_service::create(
        &pool,
        &user.auth,
        CreateBelongsToRequest {
            book_id: listed.id,
            category_id: programming.id,
        },
    )
    .await;
    assert!(matches!(foreign_link, Err(AppError::Forbidden(_))));

    // Batch is best-effort: an existing link and an unknown category are both
    // skipped without surfacing an error.
    let batch = belongs_to_service::add_book_to_categories(
        &pool,
        &shop.auth,
        BatchBelongsToRequest {
            book_id: listed.id,
            category_ids: vec![programming.id, 9999],
        },
    )
    .await?
    .data
    .unwrap();
    assert!(batch.items.is_empty());

    let in_category = belongs_to_service::find_books_by_category(&pool, programming.id)
        .await?
        .data
        .unwrap();
    assert_eq!(in_category.items.len(), 1);

    // Search: keyword hits the listed book, never the unlisted draft.
    let by_keyword = book_service::search(
        &pool,
        BookSearchQuery {
            keyword: Some("rust".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert!(by_keyword.items.iter().any(|b| b.book.id == listed.id));
    assert!(by_keyword.items.iter().all(|b| b.book.id != unlisted.id));

    // Named filters AND together: right author + wrong shop finds nothing.
    let wrong_shop = book_service::search(
        &pool,
        BookSearchQuery {
            author: Some("klabnik".into()),
            merchant_name: Some("Shop2".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert!(wrong_shop.items.is_empty());

    let by_shop = book_service::search(
        &pool,
        BookSearchQuery {
            author: Some("klabnik".into()),
            merchant_name: Some("shop1".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(by_shop.items.len(), 1);

    Ok(())
}
