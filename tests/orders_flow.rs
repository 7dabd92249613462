mod common;

use obs_backend::{
    dto::{
        books::CreateBookRequest,
        cart::AddCartItemRequest,
        orders::{CreateOrderRequest, OrderItemRequest, UpdateOrderRequest},
    },
    error::AppError,
    services::{book_service, cart_service, order_service},
};
use uuid::Uuid;

fn book_request(isbn: &str, name: &str, price: i32, stock: i32) -> CreateBookRequest {
    CreateBookRequest {
        isbn: isbn.into(),
        name: name.into(),
        description: format!("{name} description"),
        price,
        inventory_quantity: stock,
        author: "Author".into(),
        publisher: "Publisher".into(),
        status: Some(1),
        images: None,
    }
}

fn order_request(items: Vec<OrderItemRequest>) -> CreateOrderRequest {
    CreateOrderRequest {
        shipping_address: "42 Wallaby Way".into(),
        payment_method: 0,
        coupon_id: None,
        items,
    }
}

// Cart inventory cap, the single-merchant rule, atomic order placement with
// inventory capture, and the role-scoped update/delete matrix.
#[tokio::test]
async fn cart_cap_single_merchant_rule_and_order_lifecycle() -> anyhow::Result<()> {
    let pool = match common::setup_pool().await? {
        Some(pool) => pool,
        None => return Ok(()),
    };

    let shop1 =
        common::register_merchant(&pool, "shop1", "Shop1", "shop1@example.com", "0922000001")
            .await?;
    let shop2 =
        common::register_merchant(&pool, "shop2", "Shop2", "shop2@example.com", "0922000002")
            .await?;
    let user = common::register_user(&pool, "buyer", "buyer@example.com", "0922000003").await?;

    let book_b = book_service::create(&pool, &shop1.auth, book_request("9780000000001", "B", 100, 5))
        .await?
        .data
        .unwrap()
        .book;
    let book_c = book_service::create(&pool, &shop2.auth, book_request("9780000000002", "C", 80, 4))
        .await?
        .data
        .unwrap()
        .book;

    // Adding 3 of B succeeds; 4 more would make 7 > 5 and is rejected.
    let added = cart_service::add_item(
        &pool,
        &user.auth,
        AddCartItemRequest {
            book_id: book_b.id,
            quantity: 3,
        },
    )
    .await?;
    assert_eq!(added.data.unwrap().quantity, 3);

    let over = cart_service::add_item(
        &pool,
        &user.auth,
        AddCartItemRequest {
            book_id: book_b.id,
            quantity: 4,
        },
    )
    .await;
    match over {
        Err(AppError::BadRequest(msg)) => assert!(msg.contains("exceeds inventory")),
        other => panic!("expected BadRequest, got {other:?}"),
    }

    // Books from two merchants can never share an order.
    let mixed = order_service::create(
        &pool,
        &user.auth,
        order_request(vec![
            OrderItemRequest {
                book_id: book_b.id,
                quantity: 2,
            },
            OrderItemRequest {
                book_id: book_c.id,
                quantity: 1,
            },
        ]),
    )
    .await;
    match mixed {
        Err(AppError::BadRequest(msg)) => assert!(msg.contains("same merchant")),
        other => panic!("expected BadRequest, got {other:?}"),
    }

    // Unknown book id fails before anything is written.
    let missing = order_service::create(
        &pool,
        &user.auth,
        order_request(vec![OrderItemRequest {
            book_id: Uuid::new_v4(),
            quantity: 1,
        }]),
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    // A valid order computes totals server-side and reserves inventory.
    let placed = order_service::create(
        &pool,
        &user.auth,
        order_request(vec![OrderItemRequest {
            book_id: book_b.id,
            quantity: 2,
        }]),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(placed.order.total_price, 200);
    assert_eq!(placed.order.total_quantity, 2);
    assert_eq!(placed.order.merchant_id, shop1.id);
    assert_eq!(placed.items.len(), 1);

    let after = book_service::get_book(&pool, book_b.id).await?;
    assert_eq!(after.inventory_quantity, 3);

    // Visibility: the owner and the shop see it, the other shop does not.
    assert!(order_service::find_by_id(&pool, &user.auth, placed.order.id)
        .await
        .is_ok());
    assert!(order_service::find_by_id(&pool, &shop1.auth, placed.order.id)
        .await
        .is_ok());
    assert!(matches!(
        order_service::find_by_id(&pool, &shop2.auth, placed.order.id).await,
        Err(AppError::Forbidden(_))
    ));

    // Users may not touch the state; merchants may touch only the state.
    let user_state_patch = UpdateOrderRequest {
        shipping_address: None,
        payment_method: None,
        state: Some(2),
    };
    assert!(matches!(
        order_service::update(&pool, &user.auth, placed.order.id, user_state_patch).await,
        Err(AppError::Forbidden(_))
    ));

    let merchant_state_patch = UpdateOrderRequest {
        shipping_address: None,
        payment_method: None,
        state: Some(1),
    };
    let shipped = order_service::update(&pool, &shop1.auth, placed.order.id, merchant_state_patch)
        .await?
        .data
        .unwrap();
    assert_eq!(shipped.state, 1);

    let merchant_address_patch = UpdateOrderRequest {
        shipping_address: Some("99 Other Road".into()),
        payment_method: None,
        state: None,
    };
    assert!(matches!(
        order_service::update(&pool, &shop1.auth, placed.order.id, merchant_address_patch).await,
        Err(AppError::Forbidden(_))
    ));

    // Merchants never delete orders; the owning user may.
    assert!(matches!(
        order_service::remove(&pool, &shop1.auth, placed.order.id).await,
        Err(AppError::Forbidden(_))
    ));
    order_service::remove(&pool, &user.auth, placed.order.id).await?;
    assert!(matches!(
        order_service::find_by_id(&pool, &user.auth, placed.order.id).await,
        Err(AppError::NotFound(_))
    ));

    Ok(())
}
