mod common;

use std::{str::FromStr, sync::Arc, time::Duration};

use axum_marketplace::{
    cart::Cart,
    dto::cart::{AddToCartRequest, UpdateCartRequest},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::Entity as Orders,
        products::{ActiveModel as ProductActive, Entity as Products},
    },
    error::AppError,
    models::{OrderStatus, UserRole},
    services::{cart_service, order_service},
};
use common::{
    FailingMailer, RecordingMailer, SlowMailer, create_product, create_store, create_user,
    new_session, setup_state, setup_state_with_mail_timeout,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

fn add(quantity: i64) -> AddToCartRequest {
    AddToCartRequest {
        quantity,
        update: false,
    }
}

#[tokio::test]
async fn checkout_with_empty_cart_is_rejected() -> anyhow::Result<()> {
    let state = setup_state(Arc::new(RecordingMailer::default())).await?;
    let buyer = create_user(&state, "buyer", UserRole::Buyer).await?;
    let session = new_session();

    let err = order_service::checkout(&state, &buyer, &session)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Your cart is empty"));
    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn checkout_creates_completed_order_and_empties_cart() -> anyhow::Result<()> {
    let mailer = Arc::new(RecordingMailer::default());
    let state = setup_state(mailer.clone()).await?;
    let vendor = create_user(&state, "vendor", UserRole::Vendor).await?;
    let buyer = create_user(&state, "buyer", UserRole::Buyer).await?;
    let store = create_store(&state, &vendor, "Books & Co").await?;
    let book = create_product(&state, &store, "Rust Book", 1000).await?;
    let pen = create_product(&state, &store, "Pen", 500).await?;
    let session = new_session();

    cart_service::add_to_cart(&state, &buyer, &session, book.id, add(2)).await?;
    cart_service::add_to_cart(&state, &buyer, &session, pen.id, add(1)).await?;

    let summary = cart_service::checkout_summary(&state, &buyer, &session)
        .await?
        .data
        .expect("summary");
    assert_eq!(summary.item_count, 3);
    assert_eq!(summary.total_amount, Decimal::from(25));

    let receipt = order_service::checkout(&state, &buyer, &session)
        .await?
        .data
        .expect("receipt");

    assert_eq!(receipt.order.total_amount, Decimal::from(25));
    assert_eq!(receipt.order.status, OrderStatus::Completed.as_str());
    assert_eq!(receipt.items.len(), 2);
    assert!(receipt.confirmation_sent);

    let book_item = receipt
        .items
        .iter()
        .find(|item| item.product_id == book.id)
        .expect("book line");
    assert_eq!(book_item.quantity, 2);
    assert_eq!(book_item.price, Decimal::from(10));

    let stored_items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(receipt.order.id))
        .all(&state.orm)
        .await?;
    let stored_total: i64 = stored_items
        .iter()
        .map(|item| item.price * i64::from(item.quantity))
        .sum();
    assert_eq!(stored_total, 2500);

    assert!(Cart::load(&session).await?.is_empty());

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Order Confirmation - buyer");
    assert!(sent[0].body.contains("TOTAL: $25.00"));
    Ok(())
}

#[tokio::test]
async fn checkout_uses_price_captured_at_add_time() -> anyhow::Result<()> {
    let state = setup_state(Arc::new(RecordingMailer::default())).await?;
    let vendor = create_user(&state, "vendor", UserRole::Vendor).await?;
    let buyer = create_user(&state, "buyer", UserRole::Buyer).await?;
    let store = create_store(&state, &vendor, "Gadgets").await?;
    let gadget = create_product(&state, &store, "Gadget", 1000).await?;
    let session = new_session();

    cart_service::add_to_cart(&state, &buyer, &session, gadget.id, add(1)).await?;

    let mut active: ProductActive = gadget.clone().into();
    active.price = Set(1500);
    active.update(&state.orm).await?;

    // Changing the quantity keeps the captured price.
    cart_service::update_cart_item(
        &state,
        &buyer,
        &session,
        gadget.id,
        UpdateCartRequest { quantity: 2 },
    )
    .await?;

    let receipt = order_service::checkout(&state, &buyer, &session)
        .await?
        .data
        .expect("receipt");
    assert_eq!(receipt.order.total_amount, Decimal::from(20));
    assert_eq!(receipt.items[0].price, Decimal::from(10));
    Ok(())
}

#[tokio::test]
async fn failed_confirmation_mail_does_not_undo_the_order() -> anyhow::Result<()> {
    let state = setup_state(Arc::new(FailingMailer)).await?;
    let vendor = create_user(&state, "vendor", UserRole::Vendor).await?;
    let buyer = create_user(&state, "buyer", UserRole::Buyer).await?;
    let store = create_store(&state, &vendor, "Store").await?;
    let item = create_product(&state, &store, "Thing", 1999).await?;
    let session = new_session();

    cart_service::add_to_cart(&state, &buyer, &session, item.id, add(1)).await?;
    let receipt = order_service::checkout(&state, &buyer, &session)
        .await?
        .data
        .expect("receipt");

    assert!(!receipt.confirmation_sent);
    assert_eq!(
        receipt.order.total_amount,
        Decimal::from_str("19.99").unwrap()
    );
    assert_eq!(Orders::find().count(&state.orm).await?, 1);
    assert!(Cart::load(&session).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn checkout_rejects_cart_with_deleted_product() -> anyhow::Result<()> {
    let state = setup_state(Arc::new(RecordingMailer::default())).await?;
    let vendor = create_user(&state, "vendor", UserRole::Vendor).await?;
    let buyer = create_user(&state, "buyer", UserRole::Buyer).await?;
    let store = create_store(&state, &vendor, "Store").await?;
    let kept = create_product(&state, &store, "Kept", 300).await?;
    let gone = create_product(&state, &store, "Gone", 700).await?;
    let session = new_session();

    cart_service::add_to_cart(&state, &buyer, &session, kept.id, add(1)).await?;
    cart_service::add_to_cart(&state, &buyer, &session, gone.id, add(1)).await?;
    Products::delete_by_id(gone.id).exec(&state.orm).await?;

    // The view skips the missing product but the line is still in the cart.
    let view = cart_service::view_cart(&state, &buyer, &session)
        .await?
        .data
        .expect("cart");
    assert_eq!(view.items.len(), 1);

    let err = order_service::checkout(&state, &buyer, &session)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg.contains(&gone.id.to_string())));
    assert_eq!(Orders::find().count(&state.orm).await?, 0);

    // Removing the stale line unblocks checkout.
    cart_service::remove_from_cart(&state, &buyer, &session, gone.id).await?;
    let receipt = order_service::checkout(&state, &buyer, &session)
        .await?
        .data
        .expect("receipt");
    assert_eq!(receipt.order.total_amount, Decimal::from(3));
    Ok(())
}

#[tokio::test]
async fn only_buyers_can_use_the_cart() -> anyhow::Result<()> {
    let state = setup_state(Arc::new(RecordingMailer::default())).await?;
    let vendor = create_user(&state, "vendor", UserRole::Vendor).await?;
    let store = create_store(&state, &vendor, "Store").await?;
    let item = create_product(&state, &store, "Thing", 100).await?;
    let session = new_session();

    let err = cart_service::add_to_cart(&state, &vendor, &session, item.id, add(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = order_service::checkout(&state, &vendor, &session)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    Ok(())
}

#[tokio::test]
async fn cart_rejects_bad_quantities_and_unknown_products() -> anyhow::Result<()> {
    let state = setup_state(Arc::new(RecordingMailer::default())).await?;
    let vendor = create_user(&state, "vendor", UserRole::Vendor).await?;
    let buyer = create_user(&state, "buyer", UserRole::Buyer).await?;
    let store = create_store(&state, &vendor, "Store").await?;
    let item = create_product(&state, &store, "Thing", 100).await?;
    let session = new_session();

    for quantity in [0, -3] {
        let err = cart_service::add_to_cart(&state, &buyer, &session, item.id, add(quantity))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    let err = cart_service::add_to_cart(&state, &buyer, &session, uuid::Uuid::new_v4(), add(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    cart_service::add_to_cart(&state, &buyer, &session, item.id, add(2)).await?;
    let view = cart_service::update_cart_item(
        &state,
        &buyer,
        &session,
        item.id,
        UpdateCartRequest { quantity: 0 },
    )
    .await?
    .data
    .expect("cart");
    assert!(view.items.is_empty());
    assert_eq!(view.item_count, 0);
    Ok(())
}

#[tokio::test]
async fn confirmation_mail_timeout_does_not_undo_the_order() -> anyhow::Result<()> {
    let state =
        setup_state_with_mail_timeout(Arc::new(SlowMailer), Duration::from_millis(50)).await?;
    let vendor = create_user(&state, "vendor", UserRole::Vendor).await?;
    let buyer = create_user(&state, "buyer", UserRole::Buyer).await?;
    let store = create_store(&state, &vendor, "Store").await?;
    let item = create_product(&state, &store, "Lamp", 2500).await?;
    let session = new_session();

    cart_service::add_to_cart(&state, &buyer, &session, item.id, add(2)).await?;
    let receipt = order_service::checkout(&state, &buyer, &session)
        .await?
        .data
        .expect("receipt");

    assert!(!receipt.confirmation_sent);
    assert_eq!(receipt.order.total_amount, Decimal::from(50));
    let stored = Orders::find_by_id(receipt.order.id)
        .one(&state.orm)
        .await?
        .expect("order persisted");
    assert_eq!(stored.status, OrderStatus::Completed.as_str());
    assert!(Cart::load(&session).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn line_quantity_is_capped_before_the_cart_is_saved() -> anyhow::Result<()> {
    let state = setup_state(Arc::new(RecordingMailer::default())).await?;
    let vendor = create_user(&state, "vendor", UserRole::Vendor).await?;
    let buyer = create_user(&state, "buyer", UserRole::Buyer).await?;
    let store = create_store(&state, &vendor, "Store").await?;
    let item = create_product(&state, &store, "Bolt", 10).await?;
    let session = new_session();
    let cap = i64::from(Cart::MAX_LINE_QUANTITY);

    let err = cart_service::add_to_cart(&state, &buyer, &session, item.id, add(3_000_000_000))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(Cart::load(&session).await?.is_empty());

    // Additive adds may reach the cap but not pass it.
    cart_service::add_to_cart(&state, &buyer, &session, item.id, add(cap - 1)).await?;
    cart_service::add_to_cart(&state, &buyer, &session, item.id, add(1)).await?;
    let err = cart_service::add_to_cart(&state, &buyer, &session, item.id, add(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = cart_service::update_cart_item(
        &state,
        &buyer,
        &session,
        item.id,
        UpdateCartRequest { quantity: cap + 1 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let cart = Cart::load(&session).await?;
    assert_eq!(cart.line(item.id).map(|line| line.quantity), Some(Cart::MAX_LINE_QUANTITY));

    // Whatever the boundary accepted can be checked out.
    let receipt = order_service::checkout(&state, &buyer, &session)
        .await?
        .data
        .expect("receipt");
    assert_eq!(receipt.items[0].quantity, 10_000);
    assert_eq!(receipt.order.total_amount, Decimal::from(1_000));
    Ok(())
}
