mod common;

use std::sync::Arc;

use axum_marketplace::{
    dto::{cart::AddToCartRequest, reviews::CreateReviewRequest},
    entity::orders::{ActiveModel as OrderActive, Entity as Orders},
    error::AppError,
    models::{OrderStatus, UserRole},
    routes::params::ReviewQuery,
    services::{cart_service, order_service, review_service},
};
use common::{RecordingMailer, create_product, create_store, create_user, new_session, setup_state};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

fn review(product_id: Uuid, rating: i32) -> CreateReviewRequest {
    CreateReviewRequest {
        product_id,
        rating,
        comment: "Would buy again".into(),
    }
}

#[tokio::test]
async fn review_is_verified_only_after_completed_purchase() -> anyhow::Result<()> {
    let state = setup_state(Arc::new(RecordingMailer::default())).await?;
    let vendor = create_user(&state, "vendor", UserRole::Vendor).await?;
    let buyer = create_user(&state, "buyer", UserRole::Buyer).await?;
    let stranger = create_user(&state, "stranger", UserRole::Buyer).await?;
    let store = create_store(&state, &vendor, "Store").await?;
    let product = create_product(&state, &store, "Lamp", 2000).await?;
    let session = new_session();

    cart_service::add_to_cart(
        &state,
        &buyer,
        &session,
        product.id,
        AddToCartRequest { quantity: 1, update: false },
    )
    .await?;
    let receipt = order_service::checkout(&state, &buyer, &session)
        .await?
        .data
        .expect("receipt");

    let verified = review_service::create_review(&state, &buyer, review(product.id, 5))
        .await?
        .data
        .expect("review");
    assert!(verified.is_verified_purchase);
    assert_eq!(verified.username, "buyer");

    let unverified = review_service::create_review(&state, &stranger, review(product.id, 2))
        .await?
        .data
        .expect("review");
    assert!(!unverified.is_verified_purchase);

    // Cancelling the order later leaves the stored flag alone.
    order_service::cancel_order(&state, &buyer, receipt.order.id).await?;
    let reloaded = review_service::get_review(&state, verified.id)
        .await?
        .data
        .expect("review");
    assert!(reloaded.is_verified_purchase);

    let err = order_service::cancel_order(&state, &buyer, receipt.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // A cancelled order no longer verifies new reviews.
    let after_cancel = review_service::create_review(&state, &buyer, review(product.id, 4))
        .await?
        .data
        .expect("review");
    assert!(!after_cancel.is_verified_purchase);

    let listed = review_service::list_reviews(
        &state,
        ReviewQuery {
            product_id: Some(product.id),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(listed.data.expect("reviews").items.len(), 3);
    assert_eq!(listed.meta.and_then(|m| m.total), Some(3));
    Ok(())
}

#[tokio::test]
async fn pending_order_does_not_verify_review() -> anyhow::Result<()> {
    let state = setup_state(Arc::new(RecordingMailer::default())).await?;
    let vendor = create_user(&state, "vendor", UserRole::Vendor).await?;
    let buyer = create_user(&state, "buyer", UserRole::Buyer).await?;
    let store = create_store(&state, &vendor, "Store").await?;
    let product = create_product(&state, &store, "Chair", 4500).await?;
    let session = new_session();

    cart_service::add_to_cart(
        &state,
        &buyer,
        &session,
        product.id,
        AddToCartRequest { quantity: 1, update: false },
    )
    .await?;
    let receipt = order_service::checkout(&state, &buyer, &session)
        .await?
        .data
        .expect("receipt");

    let order = Orders::find_by_id(receipt.order.id)
        .one(&state.orm)
        .await?
        .expect("order");
    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Pending.as_str().to_string());
    active.update(&state.orm).await?;

    let created = review_service::create_review(&state, &buyer, review(product.id, 3))
        .await?
        .data
        .expect("review");
    assert!(!created.is_verified_purchase);
    Ok(())
}

#[tokio::test]
async fn review_input_is_validated() -> anyhow::Result<()> {
    let state = setup_state(Arc::new(RecordingMailer::default())).await?;
    let vendor = create_user(&state, "vendor", UserRole::Vendor).await?;
    let buyer = create_user(&state, "buyer", UserRole::Buyer).await?;
    let store = create_store(&state, &vendor, "Store").await?;
    let product = create_product(&state, &store, "Desk", 9900).await?;

    for rating in [0, 6] {
        let err = review_service::create_review(&state, &buyer, review(product.id, rating))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    let err = review_service::create_review(&state, &buyer, review(Uuid::new_v4(), 4))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "product not found"));
    Ok(())
}
