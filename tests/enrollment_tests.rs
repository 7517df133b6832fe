mod common;

use camp_portal::{
    enrollment::{self, EnrollmentError},
    models::{CheckoutRequest, class_status},
    repository::{Repository, RepositoryState},
};
use common::MemRepo;
use std::sync::Arc;
use uuid::Uuid;

const BUYER: &str = "buyer@example.com";

fn checkout(cart_item_ids: Vec<Uuid>, class_item_ids: Vec<Uuid>, price: f64) -> CheckoutRequest {
    CheckoutRequest {
        email: BUYER.to_string(),
        transaction_id: "txn_test_001".to_string(),
        cart_item_ids,
        class_item_ids,
        price,
    }
}

#[tokio::test]
async fn test_full_apply_reports_all_counts() {
    let repo = MemRepo::new();
    let class = repo.seed_class("Archery", 120.0, 10, class_status::APPROVED);
    let item = repo.seed_cart_item(BUYER, class.id);
    let repo: RepositoryState = Arc::new(repo);

    let outcome = enrollment::finalize(&repo, &checkout(vec![item.id], vec![class.id], 120.0))
        .await
        .unwrap();

    assert_eq!(outcome.carts_removed, 1);
    assert_eq!(outcome.classes_updated, 1);
    assert_eq!(outcome.payment.email, BUYER);

    let updated = repo.get_class(class.id).await.unwrap();
    assert_eq!(updated.enrolled_seats, 1);
    assert_eq!(updated.available_seats, 9);
    // The purchased selection is gone from the cart.
    assert!(repo.carts_by_email(BUYER).await.is_empty());
}

#[tokio::test]
async fn test_duplicate_class_reference_adjusts_once() {
    let repo = MemRepo::new();
    let class = repo.seed_class("Kayaking", 80.0, 5, class_status::APPROVED);
    let item = repo.seed_cart_item(BUYER, class.id);
    let repo: RepositoryState = Arc::new(repo);

    // The same class referenced twice must move the counters exactly once.
    let outcome = enrollment::finalize(
        &repo,
        &checkout(vec![item.id], vec![class.id, class.id], 80.0),
    )
    .await
    .unwrap();

    assert_eq!(outcome.classes_updated, 1);
    let updated = repo.get_class(class.id).await.unwrap();
    assert_eq!(updated.enrolled_seats, 1);
    assert_eq!(updated.available_seats, 4);
}

#[tokio::test]
async fn test_multiple_classes_all_adjusted() {
    let repo = MemRepo::new();
    let c1 = repo.seed_class("Climbing", 150.0, 8, class_status::APPROVED);
    let c2 = repo.seed_class("Pottery", 60.0, 12, class_status::APPROVED);
    let i1 = repo.seed_cart_item(BUYER, c1.id);
    let i2 = repo.seed_cart_item(BUYER, c2.id);
    let repo: RepositoryState = Arc::new(repo);

    let outcome = enrollment::finalize(
        &repo,
        &checkout(vec![i1.id, i2.id], vec![c1.id, c2.id], 210.0),
    )
    .await
    .unwrap();

    assert_eq!(outcome.carts_removed, 2);
    assert_eq!(outcome.classes_updated, 2);
    // Regression against the single-batched-update hazard: *both* classes moved.
    assert_eq!(repo.get_class(c1.id).await.unwrap().enrolled_seats, 1);
    assert_eq!(repo.get_class(c2.id).await.unwrap().enrolled_seats, 1);
}

#[tokio::test]
async fn test_insert_failure_aborts_before_side_effects() {
    let mut repo = MemRepo::new();
    repo.fail_payment_insert = true;
    let class = repo.seed_class("Sailing", 200.0, 3, class_status::APPROVED);
    let item = repo.seed_cart_item(BUYER, class.id);
    let mem = Arc::new(repo);
    let repo: RepositoryState = mem.clone();

    let err = enrollment::finalize(&repo, &checkout(vec![item.id], vec![class.id], 200.0))
        .await
        .unwrap_err();

    assert_eq!(err, EnrollmentError::PaymentNotRecorded);
    // Step 1 failed, so steps 2-3 never ran: cart intact, seats untouched.
    assert_eq!(repo.carts_by_email(BUYER).await.len(), 1);
    let class = repo.get_class(class.id).await.unwrap();
    assert_eq!(class.enrolled_seats, 0);
    assert_eq!(class.available_seats, 3);
    assert!(mem.payments.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_shortfall_surfaces_partial_apply() {
    let repo = MemRepo::new();
    let class = repo.seed_class("Fencing", 90.0, 4, class_status::APPROVED);
    let item = repo.seed_cart_item(BUYER, class.id);
    let mem = Arc::new(repo);
    let repo: RepositoryState = mem.clone();

    // One of the referenced cart items does not exist in the store.
    let missing_cart_id = Uuid::new_v4();
    let err = enrollment::finalize(
        &repo,
        &checkout(vec![item.id, missing_cart_id], vec![class.id], 90.0),
    )
    .await
    .unwrap_err();

    match err {
        EnrollmentError::PartialApply {
            carts_expected,
            carts_removed,
            classes_expected,
            classes_updated,
            ..
        } => {
            assert_eq!(carts_expected, 2);
            assert_eq!(carts_removed, 1);
            assert_eq!(classes_expected, 1);
            assert_eq!(classes_updated, 1);
        }
        other => panic!("expected PartialApply, got {:?}", other),
    }
    // The payment itself was recorded; the error reports, not rolls back.
    assert_eq!(mem.payments.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_full_class_surfaces_partial_apply_and_never_oversells() {
    let repo = MemRepo::new();
    let class = repo.seed_class("Robotics", 300.0, 1, class_status::APPROVED);
    let first = repo.seed_cart_item("first@example.com", class.id);
    let second = repo.seed_cart_item(BUYER, class.id);
    let repo: RepositoryState = Arc::new(repo);

    // First buyer takes the last seat.
    let mut req = checkout(vec![first.id], vec![class.id], 300.0);
    req.email = "first@example.com".to_string();
    enrollment::finalize(&repo, &req).await.unwrap();

    // Second buyer races in after the seats ran out. The conditional
    // decrement refuses, and the shortfall is reported instead of silently
    // overselling the class.
    let err = enrollment::finalize(&repo, &checkout(vec![second.id], vec![class.id], 300.0))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EnrollmentError::PartialApply {
            classes_updated: 0,
            classes_expected: 1,
            ..
        }
    ));
    let class = repo.get_class(class.id).await.unwrap();
    assert_eq!(class.available_seats, 0);
    assert_eq!(class.enrolled_seats, 1);
}

#[tokio::test]
async fn test_unknown_class_reference_rejected_before_insert() {
    let repo = MemRepo::new();
    let class = repo.seed_class("Orienteering", 70.0, 6, class_status::APPROVED);
    let item = repo.seed_cart_item(BUYER, class.id);
    let mem = Arc::new(repo);
    let repo: RepositoryState = mem.clone();

    // One referenced class id resolves, the other never existed. An absent
    // class can never satisfy a retry, so the checkout is refused before the
    // payment is recorded.
    let err = enrollment::finalize(
        &repo,
        &checkout(vec![item.id], vec![class.id, Uuid::new_v4()], 70.0),
    )
    .await
    .unwrap_err();

    assert_eq!(err, EnrollmentError::UnknownClassReference);
    assert!(mem.payments.lock().unwrap().is_empty());
    assert_eq!(repo.carts_by_email(BUYER).await.len(), 1);
    let class = repo.get_class(class.id).await.unwrap();
    assert_eq!(class.enrolled_seats, 0);
    assert_eq!(class.available_seats, 6);
}

#[tokio::test]
async fn test_empty_reference_lists_rejected_before_insert() {
    let mem = Arc::new(MemRepo::new());
    let repo: RepositoryState = mem.clone();

    let err = enrollment::finalize(&repo, &checkout(vec![], vec![], 0.0))
        .await
        .unwrap_err();

    assert_eq!(err, EnrollmentError::EmptyReferences);
    assert!(mem.payments.lock().unwrap().is_empty());
}
