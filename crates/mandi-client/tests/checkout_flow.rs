//! Checkout, orders, profile and admin services against the in-memory backend.

mod common;

use std::io::Write;

use common::{harness, processing_order, product, signed_in, signed_in_admin};
use mandi_client::{ClientError, Destination, ProfileUpdate};
use mandi_core::{
    CheckoutDetails, CoreError, Money, OrderStatus, PaymentDetails, PaymentMethod,
    ValidationError,
};

fn details() -> CheckoutDetails {
    CheckoutDetails {
        full_name: "Asha Patil".to_string(),
        email: "asha@example.com".to_string(),
        phone: "9876543210".to_string(),
        address: "12 Market Road".to_string(),
        city: "Pune".to_string(),
        state: "Maharashtra".to_string(),
        zip_code: "411001".to_string(),
        payment_method: PaymentMethod::Upi,
    }
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_submits_total_with_delivery_fee() {
    let h = signed_in().await;
    h.app.cart.add(&product(1, "Tomatoes", 40), 2).await.unwrap();

    let outcome = h.app.checkout.place_order(&details()).await.unwrap();

    assert_eq!(outcome.draft.subtotal, 80);
    assert_eq!(outcome.draft.delivery_fee, 50);
    assert_eq!(outcome.draft.total_order_price, 130);
    assert_eq!(outcome.order.total(), Money::from_rupees(130));
    assert_eq!(outcome.destination, Destination::Orders);

    let submitted = h.backend.with(|s| s.placed.clone());
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].total_order_price, 130);
    assert_eq!(submitted[0].products[0].product_name.as_deref(), Some("Tomatoes"));
    assert_eq!(submitted[0].products[0].price, 40);
    assert_eq!(submitted[0].payment_details.method_label(), "upi");
    assert_eq!(h.navigator.last(), Some(Destination::Orders));
}

#[tokio::test]
async fn test_checkout_clears_cart_locally_and_remotely() {
    let h = signed_in().await;
    h.app.cart.add(&product(1, "Tomatoes", 40), 2).await.unwrap();

    h.app.checkout.place_order(&details()).await.unwrap();

    assert!(h.app.cart.items().is_empty());
    assert!(h.app.cart.fetch().await.unwrap().is_empty());
    assert_eq!(h.backend.server_cart(), Some(Vec::new()));
}

#[tokio::test]
async fn test_checkout_pushes_cart_before_order() {
    let h = signed_in().await;
    h.app.cart.add(&product(1, "Tomatoes", 40), 2).await.unwrap();

    h.app.checkout.place_order(&details()).await.unwrap();

    let calls = h.backend.calls();
    let order_at = calls.iter().position(|c| *c == "place_order").unwrap();
    assert_eq!(calls[order_at - 1], "replace_cart");
    assert_eq!(calls[order_at + 1], "clear_cart");
}

#[tokio::test]
async fn test_pushed_lines_match_submitted_draft() {
    let h = signed_in().await;
    h.app.cart.add(&product(1, "Tomatoes", 40), 2).await.unwrap();
    h.app.cart.add(&product(2, "Red Onions", 35), 3).await.unwrap();

    let outcome = h.app.checkout.place_order(&details()).await.unwrap();

    let pushed = h.backend.with(|s| s.cart_pushes.last().cloned()).unwrap();
    let pushed: Vec<(i64, i64)> = pushed.iter().map(|l| (l.product_id, l.quantity)).collect();
    let drafted: Vec<(i64, i64)> = outcome
        .draft
        .products
        .iter()
        .map(|l| (l.product_id, l.quantity))
        .collect();
    assert_eq!(pushed, drafted);
    assert_eq!(drafted, vec![(1, 2), (2, 3)]);
}

#[tokio::test]
async fn test_checkout_free_delivery_above_threshold() {
    let h = signed_in().await;
    h.app
        .cart
        .add(&product(3, "Alphonso Mangoes", 600), 1)
        .await
        .unwrap();

    let outcome = h.app.checkout.place_order(&details()).await.unwrap();

    assert_eq!(outcome.draft.delivery_fee, 0);
    assert_eq!(outcome.draft.total_order_price, 600);
}

#[tokio::test]
async fn test_empty_cart_checkout_makes_no_request() {
    let h = signed_in().await;
    let calls_before = h.backend.calls().len();

    let err = h.app.checkout.place_order(&details()).await.unwrap_err();

    assert!(matches!(err, ClientError::Core(CoreError::EmptyCart)));
    assert_eq!(h.backend.calls().len(), calls_before);
}

#[tokio::test]
async fn test_missing_address_field_is_rejected() {
    let h = signed_in().await;
    h.app.cart.add(&product(1, "Tomatoes", 40), 2).await.unwrap();
    let mut incomplete = details();
    incomplete.city = " ".to_string();

    let err = h.app.checkout.place_order(&incomplete).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Core(CoreError::Validation(ValidationError::Required { .. }))
    ));
    assert_eq!(h.backend.call_count("place_order"), 0);
}

#[tokio::test]
async fn test_failed_submit_keeps_cart() {
    let h = signed_in().await;
    h.app.cart.add(&product(1, "Tomatoes", 40), 2).await.unwrap();
    h.backend.fail("place_order", 500);

    assert!(h.app.checkout.place_order(&details()).await.is_err());

    assert_eq!(h.app.cart.items().len(), 1);
    assert_eq!(h.app.cart.items()[0].quantity, 2);
    assert_eq!(h.backend.call_count("clear_cart"), 0);
    assert!(!h.navigator.was_sent_to(Destination::Orders));
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_placed_order_shows_as_current() {
    let h = signed_in().await;
    h.app.cart.add(&product(1, "Tomatoes", 40), 2).await.unwrap();
    h.app.checkout.place_order(&details()).await.unwrap();

    let book = h.app.orders.my_orders().await.unwrap();

    assert_eq!(book.current.len(), 1);
    assert!(book.history.is_empty());
    assert_eq!(book.current[0].status, OrderStatus::Processing);
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_profile_update_sends_only_changes() {
    let h = signed_in().await;
    let changes = ProfileUpdate {
        name: Some("Asha Patil".to_string()),
        location: Some("Nashik".to_string()),
        ..Default::default()
    };

    let user = h.app.profile.update(&changes).await.unwrap();

    assert_eq!(user.location.as_deref(), Some("Nashik"));
    let sent = h.backend.with(|s| s.profile_updates.clone());
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].name, None);
    assert_eq!(
        h.app.session.current_user().await.unwrap().location.as_deref(),
        Some("Nashik")
    );
}

#[tokio::test]
async fn test_profile_update_without_changes_makes_no_request() {
    let h = signed_in().await;

    h.app.profile.update(&ProfileUpdate::default()).await.unwrap();

    assert_eq!(h.backend.call_count("update_profile"), 0);
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_authorises_processing_order() {
    let h = signed_in_admin().await;
    h.backend.with(|s| s.orders.push(processing_order(11)));

    let receipt = h
        .app
        .admin
        .authorise_delivery(&processing_order(11), PaymentDetails::from_note("cash"))
        .await
        .unwrap();

    assert!(receipt.success);
    let book = h.app.admin.all_orders().await.unwrap();
    assert!(book.pending.is_empty());
    assert_eq!(book.delivered[0].id, 11);
    assert_eq!(book.delivered[0].payment_method_label(), "cash");
}

#[tokio::test]
async fn test_delivered_order_cannot_move_again() {
    let h = signed_in_admin().await;
    let mut order = processing_order(12);
    order.status = OrderStatus::Delivered;

    let err = h
        .app
        .admin
        .authorise_delivery(&order, PaymentDetails::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Core(CoreError::InvalidStatusTransition { order_id: 12, .. })
    ));
    assert_eq!(h.backend.call_count("authorise_delivery"), 0);
}

#[tokio::test]
async fn test_customer_cannot_authorise_delivery() {
    let h = signed_in().await;

    let err = h
        .app
        .admin
        .authorise_delivery(&processing_order(11), PaymentDetails::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Forbidden(_)));
    assert_eq!(h.navigator.last(), Some(Destination::Login));
    assert_eq!(h.backend.call_count("authorise_delivery"), 0);
}

#[tokio::test]
async fn test_ingest_uploads_spreadsheet() {
    let h = signed_in_admin().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kharif-prices.xlsx");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(b"PK\x03\x04 sheet bytes")
        .unwrap();

    let report = h.app.admin.ingest_products(&path).await.unwrap();

    assert_eq!(report.products_added, 3);
    assert_eq!(report.total_processed, 4);
    assert_eq!(
        h.backend.with(|s| s.uploads.clone()),
        vec!["kharif-prices.xlsx".to_string()]
    );
}

#[tokio::test]
async fn test_ingest_rejects_other_file_types() {
    let h = signed_in_admin().await;

    let err = h.app.admin.ingest_products("products.csv").await.unwrap_err();

    assert!(matches!(err, ClientError::Core(CoreError::Validation(_))));
    assert_eq!(h.backend.call_count("ingest_products"), 0);
}

#[tokio::test]
async fn test_admin_calls_need_a_session() {
    let h = harness();

    let err = h.app.admin.all_orders().await.unwrap_err();

    assert!(matches!(err, ClientError::NotAuthenticated));
    assert_eq!(h.navigator.last(), Some(Destination::Login));
}
