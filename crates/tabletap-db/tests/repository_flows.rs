//! Repository integration tests against an in-memory SQLite database.

use chrono::Utc;
use uuid::Uuid;

use tabletap_core::{
    CustomFee, FeeKind, FeeLine, Order, OrderItem, OrderStatus, OrderType, Payout, PayoutOrigin,
    PaymentIntentLink, PaymentStatus, TaxMode,
};
use tabletap_db::{Database, DbConfig, DbError};

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

fn sample_order(status: OrderStatus) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::new_v4().to_string(),
        restaurant_id: "r1".to_string(),
        table_id: Some("t12".to_string()),
        order_type: OrderType::DineIn,
        status,
        payment_status: PaymentStatus::Pending,
        subtotal_cents: 5000,
        fee_lines: vec![FeeLine {
            fee_id: "f1".to_string(),
            name: "Service fee".to_string(),
            kind: FeeKind::Percent,
            value: 1000,
            amount_cents: 500,
        }],
        tax_cents: 798,
        tax_mode: TaxMode::Inclusive,
        tip_cents: 0,
        total_cents: 5500,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

fn sample_item(order_id: &str) -> OrderItem {
    OrderItem {
        id: Uuid::new_v4().to_string(),
        order_id: order_id.to_string(),
        menu_item_id: "m1".to_string(),
        name_snapshot: "Margherita".to_string(),
        variant_snapshot: Some("large".to_string()),
        unit_price_cents: 2500,
        quantity: 2,
        line_total_cents: 5000,
        created_at: Utc::now(),
    }
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_order_roundtrip_with_fee_lines() {
    let db = test_db().await;
    let order = sample_order(OrderStatus::Pending);
    let item = sample_item(&order.id);

    db.orders().insert(&order, &[item.clone()]).await.unwrap();

    let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(loaded.subtotal_cents, 5000);
    assert_eq!(loaded.fee_lines.len(), 1);
    assert_eq!(loaded.fee_lines[0].amount_cents, 500);
    assert_eq!(loaded.tax_mode, TaxMode::Inclusive);

    let items = db.orders().get_items(&order.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name_snapshot, "Margherita");
    assert_eq!(items[0].line_total_cents, 5000);
}

#[tokio::test]
async fn test_get_missing_order_returns_none() {
    let db = test_db().await;
    assert!(db.orders().get_by_id("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_cancel_claim_succeeds_exactly_once() {
    let db = test_db().await;
    let order = sample_order(OrderStatus::Confirmed);
    db.orders().insert(&order, &[]).await.unwrap();

    assert!(db.orders().cancel_if_active(&order.id).await.unwrap());
    // Second claim loses: the order is already cancelled.
    assert!(!db.orders().cancel_if_active(&order.id).await.unwrap());

    let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_claim_rejects_terminal_order() {
    let db = test_db().await;
    let order = sample_order(OrderStatus::Completed);
    db.orders().insert(&order, &[]).await.unwrap();

    assert!(!db.orders().cancel_if_active(&order.id).await.unwrap());

    let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, OrderStatus::Completed);
}

#[tokio::test]
async fn test_update_totals_only_while_pending() {
    let db = test_db().await;
    let order = sample_order(OrderStatus::Pending);
    db.orders().insert(&order, &[]).await.unwrap();

    let totals = tabletap_core::OrderTotals {
        subtotal_cents: 6000,
        fee_lines: vec![],
        fee_total_cents: 0,
        tax_cents: 958,
        tax_mode: TaxMode::Inclusive,
        tip_cents: 0,
        total_cents: 6000,
    };
    db.orders().update_totals(&order.id, &totals).await.unwrap();

    let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(loaded.total_cents, 6000);
    assert!(loaded.fee_lines.is_empty());

    // Once past pending the breakdown is frozen.
    assert!(db
        .orders()
        .update_status(&order.id, OrderStatus::Pending, OrderStatus::Confirmed)
        .await
        .unwrap());
    let err = db.orders().update_totals(&order.id, &totals).await;
    assert!(matches!(err, Err(DbError::NotFound { .. })));
}

#[tokio::test]
async fn test_update_status_is_conditional() {
    let db = test_db().await;
    let order = sample_order(OrderStatus::Pending);
    db.orders().insert(&order, &[]).await.unwrap();

    // Wrong expected-from status loses the swap.
    assert!(!db
        .orders()
        .update_status(&order.id, OrderStatus::Confirmed, OrderStatus::Preparing)
        .await
        .unwrap());
    assert!(db
        .orders()
        .update_status(&order.id, OrderStatus::Pending, OrderStatus::Confirmed)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_append_note_builds_lines() {
    let db = test_db().await;
    let order = sample_order(OrderStatus::Pending);
    db.orders().insert(&order, &[]).await.unwrap();

    db.orders()
        .append_note(&order.id, "Cancelled by guest: changed mind")
        .await
        .unwrap();
    db.orders()
        .append_note(&order.id, "Refund issued: re_123")
        .await
        .unwrap();

    let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
    let notes = loaded.notes.unwrap();
    assert_eq!(
        notes,
        "Cancelled by guest: changed mind\nRefund issued: re_123"
    );
}

// =============================================================================
// Settings and fees
// =============================================================================

#[tokio::test]
async fn test_settings_created_lazily_with_defaults() {
    let db = test_db().await;

    let settings = db.settings().get_or_create("r-new").await.unwrap();
    assert_eq!(settings.tax_rate_bps, 1900);
    assert_eq!(settings.tax_mode, TaxMode::Inclusive);
    assert_eq!(settings.currency, "EUR");
    assert_eq!(settings.platform_fee_bps, 250);
    assert!(settings.connected_account_id.is_none());

    // Second call returns the same row, not a fresh one.
    let again = db.settings().get_or_create("r-new").await.unwrap();
    assert_eq!(again.created_at, settings.created_at);
}

#[tokio::test]
async fn test_settings_upsert_rejects_bad_rate() {
    let db = test_db().await;
    let mut settings = db.settings().get_or_create("r1").await.unwrap();
    settings.tax_rate_bps = 10001;

    let err = db.settings().upsert(&settings).await;
    assert!(matches!(err, Err(DbError::Rejected(_))));
}

fn sample_fee(name: &str, sort_order: i64) -> CustomFee {
    CustomFee {
        id: Uuid::new_v4().to_string(),
        restaurant_id: "r1".to_string(),
        name: name.to_string(),
        kind: FeeKind::Fixed,
        value: 200,
        enabled: true,
        sort_order,
        min_order_cents: None,
        max_order_cents: None,
        apply_dine_in: true,
        apply_takeaway: true,
        apply_delivery: true,
    }
}

#[tokio::test]
async fn test_fees_listed_in_evaluation_order() {
    let db = test_db().await;
    db.settings()
        .upsert_fee(&sample_fee("Second", 10))
        .await
        .unwrap();
    db.settings()
        .upsert_fee(&sample_fee("First", 5))
        .await
        .unwrap();

    let fees = db.settings().list_fees("r1").await.unwrap();
    assert_eq!(fees.len(), 2);
    assert_eq!(fees[0].name, "First");
    assert_eq!(fees[1].name, "Second");
}

#[tokio::test]
async fn test_fee_upsert_rejects_inverted_thresholds() {
    let db = test_db().await;
    let mut fee = sample_fee("Bad window", 0);
    fee.min_order_cents = Some(5000);
    fee.max_order_cents = Some(2000);

    let err = db.settings().upsert_fee(&fee).await;
    assert!(matches!(err, Err(DbError::Rejected(_))));
}

// =============================================================================
// Payment links
// =============================================================================

fn sample_link(order_id: &str) -> PaymentIntentLink {
    PaymentIntentLink {
        id: Uuid::new_v4().to_string(),
        order_id: order_id.to_string(),
        provider: "stripe".to_string(),
        charge_ref: "ch_123".to_string(),
        connected_account_id: None,
        amount_cents: 5500,
        platform_fee_cents: 138,
        refunded: false,
        created_at: Utc::now(),
        finalized_at: None,
    }
}

#[tokio::test]
async fn test_one_payment_link_per_order() {
    let db = test_db().await;
    let order = sample_order(OrderStatus::Confirmed);
    db.orders().insert(&order, &[]).await.unwrap();

    db.payment_links()
        .create(&sample_link(&order.id))
        .await
        .unwrap();

    let err = db.payment_links().create(&sample_link(&order.id)).await;
    assert!(matches!(err, Err(DbError::UniqueViolation { .. })));
}

#[tokio::test]
async fn test_payment_link_refund_marker() {
    let db = test_db().await;
    let order = sample_order(OrderStatus::Confirmed);
    db.orders().insert(&order, &[]).await.unwrap();

    let link = sample_link(&order.id);
    db.payment_links().create(&link).await.unwrap();
    db.payment_links().mark_refunded(&link.id).await.unwrap();

    let loaded = db
        .payment_links()
        .get_by_order(&order.id)
        .await
        .unwrap()
        .unwrap();
    assert!(loaded.refunded);
}

// =============================================================================
// Balances and payouts
// =============================================================================

#[tokio::test]
async fn test_balance_accrue_settle_deduct() {
    let db = test_db().await;
    db.balances().get_or_create("r1", "EUR").await.unwrap();

    db.balances().accrue_pending("r1", 5362).await.unwrap();
    let balance = db.balances().get("r1").await.unwrap().unwrap();
    assert_eq!(balance.pending_cents, 5362);
    assert_eq!(balance.available_cents, 0);

    let moved = db.balances().settle("r1", Utc::now(), None).await.unwrap();
    assert_eq!(moved, 5362);
    let balance = db.balances().get("r1").await.unwrap().unwrap();
    assert_eq!(balance.pending_cents, 0);
    assert_eq!(balance.available_cents, 5362);

    assert!(db.balances().deduct_available("r1", 5000).await.unwrap());
    let balance = db.balances().get("r1").await.unwrap().unwrap();
    assert_eq!(balance.available_cents, 362);
}

#[tokio::test]
async fn test_over_deduction_rejected_not_clamped() {
    let db = test_db().await;
    db.balances().get_or_create("r1", "EUR").await.unwrap();
    db.balances().accrue_pending("r1", 1000).await.unwrap();
    db.balances().settle("r1", Utc::now(), None).await.unwrap();

    assert!(!db.balances().deduct_available("r1", 1001).await.unwrap());
    // Balance untouched by the losing attempt.
    let balance = db.balances().get("r1").await.unwrap().unwrap();
    assert_eq!(balance.available_cents, 1000);
}

#[tokio::test]
async fn test_reverse_accrual_deducts_pending_first() {
    let db = test_db().await;
    db.balances().get_or_create("r1", "EUR").await.unwrap();

    // 300 already settled, 200 still pending.
    db.balances().accrue_pending("r1", 300).await.unwrap();
    db.balances().settle("r1", Utc::now(), None).await.unwrap();
    db.balances().accrue_pending("r1", 200).await.unwrap();

    db.balances().reverse_accrual("r1", 400).await.unwrap();

    let balance = db.balances().get("r1").await.unwrap().unwrap();
    assert_eq!(balance.pending_cents, 0);
    assert_eq!(balance.available_cents, 100);
}

#[tokio::test]
async fn test_reverse_accrual_can_drive_available_negative() {
    let db = test_db().await;
    db.balances().get_or_create("r1", "EUR").await.unwrap();
    db.balances().accrue_pending("r1", 100).await.unwrap();

    // Refund larger than everything on the ledger: debt carries forward.
    db.balances().reverse_accrual("r1", 500).await.unwrap();

    let balance = db.balances().get("r1").await.unwrap().unwrap();
    assert_eq!(balance.pending_cents, 0);
    assert_eq!(balance.available_cents, -400);
}

#[tokio::test]
async fn test_payout_history() {
    let db = test_db().await;
    db.balances().get_or_create("r1", "EUR").await.unwrap();

    let payout = Payout {
        id: Uuid::new_v4().to_string(),
        restaurant_id: "r1".to_string(),
        amount_cents: 5000,
        currency: "EUR".to_string(),
        requested_by: PayoutOrigin::Manual,
        created_at: Utc::now(),
    };
    db.balances().record_payout(&payout).await.unwrap();

    let history = db.balances().list_payouts("r1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount_cents, 5000);
    assert_eq!(history[0].requested_by, PayoutOrigin::Manual);
}
