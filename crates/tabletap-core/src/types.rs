//! # Domain Types
//!
//! Core domain types for the TableTap financial engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │   CustomFee     │   │ RestaurantSettings      │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  kind (% / €)   │   │  tax_rate_bps   │       │
//! │  │  status         │   │  thresholds     │   │  tax_mode       │       │
//! │  │  payment_status │   │  type flags     │   │  platform fee   │       │
//! │  │  totals (cents) │   │  sort_order     │   │  settlement     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │ PaymentIntentLink   │  VendorBalance  │                             │
//! │  │  charge_ref     │   │  available      │                             │
//! │  │  account id     │   │  pending        │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Machines
//! `OrderStatus` and `PaymentStatus` each have a single transition function.
//! Every status change in the system goes through `can_transition_to`; no
//! handler compares status strings on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::{Money, Rate};

// =============================================================================
// Order Type
// =============================================================================

/// How the guest receives the order.
///
/// Wire format matches the checkout payload (`DINE_IN`, `TAKEAWAY`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
    /// Pre-ordered for collection at a time slot. Fee applicability treats
    /// pickup as takeaway (fees configure three flags only).
    Pickup,
}

// =============================================================================
// Order Status
// =============================================================================

/// The operational status of an order.
///
/// ## Transitions
/// ```text
/// Pending ──► Confirmed ──► Preparing ──► Ready ──► Delivered / Completed
///    │            │             │           │
///    └────────────┴─────────────┴───────────┴──► Cancelled
/// ```
/// Cancelled is reachable from every non-terminal state. Delivered,
/// Completed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Whether this status allows no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Completed | OrderStatus::Cancelled
        )
    }

    /// The single transition rule for order statuses.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            // Forward progress
            (Pending, Confirmed) => true,
            (Confirmed, Preparing) => true,
            (Preparing, Ready) => true,
            (Ready, Delivered) | (Ready, Completed) => true,
            // Cancellation from any non-terminal state
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Validates and returns the next status, rejecting illegal transitions.
    pub fn transition_to(&self, next: OrderStatus) -> Result<OrderStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::IllegalStatusTransition {
                from: format!("{self:?}"),
                to: format!("{next:?}"),
            })
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// The financial status of an order, independent of its operational status.
///
/// ## Transitions
/// ```text
/// Pending ──► Paid ──► Refunded
///    └──────► Cancelled          (unpaid cancellation)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Cancelled,
}

impl PaymentStatus {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Refunded | PaymentStatus::Cancelled)
    }

    /// The single transition rule for payment statuses.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Pending, Cancelled) | (Paid, Refunded)
        )
    }

    pub fn transition_to(&self, next: PaymentStatus) -> Result<PaymentStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::IllegalPaymentTransition {
                from: format!("{self:?}"),
                to: format!("{next:?}"),
            })
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Custom Fees
// =============================================================================

/// How a custom fee is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeKind {
    /// `value` is a rate in basis points (1000 = 10% of the subtotal).
    Percent,
    /// `value` is a fixed amount in cents.
    Fixed,
}

/// An owner-configured fee rule, part of a restaurant's settings.
///
/// Read-only from the engine's perspective; mutated via the dashboard and
/// validated at the settings-write boundary (`validation::validate_custom_fee`),
/// never in the hot computation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomFee {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Restaurant this fee belongs to.
    pub restaurant_id: String,

    /// Display name shown on the breakdown ("Service fee").
    /// Duplicate names are legal and stay independent lines.
    pub name: String,

    /// Percent or fixed.
    pub kind: FeeKind,

    /// Basis points for Percent, cents for Fixed.
    pub value: i64,

    /// Disabled fees contribute nothing regardless of other filters.
    pub enabled: bool,

    /// Evaluation and display order, ascending.
    pub sort_order: i64,

    /// Inclusive lower subtotal bound in cents; None = unbounded below.
    pub min_order_cents: Option<i64>,

    /// Inclusive upper subtotal bound in cents; None = unbounded above.
    pub max_order_cents: Option<i64>,

    /// Per-order-type applicability. A fee with all three off never applies.
    pub apply_dine_in: bool,
    pub apply_takeaway: bool,
    pub apply_delivery: bool,
}

impl CustomFee {
    /// Whether this fee applies to the given order type.
    ///
    /// Pickup orders use the takeaway flag.
    pub fn applies_to(&self, order_type: OrderType) -> bool {
        match order_type {
            OrderType::DineIn => self.apply_dine_in,
            OrderType::Takeaway | OrderType::Pickup => self.apply_takeaway,
            OrderType::Delivery => self.apply_delivery,
        }
    }

    /// Whether the subtotal falls inside the fee's [min, max] window.
    /// Both bounds are inclusive; a missing bound is unbounded on that side.
    pub fn within_thresholds(&self, subtotal: Money) -> bool {
        if let Some(min) = self.min_order_cents {
            if subtotal.cents() < min {
                return false;
            }
        }
        if let Some(max) = self.max_order_cents {
            if subtotal.cents() > max {
                return false;
            }
        }
        true
    }
}

/// One computed fee on an order's breakdown.
///
/// Snapshot pattern: fee name and value are frozen at computation time so the
/// breakdown stays stable if the owner later edits the rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeLine {
    /// The rule that produced this line.
    pub fee_id: String,
    pub name: String,
    pub kind: FeeKind,
    /// Configured value (bps or cents) at computation time.
    pub value: i64,
    /// Computed amount in cents. Zero-amount lines are kept; callers decide
    /// whether to display them.
    pub amount_cents: i64,
}

impl FeeLine {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Restaurant Settings
// =============================================================================

/// Tax calculation mode for a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// Menu prices already contain tax (EU model); tax is extracted for
    /// display and never added to the total.
    Inclusive,
    /// Tax is added on top of the subtotal (US model).
    Exclusive,
}

impl Default for TaxMode {
    fn default() -> Self {
        TaxMode::Inclusive
    }
}

/// When vendor funds move from pending to available automatically.
/// Manual payout requests are honored regardless of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SettlementSchedule {
    Daily,
    Weekly,
    Monthly,
    /// Never auto-settles; the owner requests payouts explicitly.
    Manual,
}

impl Default for SettlementSchedule {
    fn default() -> Self {
        SettlementSchedule::Weekly
    }
}

/// Per-restaurant configuration the engine reads.
///
/// Owned exclusively by one restaurant; created lazily with defaults on
/// first access if absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RestaurantSettings {
    pub restaurant_id: String,

    /// Tax rate in basis points (1900 = 19%).
    pub tax_rate_bps: u32,

    pub tax_mode: TaxMode,

    /// ISO 4217 settlement currency ("EUR"). Balances and payouts are always
    /// expressed in this currency; no cross-currency netting.
    pub currency: String,

    /// Accepted payment methods at checkout.
    pub accepts_cash: bool,
    pub accepts_online: bool,

    /// Platform revenue share in basis points (250 = 2.5%).
    pub platform_fee_bps: u32,

    pub settlement_schedule: SettlementSchedule,

    /// Provider-side connected account for Direct Charge topology, if the
    /// restaurant has completed payout onboarding.
    pub connected_account_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl RestaurantSettings {
    #[inline]
    pub fn tax_rate(&self) -> Rate {
        Rate::from_bps(self.tax_rate_bps)
    }

    #[inline]
    pub fn platform_fee(&self) -> Rate {
        Rate::from_bps(self.platform_fee_bps)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A line item on an order.
/// Snapshot pattern: menu item data is frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    /// Name at time of order (frozen).
    pub name_snapshot: String,
    /// Selected variant/extras description at time of order, if any.
    pub variant_snapshot: Option<String>,
    /// Unit price in cents at time of order (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// One guest transaction.
///
/// ## Invariant
/// `total == subtotal + Σ fee_lines + (exclusive ? tax : 0) + tip`, always
/// recomposed through `totals::compose_total`, never patched in place.
/// Terminal orders are immutable except for the cancellation/refund
/// transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub restaurant_id: String,
    /// Originating table for dine-in QR orders; None for takeaway/delivery.
    pub table_id: Option<String>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,

    pub subtotal_cents: i64,
    /// Computed fee breakdown, frozen at composition time.
    pub fee_lines: Vec<FeeLine>,
    pub tax_cents: i64,
    pub tax_mode: TaxMode,
    pub tip_cents: i64,
    pub total_cents: i64,

    /// Free-form notes; cancellation reasons are appended here.
    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Whether an unauthenticated guest may cancel this order.
    /// Only abandoned/failed checkouts qualify: nothing paid, nothing confirmed.
    pub fn guest_cancellable(&self) -> bool {
        self.payment_status == PaymentStatus::Pending && self.status == OrderStatus::Pending
    }
}

// =============================================================================
// Payment Intent Link
// =============================================================================

/// The association between an order and a provider-side charge.
///
/// Created when a payment is initiated; immutable once the charge succeeds,
/// except for the terminal `refunded` marker. The reconciler reads this as
/// the source of truth when cancelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentIntentLink {
    pub id: String,
    pub order_id: String,
    /// Provider name ("stripe").
    pub provider: String,
    /// Provider-side charge / payment-intent id.
    pub charge_ref: String,
    /// Present only for Direct Charge topology (charge created on the
    /// restaurant's connected account). None means platform topology.
    pub connected_account_id: Option<String>,
    /// Captured amount in cents.
    pub amount_cents: i64,
    /// Platform fee locked in at capture time.
    pub platform_fee_cents: i64,
    /// Terminal marker set by the reconciler.
    pub refunded: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub finalized_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Vendor Balance
// =============================================================================

/// Per-restaurant running ledger of vendor-owed amounts.
///
/// Mutated by charge settlement (increase pending, then available) and
/// payout events (decrease available). Always in the restaurant's settlement
/// currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VendorBalance {
    pub restaurant_id: String,
    pub available_cents: i64,
    pub pending_cents: i64,
    pub currency: String,
    #[ts(as = "Option<String>")]
    pub last_settlement_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub next_settlement_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl VendorBalance {
    #[inline]
    pub fn available(&self) -> Money {
        Money::from_cents(self.available_cents)
    }

    #[inline]
    pub fn pending(&self) -> Money {
        Money::from_cents(self.pending_cents)
    }
}

/// What triggered a payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PayoutOrigin {
    /// Restaurant owner requested it from the dashboard.
    Manual,
    /// Produced by the settlement schedule.
    Schedule,
}

/// A payout drawn against a restaurant's available balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Payout {
    pub id: String,
    pub restaurant_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub requested_by: PayoutOrigin,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_forward_chain() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Delivered));
        assert!(Ready.can_transition_to(Completed));

        // No skipping ahead
        assert!(!Pending.can_transition_to(Ready));
        assert!(!Confirmed.can_transition_to(Delivered));
    }

    #[test]
    fn test_order_status_cancel_from_any_non_terminal() {
        use OrderStatus::*;
        for from in [Pending, Confirmed, Preparing, Ready] {
            assert!(from.can_transition_to(Cancelled), "{from:?}");
        }
        for from in [Delivered, Completed, Cancelled] {
            assert!(!from.can_transition_to(Cancelled), "{from:?}");
        }
    }

    #[test]
    fn test_order_status_transition_rejects_illegal() {
        let err = OrderStatus::Cancelled
            .transition_to(OrderStatus::Confirmed)
            .unwrap_err();
        assert!(matches!(err, CoreError::IllegalStatusTransition { .. }));
    }

    #[test]
    fn test_payment_status_transitions() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Paid.can_transition_to(Refunded));

        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Refunded.can_transition_to(Paid));
        assert!(!Cancelled.can_transition_to(Paid));
    }

    #[test]
    fn test_fee_applies_to_order_type() {
        let fee = CustomFee {
            id: "f1".to_string(),
            restaurant_id: "r1".to_string(),
            name: "Delivery fee".to_string(),
            kind: FeeKind::Fixed,
            value: 250,
            enabled: true,
            sort_order: 0,
            min_order_cents: None,
            max_order_cents: None,
            apply_dine_in: false,
            apply_takeaway: false,
            apply_delivery: true,
        };

        assert!(!fee.applies_to(OrderType::DineIn));
        assert!(!fee.applies_to(OrderType::Takeaway));
        assert!(!fee.applies_to(OrderType::Pickup));
        assert!(fee.applies_to(OrderType::Delivery));
    }

    #[test]
    fn test_fee_thresholds_inclusive() {
        let fee = CustomFee {
            id: "f1".to_string(),
            restaurant_id: "r1".to_string(),
            name: "Small order fee".to_string(),
            kind: FeeKind::Fixed,
            value: 100,
            enabled: true,
            sort_order: 0,
            min_order_cents: Some(2000),
            max_order_cents: Some(10000),
            apply_dine_in: true,
            apply_takeaway: true,
            apply_delivery: true,
        };

        assert!(!fee.within_thresholds(Money::from_cents(1999)));
        assert!(fee.within_thresholds(Money::from_cents(2000)));
        assert!(fee.within_thresholds(Money::from_cents(10000)));
        assert!(!fee.within_thresholds(Money::from_cents(10001)));
    }

    #[test]
    fn test_guest_cancellable() {
        let mut order = test_order();
        assert!(order.guest_cancellable());

        order.payment_status = PaymentStatus::Paid;
        assert!(!order.guest_cancellable());

        order.payment_status = PaymentStatus::Pending;
        order.status = OrderStatus::Confirmed;
        assert!(!order.guest_cancellable());
    }

    fn test_order() -> Order {
        Order {
            id: "o1".to_string(),
            restaurant_id: "r1".to_string(),
            table_id: None,
            order_type: OrderType::DineIn,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            subtotal_cents: 5000,
            fee_lines: Vec::new(),
            tax_cents: 0,
            tax_mode: TaxMode::Inclusive,
            tip_cents: 0,
            total_cents: 5000,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
