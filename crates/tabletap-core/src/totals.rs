//! # Order Total Composer
//!
//! Combines subtotal, fee lines, tax and tip into a final total with a
//! stable, explainable breakdown.
//!
//! ## Composition Rule
//! ```text
//! total = subtotal
//!       + Σ fee_lines
//!       + tax          (Exclusive mode only - Inclusive tax is already in
//!                       the subtotal and is informational)
//!       + tip
//! ```
//!
//! The composer is pure and side-effect-free. It is re-run from scratch any
//! time the subtotal, fees or tax configuration change; totals are never
//! incrementally patched.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::fees::{compute_fee_lines, fee_total};
use crate::money::{Money, Rate};
use crate::tax::compute_tax;
use crate::types::{CustomFee, FeeLine, OrderType, TaxMode};
use crate::validation::validate_amount_cents;

// =============================================================================
// Breakdown DTO
// =============================================================================

/// The explainable breakdown the UI renders and the order stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal_cents: i64,
    pub fee_lines: Vec<FeeLine>,
    /// Convenience sum of `fee_lines`.
    pub fee_total_cents: i64,
    pub tax_cents: i64,
    pub tax_mode: TaxMode,
    pub tip_cents: i64,
    pub total_cents: i64,
}

impl OrderTotals {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Composition
// =============================================================================

/// Composes the final total from already-computed parts.
///
/// Inclusive tax must not be added a second time: it is already embedded in
/// the subtotal, so it contributes nothing to the sum and appears in the
/// breakdown for display only.
pub fn compose_total(
    subtotal: Money,
    fee_lines: Vec<FeeLine>,
    tax: Money,
    tax_mode: TaxMode,
    tip: Money,
) -> OrderTotals {
    let fees = fee_total(&fee_lines);
    let added_tax = match tax_mode {
        TaxMode::Exclusive => tax,
        TaxMode::Inclusive => Money::zero(),
    };
    let total = subtotal + fees + added_tax + tip;

    OrderTotals {
        subtotal_cents: subtotal.cents(),
        fee_lines,
        fee_total_cents: fees.cents(),
        tax_cents: tax.cents(),
        tax_mode,
        tip_cents: tip.cents(),
        total_cents: total.cents(),
    }
}

/// Runs the full checkout pricing pipeline: fee rules, tax, composition.
///
/// This is the entry point the checkout flow calls with a cart subtotal and
/// the restaurant's configuration.
///
/// ## Example
/// ```rust
/// use tabletap_core::money::{Money, Rate};
/// use tabletap_core::totals::price_order;
/// use tabletap_core::types::{OrderType, TaxMode};
///
/// let totals = price_order(
///     &[],
///     Money::from_cents(5000),
///     OrderType::DineIn,
///     Rate::from_bps(1900),
///     TaxMode::Exclusive,
///     Money::zero(),
/// )
/// .unwrap();
/// assert_eq!(totals.total_cents, 5950);
/// ```
pub fn price_order(
    fees: &[CustomFee],
    subtotal: Money,
    order_type: OrderType,
    tax_rate: Rate,
    tax_mode: TaxMode,
    tip: Money,
) -> Result<OrderTotals, ValidationError> {
    validate_amount_cents("subtotal", subtotal.cents())?;
    validate_amount_cents("tip", tip.cents())?;

    let fee_lines = compute_fee_lines(fees, subtotal, order_type)?;
    let tax = compute_tax(subtotal, tax_rate, tax_mode);

    Ok(compose_total(subtotal, fee_lines, tax, tax_mode, tip))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeeKind;

    fn percent_fee(value_bps: i64) -> CustomFee {
        CustomFee {
            id: "f1".to_string(),
            restaurant_id: "r1".to_string(),
            name: "Service fee".to_string(),
            kind: FeeKind::Percent,
            value: value_bps,
            enabled: true,
            sort_order: 0,
            min_order_cents: None,
            max_order_cents: None,
            apply_dine_in: true,
            apply_takeaway: false,
            apply_delivery: false,
        }
    }

    #[test]
    fn test_fee_and_exclusive_tax_composition() {
        // subtotal €50.00, 10% dine-in fee, 19% exclusive tax
        // fee €5.00, tax €9.50, total €64.50
        let totals = price_order(
            &[percent_fee(1000)],
            Money::from_cents(5000),
            OrderType::DineIn,
            Rate::from_bps(1900),
            TaxMode::Exclusive,
            Money::zero(),
        )
        .unwrap();

        assert_eq!(totals.fee_total_cents, 500);
        assert_eq!(totals.tax_cents, 950);
        assert_eq!(totals.total_cents, 6450);
    }

    #[test]
    fn test_inclusive_tax_not_added_twice() {
        // subtotal €50.00 tax-inclusive at 19%: extracted ≈ €7.98,
        // total stays subtotal + fees + tip
        let totals = price_order(
            &[percent_fee(1000)],
            Money::from_cents(5000),
            OrderType::DineIn,
            Rate::from_bps(1900),
            TaxMode::Inclusive,
            Money::from_cents(200),
        )
        .unwrap();

        assert_eq!(totals.tax_cents, 798);
        // 5000 + 500 fee + 200 tip, tax NOT added
        assert_eq!(totals.total_cents, 5700);
    }

    #[test]
    fn test_tip_included_in_total() {
        let totals = price_order(
            &[],
            Money::from_cents(5000),
            OrderType::Takeaway,
            Rate::zero(),
            TaxMode::Exclusive,
            Money::from_cents(300),
        )
        .unwrap();

        assert_eq!(totals.total_cents, 5300);
    }

    #[test]
    fn test_zero_rate_modes_agree_on_total() {
        for mode in [TaxMode::Inclusive, TaxMode::Exclusive] {
            let totals = price_order(
                &[],
                Money::from_cents(5000),
                OrderType::DineIn,
                Rate::zero(),
                mode,
                Money::zero(),
            )
            .unwrap();
            assert_eq!(totals.tax_cents, 0, "{mode:?}");
            assert_eq!(totals.total_cents, 5000, "{mode:?}");
        }
    }

    #[test]
    fn test_negative_tip_rejected() {
        let err = price_order(
            &[],
            Money::from_cents(5000),
            OrderType::DineIn,
            Rate::zero(),
            TaxMode::Exclusive,
            Money::from_cents(-100),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::NegativeAmount { .. }));
    }

    #[test]
    fn test_compose_is_pure_recomposition() {
        // Composing twice with the same inputs yields the same breakdown
        let lines = vec![FeeLine {
            fee_id: "f1".to_string(),
            name: "Service fee".to_string(),
            kind: FeeKind::Fixed,
            value: 150,
            amount_cents: 150,
        }];

        let a = compose_total(
            Money::from_cents(5000),
            lines.clone(),
            Money::from_cents(950),
            TaxMode::Exclusive,
            Money::zero(),
        );
        let b = compose_total(
            Money::from_cents(5000),
            lines,
            Money::from_cents(950),
            TaxMode::Exclusive,
            Money::zero(),
        );
        assert_eq!(a, b);
        assert_eq!(a.total_cents, 6100);
    }
}
