//! # Fee Rule Engine
//!
//! Evaluates a restaurant's configured custom fees against a cart subtotal
//! and order context, producing a deterministic, ordered list of fee lines.
//!
//! ## Evaluation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CustomFee[]  (owner configuration, ascending sort_order)              │
//! │       │                                                                 │
//! │       ├── enabled == false?          skip                              │
//! │       ├── subtotal < min threshold?  skip                              │
//! │       ├── subtotal > max threshold?  skip                              │
//! │       ├── order-type flag off?       skip                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  amount = Percent ? subtotal × value/10000 (half-up) : value           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  FeeLine[]  (input order preserved, duplicates independent)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Zero-value fees that survive the filters still produce a zero-amount
//! line; whether to display those is the caller's decision.

use crate::error::ValidationError;
use crate::money::{Money, Rate};
use crate::types::{CustomFee, FeeKind, FeeLine, OrderType};
use crate::validation::{validate_amount_cents, validate_custom_fee};

/// Computes the applicable fee lines for a subtotal and order type.
///
/// Fees are evaluated in ascending `sort_order` (stable for ties, so the
/// configured order wins among equals) and the output preserves that order.
/// Same-named fees are legal and stay independent lines - fee rules may
/// intentionally overlap.
///
/// ## Errors
/// `ValidationError` for a negative subtotal or a fee whose configuration is
/// malformed (min > max, negative value). Configuration is validated at the
/// settings-write boundary too; this re-check keeps the engine safe against
/// rows written before that boundary existed.
///
/// ## Example
/// ```rust
/// use tabletap_core::fees::compute_fee_lines;
/// use tabletap_core::money::Money;
/// use tabletap_core::types::{CustomFee, FeeKind, OrderType};
///
/// let fees = vec![CustomFee {
///     id: "f1".into(),
///     restaurant_id: "r1".into(),
///     name: "Service fee".into(),
///     kind: FeeKind::Percent,
///     value: 1000, // 10%
///     enabled: true,
///     sort_order: 0,
///     min_order_cents: None,
///     max_order_cents: None,
///     apply_dine_in: true,
///     apply_takeaway: false,
///     apply_delivery: false,
/// }];
///
/// let lines = compute_fee_lines(&fees, Money::from_cents(5000), OrderType::DineIn).unwrap();
/// assert_eq!(lines[0].amount_cents, 500); // €5.00
/// ```
pub fn compute_fee_lines(
    fees: &[CustomFee],
    subtotal: Money,
    order_type: OrderType,
) -> Result<Vec<FeeLine>, ValidationError> {
    validate_amount_cents("subtotal", subtotal.cents())?;

    // Stable sort: ties keep their configured order
    let mut ordered: Vec<&CustomFee> = fees.iter().collect();
    ordered.sort_by_key(|f| f.sort_order);

    let mut lines = Vec::new();
    for fee in ordered {
        validate_custom_fee(fee)?;

        if !fee.enabled {
            continue;
        }
        if !fee.within_thresholds(subtotal) {
            continue;
        }
        if !fee.applies_to(order_type) {
            continue;
        }

        let amount = match fee.kind {
            FeeKind::Percent => subtotal.percent_of(Rate::from_bps(fee.value as u32)),
            FeeKind::Fixed => Money::from_cents(fee.value),
        };

        lines.push(FeeLine {
            fee_id: fee.id.clone(),
            name: fee.name.clone(),
            kind: fee.kind,
            value: fee.value,
            amount_cents: amount.cents(),
        });
    }

    Ok(lines)
}

/// Sum of a set of fee lines.
pub fn fee_total(lines: &[FeeLine]) -> Money {
    lines.iter().map(FeeLine::amount).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fee(name: &str, kind: FeeKind, value: i64) -> CustomFee {
        CustomFee {
            id: format!("fee-{name}"),
            restaurant_id: "r1".to_string(),
            name: name.to_string(),
            kind,
            value,
            enabled: true,
            sort_order: 0,
            min_order_cents: None,
            max_order_cents: None,
            apply_dine_in: true,
            apply_takeaway: true,
            apply_delivery: true,
        }
    }

    #[test]
    fn test_percent_fee_amount() {
        let fees = vec![fee("Service", FeeKind::Percent, 1000)];
        let lines =
            compute_fee_lines(&fees, Money::from_cents(5000), OrderType::DineIn).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].amount_cents, 500);
        assert_eq!(lines[0].value, 1000);
    }

    #[test]
    fn test_fixed_fee_amount() {
        let fees = vec![fee("Packaging", FeeKind::Fixed, 150)];
        let lines =
            compute_fee_lines(&fees, Money::from_cents(5000), OrderType::Takeaway).unwrap();

        assert_eq!(lines[0].amount_cents, 150);
    }

    #[test]
    fn test_disabled_fee_skipped() {
        let mut f = fee("Service", FeeKind::Percent, 1000);
        f.enabled = false;
        // Thresholds don't matter when disabled
        f.min_order_cents = Some(0);

        let lines =
            compute_fee_lines(&[f], Money::from_cents(5000), OrderType::DineIn).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_min_threshold_boundary() {
        let mut f = fee("Small order", FeeKind::Fixed, 100);
        f.min_order_cents = Some(2000);

        // 19.99 misses, 20.00 hits
        let below =
            compute_fee_lines(std::slice::from_ref(&f), Money::from_cents(1999), OrderType::DineIn)
                .unwrap();
        assert!(below.is_empty());

        let at = compute_fee_lines(&[f], Money::from_cents(2000), OrderType::DineIn).unwrap();
        assert_eq!(at.len(), 1);
        assert_eq!(at[0].amount_cents, 100);
    }

    #[test]
    fn test_max_threshold_boundary() {
        let mut f = fee("Capped", FeeKind::Fixed, 100);
        f.min_order_cents = Some(2000);
        f.max_order_cents = Some(10000);

        // 100.00 includes (inclusive upper bound), 100.01 excludes
        let at = compute_fee_lines(
            std::slice::from_ref(&f),
            Money::from_cents(10000),
            OrderType::DineIn,
        )
        .unwrap();
        assert_eq!(at.len(), 1);

        let above =
            compute_fee_lines(&[f], Money::from_cents(10001), OrderType::DineIn).unwrap();
        assert!(above.is_empty());
    }

    #[test]
    fn test_order_type_scoping() {
        let mut f = fee("Delivery", FeeKind::Percent, 500);
        f.apply_dine_in = false;
        f.apply_takeaway = false;
        f.apply_delivery = true;

        for (order_type, expect) in [
            (OrderType::DineIn, 0usize),
            (OrderType::Takeaway, 0),
            (OrderType::Delivery, 1),
        ] {
            let lines = compute_fee_lines(
                std::slice::from_ref(&f),
                Money::from_cents(5000),
                order_type,
            )
            .unwrap();
            assert_eq!(lines.len(), expect, "{order_type:?}");
        }
    }

    #[test]
    fn test_fee_with_no_flags_never_applies() {
        let mut f = fee("Orphan", FeeKind::Fixed, 100);
        f.apply_dine_in = false;
        f.apply_takeaway = false;
        f.apply_delivery = false;

        for order_type in [
            OrderType::DineIn,
            OrderType::Takeaway,
            OrderType::Delivery,
            OrderType::Pickup,
        ] {
            let lines = compute_fee_lines(
                std::slice::from_ref(&f),
                Money::from_cents(5000),
                order_type,
            )
            .unwrap();
            assert!(lines.is_empty(), "{order_type:?}");
        }
    }

    #[test]
    fn test_evaluation_order_by_sort_order() {
        let mut a = fee("B-second", FeeKind::Fixed, 100);
        a.sort_order = 2;
        let mut b = fee("A-first", FeeKind::Fixed, 200);
        b.sort_order = 1;

        let lines =
            compute_fee_lines(&[a, b], Money::from_cents(5000), OrderType::DineIn).unwrap();
        assert_eq!(lines[0].name, "A-first");
        assert_eq!(lines[1].name, "B-second");
    }

    #[test]
    fn test_duplicate_names_stay_independent() {
        let a = fee("Service", FeeKind::Percent, 500);
        let b = fee("Service", FeeKind::Fixed, 100);

        let lines =
            compute_fee_lines(&[a, b], Money::from_cents(5000), OrderType::DineIn).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].amount_cents, 250);
        assert_eq!(lines[1].amount_cents, 100);
    }

    #[test]
    fn test_zero_value_fee_produces_zero_line() {
        let fees = vec![fee("Placeholder", FeeKind::Percent, 0)];
        let lines =
            compute_fee_lines(&fees, Money::from_cents(5000), OrderType::DineIn).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].amount_cents, 0);
    }

    #[test]
    fn test_negative_subtotal_rejected() {
        let fees = vec![fee("Service", FeeKind::Percent, 1000)];
        let err =
            compute_fee_lines(&fees, Money::from_cents(-1), OrderType::DineIn).unwrap_err();
        assert!(matches!(err, ValidationError::NegativeAmount { .. }));
    }

    #[test]
    fn test_inverted_thresholds_rejected_not_clamped() {
        let mut f = fee("Broken", FeeKind::Fixed, 100);
        f.min_order_cents = Some(10000);
        f.max_order_cents = Some(2000);

        let err =
            compute_fee_lines(&[f], Money::from_cents(5000), OrderType::DineIn).unwrap_err();
        assert!(matches!(err, ValidationError::ThresholdInverted { .. }));
    }

    #[test]
    fn test_fee_total() {
        let fees = vec![
            fee("Service", FeeKind::Percent, 1000),
            fee("Packaging", FeeKind::Fixed, 150),
        ];
        let lines =
            compute_fee_lines(&fees, Money::from_cents(5000), OrderType::DineIn).unwrap();
        assert_eq!(fee_total(&lines).cents(), 650);
    }
}
