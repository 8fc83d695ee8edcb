//! # Tax Calculator
//!
//! Computes tax for a subtotal under the restaurant's tax mode.
//!
//! Two modes, one contract:
//! - **Inclusive** (EU model): menu prices already contain tax. The tax is
//!   backed out of the subtotal for display; the total never changes.
//! - **Exclusive** (US model): tax is computed on top of the subtotal and
//!   added during total composition.
//!
//! Rates are unsigned basis points, so a negative rate is unrepresentable.
//! Rate 0 yields zero tax in both modes and identical totals.

use crate::money::{Money, Rate};
use crate::types::TaxMode;

/// Computes the tax amount for a subtotal.
///
/// ## Example
/// ```rust
/// use tabletap_core::money::{Money, Rate};
/// use tabletap_core::tax::compute_tax;
/// use tabletap_core::types::TaxMode;
///
/// let subtotal = Money::from_cents(5000); // €50.00
/// let rate = Rate::from_bps(1900);        // 19%
///
/// // Exclusive: added on top later
/// assert_eq!(compute_tax(subtotal, rate, TaxMode::Exclusive).cents(), 950);
///
/// // Inclusive: extracted, total unchanged
/// assert_eq!(compute_tax(subtotal, rate, TaxMode::Inclusive).cents(), 798);
/// ```
pub fn compute_tax(subtotal: Money, rate: Rate, mode: TaxMode) -> Money {
    match mode {
        TaxMode::Inclusive => subtotal.included_tax(rate),
        TaxMode::Exclusive => subtotal.percent_of(rate),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
