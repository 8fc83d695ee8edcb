//! # Money Module
//!
//! Monetary values and percentage rates for TableTap.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A fee/tax/split chain compounds that error across every order.         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    €10.99 = 1099 cents. All arithmetic happens in cents, rounding       │
//! │    happens exactly once per derived amount, and it is explicit.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tabletap_core::money::{Money, Rate};
//!
//! let subtotal = Money::from_cents(5000);       // €50.00
//! let tax = subtotal.percent_of(Rate::from_bps(1900)); // 19%
//! assert_eq!(tax.cents(), 950);                 // €9.50
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: refunds and ledger reversals need negative values
/// - **Single-field tuple struct**: zero-cost abstraction over i64
/// - **No float constructor**: amounts enter the system as cents, period
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -€5.50, not -€4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Computes `rate` percent of this amount with half-up rounding.
    ///
    /// This is the single rounding point for every percent-derived amount in
    /// the system: percent fees, exclusive tax, and the platform's cut of a
    /// charge all go through here.
    ///
    /// ## Implementation
    /// Integer math in i128: `(cents * bps + 5000) / 10000`. The +5000 is
    /// half of the bps denominator, which rounds .5 up (currency minor-unit
    /// rounding, half-up).
    ///
    /// ## Example
    /// ```rust
    /// use tabletap_core::money::{Money, Rate};
    ///
    /// let subtotal = Money::from_cents(5000);            // €50.00
    /// let fee = subtotal.percent_of(Rate::from_bps(1000)); // 10%
    /// assert_eq!(fee.cents(), 500);                      // €5.00
    /// ```
    pub fn percent_of(&self, rate: Rate) -> Money {
        // i128 prevents overflow on large amounts
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Extracts the tax already contained in a tax-inclusive amount.
    ///
    /// The amount stays what it is; this only reports how much of it is tax,
    /// for display and reporting. `net = amount / (1 + rate)` rounded
    /// half-up, `tax = amount - net` — derived by subtraction so that
    /// `net + tax == amount` exactly.
    ///
    /// ## Example
    /// ```rust
    /// use tabletap_core::money::{Money, Rate};
    ///
    /// let gross = Money::from_cents(5000);               // €50.00 incl. 19%
    /// let tax = gross.included_tax(Rate::from_bps(1900));
    /// assert_eq!(tax.cents(), 798);                      // €7.98
    /// ```
    pub fn included_tax(&self, rate: Rate) -> Money {
        if rate.is_zero() {
            return Money::zero();
        }
        let denom = 10000i128 + rate.bps() as i128;
        let net = (self.0 as i128 * 10000 + denom / 2) / denom;
        Money::from_cents(self.0 - net as i64)
    }
}

/// Display implementation for debugging and log output.
/// UI display goes through frontend formatting (currency, locale).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// A percentage rate in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. 1900 bps = 19% (German VAT),
/// 250 bps = 2.5% (a typical platform fee). An integer unit keeps rate
/// arithmetic exact; unsigned because no rate in this system is negative.
///
/// The same unit drives tax rates, percent fees, and the platform fee split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (19.0 -> 1900 bps).
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300]
            .iter()
            .map(|c| Money::from_cents(*c))
            .sum();
        assert_eq!(total.cents(), 600);
    }

    #[test]
    fn test_percent_of_basic() {
        // €10.00 at 10% = €1.00
        let amount = Money::from_cents(1000);
        assert_eq!(amount.percent_of(Rate::from_bps(1000)).cents(), 100);
    }

    #[test]
    fn test_percent_of_rounds_half_up() {
        // €10.00 at 8.25% = €0.825 -> €0.83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.percent_of(Rate::from_bps(825)).cents(), 83);

        // €0.05 at 10% = €0.005 -> €0.01
        let tiny = Money::from_cents(5);
        assert_eq!(tiny.percent_of(Rate::from_bps(1000)).cents(), 1);
    }

    #[test]
    fn test_percent_of_zero_rate() {
        let amount = Money::from_cents(12345);
        assert_eq!(amount.percent_of(Rate::zero()).cents(), 0);
    }

    #[test]
    fn test_included_tax_19_percent() {
        // €50.00 gross with 19% included: net €42.02, tax €7.98
        let gross = Money::from_cents(5000);
        let tax = gross.included_tax(Rate::from_bps(1900));
        assert_eq!(tax.cents(), 798);
    }

    #[test]
    fn test_included_tax_zero_rate() {
        let gross = Money::from_cents(5000);
        assert_eq!(gross.included_tax(Rate::zero()).cents(), 0);
    }

    #[test]
    fn test_included_tax_net_plus_tax_is_gross() {
        // Derived by subtraction, so the identity holds for any amount
        for cents in [1, 99, 100, 5000, 123_456_789] {
            let gross = Money::from_cents(cents);
            let tax = gross.included_tax(Rate::from_bps(1900));
            let net = gross - tax;
            assert_eq!((net + tax).cents(), cents);
        }
    }

    #[test]
    fn test_rate_from_percentage() {
        assert_eq!(Rate::from_percentage(19.0).bps(), 1900);
        assert_eq!(Rate::from_percentage(8.25).bps(), 825);
    }
}
