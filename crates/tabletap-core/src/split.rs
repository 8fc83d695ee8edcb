//! # Payment Split Calculator
//!
//! Splits a gross charge between the platform and the vendor (restaurant).
//!
//! ## Exactness Invariant
//! ```text
//! platform_fee + vendor_amount == gross    (always, to the cent)
//! ```
//! The platform fee is the only rounded quantity; the vendor amount is
//! derived by subtraction, never rounded independently. Double-rounding is
//! how penny drift enters split calculations, and it is structurally
//! impossible here.
//!
//! Used identically at charge-creation time (to set the provider's
//! application-fee parameter) and at vendor-balance display time, so both
//! sides of the ledger always agree.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, Rate};
use crate::validation::{validate_amount_cents, validate_rate_bps};

/// The platform/vendor division of one gross charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChargeSplit {
    pub platform_fee_cents: i64,
    pub vendor_cents: i64,
}

impl ChargeSplit {
    #[inline]
    pub fn platform_fee(&self) -> Money {
        Money::from_cents(self.platform_fee_cents)
    }

    #[inline]
    pub fn vendor_amount(&self) -> Money {
        Money::from_cents(self.vendor_cents)
    }
}

/// Splits a gross amount by the platform fee rate.
///
/// ## Errors
/// Rejects negative gross amounts and rates above 100%.
///
/// ## Example
/// ```rust
/// use tabletap_core::money::{Money, Rate};
/// use tabletap_core::split::split_charge;
///
/// let split = split_charge(Money::from_cents(6450), Rate::from_bps(250)).unwrap();
/// assert_eq!(split.platform_fee_cents, 161); // 2.5%, half-up
/// assert_eq!(split.vendor_cents, 6289);
/// ```
pub fn split_charge(gross: Money, platform_fee: Rate) -> Result<ChargeSplit, ValidationError> {
    validate_amount_cents("gross amount", gross.cents())?;
    validate_rate_bps("platform fee", platform_fee.bps())?;

    let fee = gross.percent_of(platform_fee);
    let vendor = gross - fee;

    Ok(ChargeSplit {
        platform_fee_cents: fee.cents(),
        vendor_cents: vendor.cents(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let split = split_charge(Money::from_cents(10000), Rate::from_bps(250)).unwrap();
        assert_eq!(split.platform_fee_cents, 250);
        assert_eq!(split.vendor_cents, 9750);
    }

    #[test]
    fn test_split_exactness_no_penny_drift() {
        // fee + vendor == gross for awkward amounts and rates
        for gross in [0i64, 1, 99, 101, 333, 6450, 99999, 1_000_001] {
            for bps in [0u32, 1, 250, 333, 825, 1900, 5000, 9999, 10000] {
                let split =
                    split_charge(Money::from_cents(gross), Rate::from_bps(bps)).unwrap();
                assert_eq!(
                    split.platform_fee_cents + split.vendor_cents,
                    gross,
                    "gross={gross} bps={bps}"
                );
            }
        }
    }

    #[test]
    fn test_split_zero_rate() {
        let split = split_charge(Money::from_cents(6450), Rate::zero()).unwrap();
        assert_eq!(split.platform_fee_cents, 0);
        assert_eq!(split.vendor_cents, 6450);
    }

    #[test]
    fn test_split_full_rate() {
        let split = split_charge(Money::from_cents(6450), Rate::from_bps(10000)).unwrap();
        assert_eq!(split.platform_fee_cents, 6450);
        assert_eq!(split.vendor_cents, 0);
    }

    #[test]
    fn test_split_rejects_negative_gross() {
        let err = split_charge(Money::from_cents(-1), Rate::from_bps(250)).unwrap_err();
        assert!(matches!(err, ValidationError::NegativeAmount { .. }));
    }

    #[test]
    fn test_split_rejects_rate_above_100_percent() {
        let err = split_charge(Money::from_cents(1000), Rate::from_bps(10001)).unwrap_err();
        assert!(matches!(err, ValidationError::RateOutOfRange { .. }));
    }
}
