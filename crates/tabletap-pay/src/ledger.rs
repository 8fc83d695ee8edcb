//! # Vendor Balance & Payout Ledger
//!
//! Tracks what the platform owes each restaurant and turns that debt into
//! payouts.
//!
//! ## Lifecycle of a cent
//! ```text
//! charge captured ──► accrue()        vendor share → pending
//! schedule fires  ──► settle_due()    pending → available
//! owner requests  ──► request_payout  available → payout record
//! refund succeeds ──► reverse()       accrual backed out (pending first)
//! ```

use chrono::{DateTime, Duration, Months, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{PayError, PayResult};
use tabletap_core::{split_charge, ChargeSplit, Money, Payout, PayoutOrigin, Rate, SettlementSchedule};
use tabletap_db::Database;

/// Outcome of a payout request.
#[derive(Debug, Clone)]
pub struct PayoutResult {
    pub payout: Payout,
    pub remaining_available_cents: i64,
}

/// Service owning all balance and payout mutations.
#[derive(Debug, Clone)]
pub struct LedgerService {
    db: Database,
}

/// Next settlement instant after `from`, or None for manual schedules.
fn next_settlement(
    schedule: SettlementSchedule,
    from: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match schedule {
        SettlementSchedule::Daily => Some(from + Duration::days(1)),
        SettlementSchedule::Weekly => Some(from + Duration::days(7)),
        SettlementSchedule::Monthly => from.checked_add_months(Months::new(1)),
        SettlementSchedule::Manual => None,
    }
}

impl LedgerService {
    pub fn new(db: Database) -> Self {
        LedgerService { db }
    }

    /// Credits the vendor share of a captured charge to the pending bucket.
    ///
    /// The split is computed here, against the restaurant's current platform
    /// fee rate, and returned so the caller can lock it into the payment
    /// link.
    pub async fn accrue(&self, restaurant_id: &str, gross: Money) -> PayResult<ChargeSplit> {
        let settings = self.db.settings().get_or_create(restaurant_id).await?;
        let split = split_charge(gross, Rate::from_bps(settings.platform_fee_bps))?;

        self.db
            .balances()
            .get_or_create(restaurant_id, &settings.currency)
            .await?;
        self.db
            .balances()
            .accrue_pending(restaurant_id, split.vendor_cents)
            .await?;

        info!(
            restaurant_id,
            gross_cents = gross.cents(),
            platform_fee_cents = split.platform_fee_cents,
            vendor_cents = split.vendor_cents,
            "charge accrued"
        );
        Ok(split)
    }

    /// Backs out an earlier accrual after a successful refund.
    pub async fn reverse(&self, restaurant_id: &str, vendor_cents: i64) -> PayResult<()> {
        self.db
            .balances()
            .reverse_accrual(restaurant_id, vendor_cents)
            .await?;
        Ok(())
    }

    /// Moves pending to available when the restaurant's schedule says so.
    ///
    /// Returns the amount moved, or `None` when nothing was due. Manual
    /// schedules never auto-settle; their pending money moves only through
    /// an explicit settlement by support tooling.
    pub async fn settle_due(
        &self,
        restaurant_id: &str,
        now: DateTime<Utc>,
    ) -> PayResult<Option<i64>> {
        let settings = self.db.settings().get_or_create(restaurant_id).await?;

        if settings.settlement_schedule == SettlementSchedule::Manual {
            debug!(restaurant_id, "manual schedule, skipping auto-settlement");
            return Ok(None);
        }

        let balance = self
            .db
            .balances()
            .get_or_create(restaurant_id, &settings.currency)
            .await?;

        let due = match balance.next_settlement_at {
            // First settlement for this restaurant.
            None => true,
            Some(next) => next <= now,
        };
        if !due {
            return Ok(None);
        }

        let next = next_settlement(settings.settlement_schedule, now);
        let moved = self.db.balances().settle(restaurant_id, now, next).await?;

        Ok(Some(moved))
    }

    /// Draws a payout against the available balance.
    ///
    /// Manual requests are honored regardless of the settlement schedule.
    /// `amount_cents` of `None` pays out the full available balance.
    /// Over-requests and empty balances are rejected, never clamped.
    pub async fn request_payout(
        &self,
        restaurant_id: &str,
        amount_cents: Option<i64>,
        origin: PayoutOrigin,
    ) -> PayResult<PayoutResult> {
        let settings = self.db.settings().get_or_create(restaurant_id).await?;
        let balance = self
            .db
            .balances()
            .get_or_create(restaurant_id, &settings.currency)
            .await?;

        let requested = amount_cents.unwrap_or(balance.available_cents);
        if requested <= 0 || requested > balance.available_cents {
            return Err(PayError::InsufficientBalance {
                requested_cents: requested,
                available_cents: balance.available_cents,
            });
        }

        // Conditional deduction; a concurrent payout may still win the race.
        let deducted = self
            .db
            .balances()
            .deduct_available(restaurant_id, requested)
            .await?;
        if !deducted {
            let current = self
                .db
                .balances()
                .get(restaurant_id)
                .await?
                .map(|b| b.available_cents)
                .unwrap_or(0);
            return Err(PayError::InsufficientBalance {
                requested_cents: requested,
                available_cents: current,
            });
        }

        let payout = Payout {
            id: Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.to_string(),
            amount_cents: requested,
            currency: settings.currency.clone(),
            requested_by: origin,
            created_at: Utc::now(),
        };
        self.db.balances().record_payout(&payout).await?;

        let remaining = self
            .db
            .balances()
            .get(restaurant_id)
            .await?
            .map(|b| b.available_cents)
            .unwrap_or(0);

        Ok(PayoutResult {
            payout,
            remaining_available_cents: remaining,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
