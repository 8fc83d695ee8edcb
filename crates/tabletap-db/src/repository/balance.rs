//! # Balance Repository
//!
//! Per-restaurant running ledger and payout history.
//!
//! ## Money Flow
//! ```text
//! online charge ──► accrue_pending ──► pending_cents
//!                                         │ settle() on schedule
//!                                         ▼
//!                                    available_cents ──► deduct_available ──► payout
//!
//! refund ──► reverse_accrual: pending first, then available
//! ```
//!
//! All mutations are single conditional UPDATEs or short transactions;
//! balances are never read-modify-written from application memory except
//! inside `reverse_accrual`'s transaction.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tabletap_core::{Payout, PayoutOrigin, VendorBalance};

/// Repository for vendor balances and payouts.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct BalanceRow {
    restaurant_id: String,
    available_cents: i64,
    pending_cents: i64,
    currency: String,
    last_settlement_at: Option<DateTime<Utc>>,
    next_settlement_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl BalanceRow {
    fn into_balance(self) -> VendorBalance {
        VendorBalance {
            restaurant_id: self.restaurant_id,
            available_cents: self.available_cents,
            pending_cents: self.pending_cents,
            currency: self.currency,
            last_settlement_at: self.last_settlement_at,
            next_settlement_at: self.next_settlement_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PayoutRow {
    id: String,
    restaurant_id: String,
    amount_cents: i64,
    currency: String,
    requested_by: PayoutOrigin,
    created_at: DateTime<Utc>,
}

impl PayoutRow {
    fn into_payout(self) -> Payout {
        Payout {
            id: self.id,
            restaurant_id: self.restaurant_id,
            amount_cents: self.amount_cents,
            currency: self.currency,
            requested_by: self.requested_by,
            created_at: self.created_at,
        }
    }
}

impl BalanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BalanceRepository { pool }
    }

    /// Gets the balance row for a restaurant, if one exists.
    pub async fn get(&self, restaurant_id: &str) -> DbResult<Option<VendorBalance>> {
        let row: Option<BalanceRow> = sqlx::query_as(
            "SELECT restaurant_id, available_cents, pending_cents, currency,
                    last_settlement_at, next_settlement_at, updated_at
             FROM vendor_balances
             WHERE restaurant_id = ?1",
        )
        .bind(restaurant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BalanceRow::into_balance))
    }

    /// Gets the balance, creating a zero row in the given currency if none
    /// exists yet.
    pub async fn get_or_create(
        &self,
        restaurant_id: &str,
        currency: &str,
    ) -> DbResult<VendorBalance> {
        if let Some(balance) = self.get(restaurant_id).await? {
            return Ok(balance);
        }

        let now = Utc::now();

        sqlx::query(
            "INSERT OR IGNORE INTO vendor_balances (
                restaurant_id, available_cents, pending_cents, currency, updated_at
            ) VALUES (?1, 0, 0, ?2, ?3)",
        )
        .bind(restaurant_id)
        .bind(currency)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(restaurant_id)
            .await?
            .ok_or_else(|| DbError::not_found("VendorBalance", restaurant_id))
    }

    /// Credits the vendor share of a captured charge to pending.
    pub async fn accrue_pending(&self, restaurant_id: &str, cents: i64) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE vendor_balances
             SET pending_cents = pending_cents + ?2, updated_at = ?3
             WHERE restaurant_id = ?1",
        )
        .bind(restaurant_id)
        .bind(cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("VendorBalance", restaurant_id));
        }

        debug!(restaurant_id, cents, "accrued to pending");
        Ok(())
    }

    /// Moves the entire pending balance to available and stamps the
    /// settlement times. Returns the amount moved.
    pub async fn settle(
        &self,
        restaurant_id: &str,
        settled_at: DateTime<Utc>,
        next_settlement_at: Option<DateTime<Utc>>,
    ) -> DbResult<i64> {
        let mut tx = self.pool.begin().await?;

        let row: Option<BalanceRow> = sqlx::query_as(
            "SELECT restaurant_id, available_cents, pending_cents, currency,
                    last_settlement_at, next_settlement_at, updated_at
             FROM vendor_balances
             WHERE restaurant_id = ?1",
        )
        .bind(restaurant_id)
        .fetch_optional(&mut *tx)
        .await?;

        let balance = row.ok_or_else(|| DbError::not_found("VendorBalance", restaurant_id))?;
        let moved = balance.pending_cents;

        sqlx::query(
            "UPDATE vendor_balances
             SET available_cents = available_cents + pending_cents,
                 pending_cents = 0,
                 last_settlement_at = ?2,
                 next_settlement_at = ?3,
                 updated_at = ?2
             WHERE restaurant_id = ?1",
        )
        .bind(restaurant_id)
        .bind(settled_at)
        .bind(next_settlement_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(restaurant_id, moved, "settled pending balance");
        Ok(moved)
    }

    /// Debits the available balance, conditional on sufficient funds.
    ///
    /// The `available_cents >= ?` guard in the UPDATE makes over-requests
    /// lose atomically; the caller sees `false` and rejects, never clamps.
    pub async fn deduct_available(&self, restaurant_id: &str, cents: i64) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE vendor_balances
             SET available_cents = available_cents - ?2, updated_at = ?3
             WHERE restaurant_id = ?1 AND available_cents >= ?2",
        )
        .bind(restaurant_id)
        .bind(cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Reverses an earlier accrual after a successful refund.
    ///
    /// Deducts from pending first (the money most likely still unsettled),
    /// then from available for the remainder. Available may go negative when
    /// a refund lands after a payout already drained it; the debt carries
    /// forward against future accruals.
    pub async fn reverse_accrual(&self, restaurant_id: &str, cents: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let row: Option<BalanceRow> = sqlx::query_as(
            "SELECT restaurant_id, available_cents, pending_cents, currency,
                    last_settlement_at, next_settlement_at, updated_at
             FROM vendor_balances
             WHERE restaurant_id = ?1",
        )
        .bind(restaurant_id)
        .fetch_optional(&mut *tx)
        .await?;

        let balance = row.ok_or_else(|| DbError::not_found("VendorBalance", restaurant_id))?;

        let from_pending = cents.min(balance.pending_cents).max(0);
        let from_available = cents - from_pending;
        let now = Utc::now();

        sqlx::query(
            "UPDATE vendor_balances
             SET pending_cents = pending_cents - ?2,
                 available_cents = available_cents - ?3,
                 updated_at = ?4
             WHERE restaurant_id = ?1",
        )
        .bind(restaurant_id)
        .bind(from_pending)
        .bind(from_available)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            restaurant_id,
            cents, from_pending, from_available, "reversed accrual"
        );
        Ok(())
    }

    /// Records a payout in the history table.
    pub async fn record_payout(&self, payout: &Payout) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO payouts (
                id, restaurant_id, amount_cents, currency, requested_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&payout.id)
        .bind(&payout.restaurant_id)
        .bind(payout.amount_cents)
        .bind(&payout.currency)
        .bind(payout.requested_by)
        .bind(payout.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            restaurant_id = %payout.restaurant_id,
            amount_cents = payout.amount_cents,
            "payout recorded"
        );
        Ok(())
    }

    /// Lists payouts for a restaurant, newest first.
    pub async fn list_payouts(&self, restaurant_id: &str) -> DbResult<Vec<Payout>> {
        let rows: Vec<PayoutRow> = sqlx::query_as(
            "SELECT id, restaurant_id, amount_cents, currency, requested_by, created_at
             FROM payouts
             WHERE restaurant_id = ?1
             ORDER BY created_at DESC",
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PayoutRow::into_payout).collect())
    }
}
