//! # Payment Link Repository
//!
//! Association between an order and its provider-side charge. At most one
//! link per order (unique index); the link records which account topology
//! the charge was created under so the reconciler can aim its refund.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tabletap_core::PaymentIntentLink;

/// Repository for order-to-charge linkage.
#[derive(Debug, Clone)]
pub struct PaymentLinkRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: String,
    order_id: String,
    provider: String,
    charge_ref: String,
    connected_account_id: Option<String>,
    amount_cents: i64,
    platform_fee_cents: i64,
    refunded: bool,
    created_at: DateTime<Utc>,
    finalized_at: Option<DateTime<Utc>>,
}

impl LinkRow {
    fn into_link(self) -> PaymentIntentLink {
        PaymentIntentLink {
            id: self.id,
            order_id: self.order_id,
            provider: self.provider,
            charge_ref: self.charge_ref,
            connected_account_id: self.connected_account_id,
            amount_cents: self.amount_cents,
            platform_fee_cents: self.platform_fee_cents,
            refunded: self.refunded,
            created_at: self.created_at,
            finalized_at: self.finalized_at,
        }
    }
}

impl PaymentLinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentLinkRepository { pool }
    }

    /// Records a new charge link. The unique index on order_id rejects a
    /// second charge for the same order as a `UniqueViolation`.
    pub async fn create(&self, link: &PaymentIntentLink) -> DbResult<()> {
        debug!(
            order_id = %link.order_id,
            charge_ref = %link.charge_ref,
            "creating payment link"
        );

        sqlx::query(
            "INSERT INTO payment_links (
                id, order_id, provider, charge_ref, connected_account_id,
                amount_cents, platform_fee_cents, refunded, created_at, finalized_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&link.id)
        .bind(&link.order_id)
        .bind(&link.provider)
        .bind(&link.charge_ref)
        .bind(&link.connected_account_id)
        .bind(link.amount_cents)
        .bind(link.platform_fee_cents)
        .bind(link.refunded)
        .bind(link.created_at)
        .bind(link.finalized_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets the charge link for an order, if the order was paid online.
    pub async fn get_by_order(&self, order_id: &str) -> DbResult<Option<PaymentIntentLink>> {
        let row: Option<LinkRow> = sqlx::query_as(
            "SELECT id, order_id, provider, charge_ref, connected_account_id,
                    amount_cents, platform_fee_cents, refunded, created_at, finalized_at
             FROM payment_links
             WHERE order_id = ?1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LinkRow::into_link))
    }

    /// Marks the charge as captured at the given instant.
    pub async fn finalize(&self, link_id: &str, at: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE payment_links SET finalized_at = ?2 WHERE id = ?1",
        )
        .bind(link_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentIntentLink", link_id));
        }

        Ok(())
    }

    /// Sets the terminal refunded marker.
    pub async fn mark_refunded(&self, link_id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE payment_links SET refunded = 1 WHERE id = ?1")
            .bind(link_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentIntentLink", link_id));
        }

        debug!(link_id, "payment link marked refunded");
        Ok(())
    }
}
