//! # Settings Repository
//!
//! Per-restaurant configuration: tax/fee settings and custom fee rules.
//!
//! ## Lazy Defaults
//! Restaurant identity is owned by the wider platform; the engine only needs
//! a settings row. `get_or_create` materializes one with platform defaults
//! the first time a restaurant is priced, so checkout never fails on a
//! freshly onboarded restaurant.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tabletap_core::validation::{validate_custom_fee, validate_rate_bps};
use tabletap_core::{
    CustomFee, FeeKind, RestaurantSettings, SettlementSchedule, TaxMode, DEFAULT_CURRENCY,
    DEFAULT_PLATFORM_FEE_BPS, DEFAULT_TAX_RATE_BPS,
};

/// Repository for restaurant settings and custom fee rules.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct SettingsRow {
    restaurant_id: String,
    tax_rate_bps: i64,
    tax_mode: TaxMode,
    currency: String,
    accepts_cash: bool,
    accepts_online: bool,
    platform_fee_bps: i64,
    settlement_schedule: SettlementSchedule,
    connected_account_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SettingsRow {
    fn into_settings(self) -> RestaurantSettings {
        RestaurantSettings {
            restaurant_id: self.restaurant_id,
            // Stored as INTEGER, validated <= 10000 at the write boundary.
            tax_rate_bps: self.tax_rate_bps as u32,
            tax_mode: self.tax_mode,
            currency: self.currency,
            accepts_cash: self.accepts_cash,
            accepts_online: self.accepts_online,
            platform_fee_bps: self.platform_fee_bps as u32,
            settlement_schedule: self.settlement_schedule,
            connected_account_id: self.connected_account_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FeeRow {
    id: String,
    restaurant_id: String,
    name: String,
    kind: FeeKind,
    value: i64,
    enabled: bool,
    sort_order: i64,
    min_order_cents: Option<i64>,
    max_order_cents: Option<i64>,
    apply_dine_in: bool,
    apply_takeaway: bool,
    apply_delivery: bool,
}

impl FeeRow {
    fn into_fee(self) -> CustomFee {
        CustomFee {
            id: self.id,
            restaurant_id: self.restaurant_id,
            name: self.name,
            kind: self.kind,
            value: self.value,
            enabled: self.enabled,
            sort_order: self.sort_order,
            min_order_cents: self.min_order_cents,
            max_order_cents: self.max_order_cents,
            apply_dine_in: self.apply_dine_in,
            apply_takeaway: self.apply_takeaway,
            apply_delivery: self.apply_delivery,
        }
    }
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    // =========================================================================
    // Restaurant Settings
    // =========================================================================

    /// Gets settings for a restaurant, if a row exists.
    pub async fn get(&self, restaurant_id: &str) -> DbResult<Option<RestaurantSettings>> {
        let row: Option<SettingsRow> = sqlx::query_as(
            "SELECT restaurant_id, tax_rate_bps, tax_mode, currency,
                    accepts_cash, accepts_online, platform_fee_bps,
                    settlement_schedule, connected_account_id,
                    created_at, updated_at
             FROM restaurant_settings
             WHERE restaurant_id = ?1",
        )
        .bind(restaurant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SettingsRow::into_settings))
    }

    /// Gets settings, creating a row with platform defaults if none exists.
    pub async fn get_or_create(&self, restaurant_id: &str) -> DbResult<RestaurantSettings> {
        if let Some(settings) = self.get(restaurant_id).await? {
            return Ok(settings);
        }

        info!(restaurant_id, "creating default settings row");

        let now = Utc::now();
        let defaults = RestaurantSettings {
            restaurant_id: restaurant_id.to_string(),
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            tax_mode: TaxMode::Inclusive,
            currency: DEFAULT_CURRENCY.to_string(),
            accepts_cash: true,
            accepts_online: true,
            platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            settlement_schedule: SettlementSchedule::Weekly,
            connected_account_id: None,
            created_at: now,
            updated_at: now,
        };

        // INSERT OR IGNORE: a concurrent first access may have won the race;
        // either way the row now exists and a re-read returns it.
        sqlx::query(
            "INSERT OR IGNORE INTO restaurant_settings (
                restaurant_id, tax_rate_bps, tax_mode, currency,
                accepts_cash, accepts_online, platform_fee_bps,
                settlement_schedule, connected_account_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&defaults.restaurant_id)
        .bind(defaults.tax_rate_bps as i64)
        .bind(defaults.tax_mode)
        .bind(&defaults.currency)
        .bind(defaults.accepts_cash)
        .bind(defaults.accepts_online)
        .bind(defaults.platform_fee_bps as i64)
        .bind(defaults.settlement_schedule)
        .bind(&defaults.connected_account_id)
        .bind(defaults.created_at)
        .bind(defaults.updated_at)
        .execute(&self.pool)
        .await?;

        self.get(restaurant_id)
            .await?
            .ok_or_else(|| DbError::not_found("RestaurantSettings", restaurant_id))
    }

    /// Writes settings, validating rates at the boundary.
    ///
    /// Invalid rates are rejected here so the pricing path never has to
    /// re-check stored configuration.
    pub async fn upsert(&self, settings: &RestaurantSettings) -> DbResult<()> {
        validate_rate_bps("tax_rate_bps", settings.tax_rate_bps)?;
        validate_rate_bps("platform_fee_bps", settings.platform_fee_bps)?;

        let now = Utc::now();

        sqlx::query(
            "INSERT INTO restaurant_settings (
                restaurant_id, tax_rate_bps, tax_mode, currency,
                accepts_cash, accepts_online, platform_fee_bps,
                settlement_schedule, connected_account_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            ON CONFLICT (restaurant_id) DO UPDATE SET
                tax_rate_bps = excluded.tax_rate_bps,
                tax_mode = excluded.tax_mode,
                currency = excluded.currency,
                accepts_cash = excluded.accepts_cash,
                accepts_online = excluded.accepts_online,
                platform_fee_bps = excluded.platform_fee_bps,
                settlement_schedule = excluded.settlement_schedule,
                connected_account_id = excluded.connected_account_id,
                updated_at = excluded.updated_at",
        )
        .bind(&settings.restaurant_id)
        .bind(settings.tax_rate_bps as i64)
        .bind(settings.tax_mode)
        .bind(&settings.currency)
        .bind(settings.accepts_cash)
        .bind(settings.accepts_online)
        .bind(settings.platform_fee_bps as i64)
        .bind(settings.settlement_schedule)
        .bind(&settings.connected_account_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(restaurant_id = %settings.restaurant_id, "settings upserted");
        Ok(())
    }

    // =========================================================================
    // Custom Fees
    // =========================================================================

    /// Lists a restaurant's fee rules in evaluation order.
    pub async fn list_fees(&self, restaurant_id: &str) -> DbResult<Vec<CustomFee>> {
        let rows: Vec<FeeRow> = sqlx::query_as(
            "SELECT id, restaurant_id, name, kind, value, enabled, sort_order,
                    min_order_cents, max_order_cents,
                    apply_dine_in, apply_takeaway, apply_delivery
             FROM custom_fees
             WHERE restaurant_id = ?1
             ORDER BY sort_order, id",
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FeeRow::into_fee).collect())
    }

    /// Writes a fee rule, validating it at the boundary.
    ///
    /// Inverted thresholds (min > max) are rejected here, not clamped.
    pub async fn upsert_fee(&self, fee: &CustomFee) -> DbResult<()> {
        validate_custom_fee(fee)?;

        sqlx::query(
            "INSERT INTO custom_fees (
                id, restaurant_id, name, kind, value, enabled, sort_order,
                min_order_cents, max_order_cents,
                apply_dine_in, apply_takeaway, apply_delivery
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                kind = excluded.kind,
                value = excluded.value,
                enabled = excluded.enabled,
                sort_order = excluded.sort_order,
                min_order_cents = excluded.min_order_cents,
                max_order_cents = excluded.max_order_cents,
                apply_dine_in = excluded.apply_dine_in,
                apply_takeaway = excluded.apply_takeaway,
                apply_delivery = excluded.apply_delivery",
        )
        .bind(&fee.id)
        .bind(&fee.restaurant_id)
        .bind(&fee.name)
        .bind(fee.kind)
        .bind(fee.value)
        .bind(fee.enabled)
        .bind(fee.sort_order)
        .bind(fee.min_order_cents)
        .bind(fee.max_order_cents)
        .bind(fee.apply_dine_in)
        .bind(fee.apply_takeaway)
        .bind(fee.apply_delivery)
        .execute(&self.pool)
        .await?;

        debug!(fee_id = %fee.id, name = %fee.name, "fee rule upserted");
        Ok(())
    }

    /// Deletes a fee rule. Past orders keep their frozen fee-line snapshots.
    pub async fn delete_fee(&self, fee_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM custom_fees WHERE id = ?1")
            .bind(fee_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomFee", fee_id));
        }

        Ok(())
    }
}
