//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CHECKOUT                                                            │
//! │     └── insert() → Order { status: Pending } + items (one transaction)  │
//! │                                                                         │
//! │  2. REPRICE (config changed before confirmation)                        │
//! │     └── update_totals() → whole breakdown rewritten, never patched      │
//! │                                                                         │
//! │  3. FULFILMENT                                                          │
//! │     └── update_status() → conditional on the expected current status    │
//! │                                                                         │
//! │  4. CANCELLATION                                                        │
//! │     └── cancel_if_active() → single conditional UPDATE; the atomic      │
//! │         claim that makes cancellation at-most-once per order            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tabletap_core::{
    Order, OrderItem, OrderStatus, OrderTotals, OrderType, PaymentStatus, TaxMode,
};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

/// Raw row shape; fee_lines is the JSON snapshot column.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    restaurant_id: String,
    table_id: Option<String>,
    order_type: OrderType,
    status: OrderStatus,
    payment_status: PaymentStatus,
    subtotal_cents: i64,
    fee_lines: String,
    tax_cents: i64,
    tax_mode: TaxMode,
    tip_cents: i64,
    total_cents: i64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> DbResult<Order> {
        let fee_lines =
            serde_json::from_str(&self.fee_lines).map_err(|e| DbError::CorruptRow {
                entity: "orders.fee_lines".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Order {
            id: self.id,
            restaurant_id: self.restaurant_id,
            table_id: self.table_id,
            order_type: self.order_type,
            status: self.status,
            payment_status: self.payment_status,
            subtotal_cents: self.subtotal_cents,
            fee_lines,
            tax_cents: self.tax_cents,
            tax_mode: self.tax_mode,
            tip_cents: self.tip_cents,
            total_cents: self.total_cents,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: String,
    order_id: String,
    menu_item_id: String,
    name_snapshot: String,
    variant_snapshot: Option<String>,
    unit_price_cents: i64,
    quantity: i64,
    line_total_cents: i64,
    created_at: DateTime<Utc>,
}

impl ItemRow {
    fn into_item(self) -> OrderItem {
        OrderItem {
            id: self.id,
            order_id: self.order_id,
            menu_item_id: self.menu_item_id,
            name_snapshot: self.name_snapshot,
            variant_snapshot: self.variant_snapshot,
            unit_price_cents: self.unit_price_cents,
            quantity: self.quantity,
            line_total_cents: self.line_total_cents,
            created_at: self.created_at,
        }
    }
}

const ORDER_COLUMNS: &str = "id, restaurant_id, table_id, order_type, status, payment_status, \
     subtotal_cents, fee_lines, tax_cents, tax_mode, tip_cents, total_cents, \
     notes, created_at, updated_at";

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order with its items in one transaction.
    ///
    /// ## Snapshot Pattern
    /// Item names/prices and the fee breakdown are frozen copies; later menu
    /// or fee-rule edits never rewrite order history.
    pub async fn insert(&self, order: &Order, items: &[OrderItem]) -> DbResult<()> {
        debug!(id = %order.id, restaurant_id = %order.restaurant_id, "inserting order");

        let fee_lines_json = serde_json::to_string(&order.fee_lines)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (
                id, restaurant_id, table_id, order_type, status, payment_status,
                subtotal_cents, fee_lines, tax_cents, tax_mode, tip_cents, total_cents,
                notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )
        .bind(&order.id)
        .bind(&order.restaurant_id)
        .bind(&order.table_id)
        .bind(order.order_type)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(order.subtotal_cents)
        .bind(&fee_lines_json)
        .bind(order.tax_cents)
        .bind(order.tax_mode)
        .bind(order.tip_cents)
        .bind(order.total_cents)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO order_items (
                    id, order_id, menu_item_id, name_snapshot, variant_snapshot,
                    unit_price_cents, quantity, line_total_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.menu_item_id)
            .bind(&item.name_snapshot)
            .bind(&item.variant_snapshot)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Gets all items for an order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT id, order_id, menu_item_id, name_snapshot, variant_snapshot,
                    unit_price_cents, quantity, line_total_cents, created_at
             FROM order_items
             WHERE order_id = ?1
             ORDER BY created_at",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ItemRow::into_item).collect())
    }

    /// Rewrites the whole financial breakdown of a pending order.
    ///
    /// Only pending orders can be repriced; once confirmed, the breakdown is
    /// part of the record.
    pub async fn update_totals(&self, order_id: &str, totals: &OrderTotals) -> DbResult<()> {
        let fee_lines_json = serde_json::to_string(&totals.fee_lines)
            .map_err(|e| DbError::Internal(e.to_string()))?;
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE orders SET
                subtotal_cents = ?2,
                fee_lines = ?3,
                tax_cents = ?4,
                tax_mode = ?5,
                tip_cents = ?6,
                total_cents = ?7,
                updated_at = ?8
             WHERE id = ?1 AND status = 'pending'",
        )
        .bind(order_id)
        .bind(totals.subtotal_cents)
        .bind(&fee_lines_json)
        .bind(totals.tax_cents)
        .bind(totals.tax_mode)
        .bind(totals.tip_cents)
        .bind(totals.total_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (pending)", order_id));
        }

        Ok(())
    }

    /// Advances an order's status, conditional on the expected current one.
    ///
    /// The `WHERE status = ?` guard makes this a compare-and-swap: a
    /// concurrent writer that got there first leaves rows_affected at 0.
    pub async fn update_status(
        &self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE orders SET status = ?3, updated_at = ?4
             WHERE id = ?1 AND status = ?2",
        )
        .bind(order_id)
        .bind(from)
        .bind(to)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Atomically claims the cancellation of an order.
    ///
    /// Single conditional UPDATE: succeeds only while the order is in a
    /// non-terminal status. Two concurrent cancellation requests cannot both
    /// win, so at most one caller ever proceeds to the refund leg.
    ///
    /// Returns whether this caller claimed the cancellation.
    pub async fn cancel_if_active(&self, order_id: &str) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE orders SET status = 'cancelled', updated_at = ?2
             WHERE id = ?1 AND status NOT IN ('delivered', 'completed', 'cancelled')",
        )
        .bind(order_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let claimed = result.rows_affected() == 1;
        debug!(order_id, claimed, "cancellation claim");
        Ok(claimed)
    }

    /// Sets the payment status. Transition legality is the caller's
    /// responsibility (the service layer runs the state machine).
    pub async fn set_payment_status(
        &self,
        order_id: &str,
        status: PaymentStatus,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE orders SET payment_status = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(order_id)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }

    /// Appends a line to the order's notes.
    pub async fn append_note(&self, order_id: &str, note: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE orders SET
                notes = CASE WHEN notes IS NULL OR notes = '' THEN ?2
                             ELSE notes || char(10) || ?2 END,
                updated_at = ?3
             WHERE id = ?1",
        )
        .bind(order_id)
        .bind(note)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }
}
