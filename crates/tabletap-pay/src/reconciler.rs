//! # Refund/Cancellation Reconciler
//!
//! Cancels an order and reconciles its money across the provider account
//! topology. The operational cancellation and the financial refund are
//! deliberately decoupled: a failed refund never un-cancels an order.
//!
//! ## Cancellation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load order ──► authorize caller ──► claim cancellation (conditional   │
//! │                                      UPDATE, at-most-once)             │
//! │                                             │                           │
//! │                                             ▼                           │
//! │          append reason to notes, publish OrderCancelled                 │
//! │                                             │                           │
//! │               ┌─────────────────────────────┴────────────┐             │
//! │               ▼                                          ▼             │
//! │        unpaid / no link                           paid with link        │
//! │        payment Pending → Cancelled            locate charge (platform,  │
//! │        refund not attempted                   then connected) ──► refund│
//! │                                                          │             │
//! │                                                          ▼             │
//! │                          reverse vendor accrual when the refund        │
//! │                          succeeded                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PayError, PayResult};
use crate::ledger::LedgerService;
use crate::notify::{restaurant_channel, table_channel, EventPublisher, OrderEvent};
use crate::provider::{ChargeProvider, ProviderError};
use crate::strategy::{locate_charge, lookup_plan};
use tabletap_core::validation::validate_reason;
use tabletap_core::{Order, PaymentStatus};
use tabletap_db::Database;

/// Who is asking for the cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Caller {
    /// The guest who placed the order (unauthenticated, table-scoped).
    Guest,
    /// Restaurant staff, scoped to their own restaurant.
    Staff { restaurant_id: String },
    /// Platform operators.
    SuperAdmin,
}

impl Caller {
    fn label(&self) -> &'static str {
        match self {
            Caller::Guest => "guest",
            Caller::Staff { .. } => "staff",
            Caller::SuperAdmin => "super_admin",
        }
    }
}

/// A cancellation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    pub order_id: String,
    pub reason: Option<String>,
    pub caller: Caller,
}

/// The refund leg of a cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct RefundOutcome {
    /// Whether a refund was attempted at all (false for unpaid orders).
    pub attempted: bool,
    /// Whether the money is back with the guest.
    pub success: bool,
    /// Provider refund id, when a new refund was created.
    pub refund_id: Option<String>,
    /// Failure reason, when attempted and unsuccessful.
    pub error: Option<String>,
}

impl RefundOutcome {
    fn not_attempted() -> Self {
        RefundOutcome {
            attempted: false,
            success: false,
            refund_id: None,
            error: None,
        }
    }

    fn succeeded(refund_id: Option<String>) -> Self {
        RefundOutcome {
            attempted: true,
            success: true,
            refund_id,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        RefundOutcome {
            attempted: true,
            success: false,
            refund_id: None,
            error: Some(error.into()),
        }
    }
}

/// Result of a cancellation. `cancelled` is always true on the Ok path;
/// callers distinguish the three shapes through `refund`.
#[derive(Debug, Clone, Serialize)]
pub struct CancellationOutcome {
    pub cancelled: bool,
    pub refund: RefundOutcome,
}

/// Cancellation service with injected provider and publisher capabilities.
#[derive(Debug, Clone)]
pub struct CancellationService<P, N> {
    db: Database,
    provider: P,
    publisher: N,
    ledger: LedgerService,
}

impl<P: ChargeProvider, N: EventPublisher> CancellationService<P, N> {
    pub fn new(db: Database, provider: P, publisher: N) -> Self {
        let ledger = LedgerService::new(db.clone());
        CancellationService {
            db,
            provider,
            publisher,
            ledger,
        }
    }

    /// Cancels an order, refunding its charge when one exists.
    ///
    /// At-most-once: the status claim is a conditional UPDATE, so concurrent
    /// requests for the same order produce exactly one refund attempt.
    pub async fn cancel_order(&self, request: CancelRequest) -> PayResult<CancellationOutcome> {
        if let Some(reason) = &request.reason {
            validate_reason(reason)?;
        }

        let orders = self.db.orders();
        let order = orders
            .get_by_id(&request.order_id)
            .await?
            .ok_or_else(|| PayError::not_found("Order", &request.order_id))?;

        // Terminal orders answer the same way for every caller; the soft
        // idempotency error wins over an authorization failure.
        if order.status.is_terminal() {
            return Err(PayError::AlreadyCancelled(order.id.clone()));
        }
        self.authorize(&request.caller, &order)?;

        if !orders.cancel_if_active(&order.id).await? {
            // Lost the claim to a concurrent cancellation or completion.
            return Err(PayError::AlreadyCancelled(order.id.clone()));
        }

        // The order is Cancelled from here on. Note and event are part of the
        // operational leg and must land even when the refund leg errors out.
        let note = match &request.reason {
            Some(reason) => format!("Cancelled by {}: {reason}", request.caller.label()),
            None => format!("Cancelled by {}", request.caller.label()),
        };
        orders.append_note(&order.id, &note).await?;

        let event = OrderEvent::OrderCancelled {
            order_id: order.id.clone(),
            reason: request.reason.clone(),
            cancelled_by: request.caller.label().to_string(),
        };
        self.publisher
            .publish(&restaurant_channel(&order.restaurant_id), &event)
            .await;
        if let Some(table_id) = &order.table_id {
            self.publisher.publish(&table_channel(table_id), &event).await;
        }

        let refund = self.refund_leg(&order, request.reason.as_deref()).await?;

        info!(
            order_id = %order.id,
            caller = request.caller.label(),
            refund_attempted = refund.attempted,
            refund_success = refund.success,
            "order cancelled"
        );

        Ok(CancellationOutcome {
            cancelled: true,
            refund,
        })
    }

    fn authorize(&self, caller: &Caller, order: &Order) -> PayResult<()> {
        match caller {
            Caller::SuperAdmin => Ok(()),
            Caller::Staff { restaurant_id } if *restaurant_id == order.restaurant_id => Ok(()),
            Caller::Staff { .. } => Err(PayError::Unauthorized(
                "staff may only cancel orders of their own restaurant".to_string(),
            )),
            Caller::Guest if order.guest_cancellable() => Ok(()),
            Caller::Guest => Err(PayError::Unauthorized(
                "guests may only cancel unpaid pending orders".to_string(),
            )),
        }
    }

    /// Runs the financial side of the cancellation.
    ///
    /// Provider failures come back inside the outcome, not as errors: the
    /// order is already cancelled and must stay that way. The only hard
    /// error is a charge that cannot be located anywhere with no connected
    /// account on file, which needs an operator.
    async fn refund_leg(&self, order: &Order, reason: Option<&str>) -> PayResult<RefundOutcome> {
        let link = self.db.payment_links().get_by_order(&order.id).await?;

        let link = match (order.payment_status, link) {
            (PaymentStatus::Paid, Some(link)) if !link.refunded => link,
            (PaymentStatus::Pending, _) => {
                self.db
                    .orders()
                    .set_payment_status(&order.id, PaymentStatus::Cancelled)
                    .await?;
                return Ok(RefundOutcome::not_attempted());
            }
            // Already refunded/cancelled payment, or paid in cash with no
            // charge link: nothing to move.
            _ => return Ok(RefundOutcome::not_attempted()),
        };

        let settings = self
            .db
            .settings()
            .get_or_create(&order.restaurant_id)
            .await?;
        let plan = lookup_plan(&link, &settings);

        let located = match locate_charge(&self.provider, &link.charge_ref, &plan).await {
            Ok(Some(located)) => located,
            Ok(None) => {
                if plan.len() == 1 {
                    // Charge missing from the platform scope and there is no
                    // connected scope to even try.
                    return Err(PayError::MissingPayoutAccount(order.id.clone()));
                }
                warn!(order_id = %order.id, charge_ref = %link.charge_ref,
                      "charge not found in any account scope");
                return Ok(RefundOutcome::failed(
                    "charge not found in any account scope",
                ));
            }
            Err(err) => {
                warn!(order_id = %order.id, %err, "charge lookup failed");
                return Ok(RefundOutcome::failed(err.to_string()));
            }
        };

        match self
            .provider
            .create_refund(&link.charge_ref, None, reason, &located.context)
            .await
        {
            Ok(refund) => {
                self.db.payment_links().mark_refunded(&link.id).await?;
                self.db
                    .orders()
                    .set_payment_status(&order.id, PaymentStatus::Refunded)
                    .await?;
                self.ledger
                    .reverse(
                        &order.restaurant_id,
                        link.amount_cents - link.platform_fee_cents,
                    )
                    .await?;
                Ok(RefundOutcome::succeeded(Some(refund.id)))
            }
            Err(ProviderError::AlreadyRefunded(_)) => {
                // The money is already back with the guest; record the state
                // without touching the ledger a second time.
                self.db.payment_links().mark_refunded(&link.id).await?;
                self.db
                    .orders()
                    .set_payment_status(&order.id, PaymentStatus::Refunded)
                    .await?;
                Ok(RefundOutcome::succeeded(None))
            }
            Err(err) => {
                warn!(order_id = %order.id, %err, "refund failed, payment stays paid");
                Ok(RefundOutcome::failed(err.to_string()))
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
