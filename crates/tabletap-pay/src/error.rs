//! # Payment Service Error Types
//!
//! ## Error Flow
//! ```text
//! ValidationError ─┐
//! DbError ─────────┼──► PayError ──► HTTP adapter (status via http_status())
//! ProviderError ───┘
//! ```
//!
//! Refund failures are deliberately NOT in this taxonomy: the reconciler
//! finishes the cancellation and reports the refund leg inside the outcome,
//! so a declined refund is data, not an error.

use thiserror::Error;

use tabletap_core::ValidationError;
use tabletap_db::DbError;

/// Payment service errors.
#[derive(Debug, Error)]
pub enum PayError {
    /// Invalid input rejected before any side effect.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The order is already cancelled or otherwise past cancellation.
    #[error("order {0} can no longer be cancelled")]
    AlreadyCancelled(String),

    /// The caller may not perform this operation on this order.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// Provider rejected or failed the operation.
    #[error("provider error: {0}")]
    Provider(String),

    /// The charge could not be located and the restaurant has no connected
    /// account on file. Needs manual remediation; kept distinct from
    /// ordinary refund failures so operators can route it.
    #[error("charge not found and no payout account on file for order {0}")]
    MissingPayoutAccount(String),

    /// Payout request exceeds the available balance (or the balance is zero).
    #[error("insufficient balance: requested {requested_cents}, available {available_cents}")]
    InsufficientBalance {
        requested_cents: i64,
        available_cents: i64,
    },

    /// Database failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl PayError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        PayError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// HTTP status the outer API layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            PayError::Validation(_) => 400,
            // Soft idempotency error, reported like any other bad request.
            PayError::AlreadyCancelled(_) => 400,
            PayError::Unauthorized(_) => 403,
            PayError::NotFound { .. } => 404,
            PayError::MissingPayoutAccount(_) => 422,
            PayError::InsufficientBalance { .. } => 422,
            PayError::Provider(_) => 502,
            PayError::Db(_) => 500,
        }
    }
}

/// Result type for payment service operations.
pub type PayResult<T> = Result<T, PayError>;
