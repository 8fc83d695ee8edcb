//! # Charge Provider Capability
//!
//! The seam between TableTap and payment providers. Services depend on the
//! [`ChargeProvider`] trait, never on a concrete client, so the reconciler
//! is testable with a fake and a second provider can be added without
//! touching service code.
//!
//! ## Account Topology
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Platform account          charges created by the platform itself       │
//! │       │                    (application-fee topology)                   │
//! │       │                                                                 │
//! │  Connected account         charges created directly on the              │
//! │       │                    restaurant's own provider account            │
//! │       ▼                    (Direct Charges; needs Stripe-Account)       │
//! │                                                                         │
//! │  A charge exists in exactly ONE of these scopes. Looking it up in the  │
//! │  wrong scope yields a resource-missing error, not a transport error.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Which provider account scope an operation runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountContext {
    /// The platform's own account.
    Platform,
    /// A restaurant's connected account (Direct Charge topology).
    Connected(String),
}

impl AccountContext {
    /// Connected account id to send in the `Stripe-Account` header, if any.
    pub fn connected_account(&self) -> Option<&str> {
        match self {
            AccountContext::Platform => None,
            AccountContext::Connected(id) => Some(id),
        }
    }
}

impl std::fmt::Display for AccountContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountContext::Platform => write!(f, "platform"),
            AccountContext::Connected(id) => write!(f, "connected:{id}"),
        }
    }
}

/// Provider-side view of a charge.
#[derive(Debug, Clone)]
pub struct ChargeState {
    pub charge_ref: String,
    pub amount_cents: i64,
    pub currency: String,
    pub refunded: bool,
}

/// A refund created at the provider.
#[derive(Debug, Clone)]
pub struct Refund {
    pub id: String,
    pub charge_ref: String,
    pub amount_cents: i64,
}

/// Provider operation errors.
///
/// `NotFound` is the only non-fatal class: it drives the topology fallback
/// (the charge may live in the other account scope). Everything else ends
/// the attempt.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Resource missing in this account scope.
    #[error("charge not found: {0}")]
    NotFound(String),

    /// The charge was already fully refunded. Treated as success by the
    /// reconciler: the money is where the guest expects it.
    #[error("charge already refunded: {0}")]
    AlreadyRefunded(String),

    /// The provider refused the operation.
    #[error("refund declined: {0}")]
    Declined(String),

    /// Network or protocol failure before a provider answer.
    #[error("provider transport error: {0}")]
    Transport(String),
}

/// Async capability for charge lookup and refund creation.
#[async_trait]
pub trait ChargeProvider: Send + Sync {
    /// Retrieves the current state of a charge in the given account scope.
    async fn retrieve_charge(
        &self,
        charge_ref: &str,
        ctx: &AccountContext,
    ) -> Result<ChargeState, ProviderError>;

    /// Creates a refund for a charge. `amount_cents` of `None` refunds the
    /// full captured amount.
    async fn create_refund(
        &self,
        charge_ref: &str,
        amount_cents: Option<i64>,
        reason: Option<&str>,
        ctx: &AccountContext,
    ) -> Result<Refund, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_context_header_value() {
        assert_eq!(AccountContext::Platform.connected_account(), None);
        assert_eq!(
            AccountContext::Connected("acct_123".to_string()).connected_account(),
            Some("acct_123")
        );
    }

    #[test]
    fn test_account_context_display() {
        assert_eq!(AccountContext::Platform.to_string(), "platform");
        assert_eq!(
            AccountContext::Connected("acct_123".to_string()).to_string(),
            "connected:acct_123"
        );
    }
}
