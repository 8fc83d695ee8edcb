//! # tabletap-pay: Payment Services for TableTap
//!
//! The async seam of the platform: everything that talks to the outside
//! world on behalf of the money core lives here, behind capability traits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     tabletap-pay (THIS CRATE)                           │
//! │                                                                         │
//! │   ┌──────────────────┐       ┌──────────────────┐                      │
//! │   │ CancellationSvc  │       │  LedgerService   │                      │
//! │   │ (reconciler.rs)  │       │   (ledger.rs)    │                      │
//! │   │                  │       │                  │                      │
//! │   │ claim ► refund ► │       │ accrue ► settle  │                      │
//! │   │ notes ► events   │       │ ► payout         │                      │
//! │   └───┬──────────┬───┘       └────────┬─────────┘                      │
//! │       │          │                    │                                │
//! │       ▼          ▼                    ▼                                │
//! │  ChargeProvider  EventPublisher   tabletap-db                          │
//! │  (provider.rs)   (notify.rs)      (repositories)                       │
//! │       │                                                                │
//! │       ▼                                                                │
//! │  StripeClient (stripe.rs, REST + reqwest, no SDK)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`provider`] - Charge provider capability trait and account topology
//! - [`stripe`] - Stripe REST client
//! - [`strategy`] - Ordered charge lookup across account scopes
//! - [`reconciler`] - Refund/cancellation reconciliation
//! - [`ledger`] - Vendor balance and payout ledger
//! - [`notify`] - Realtime event publisher capability
//! - [`error`] - Service error taxonomy
//!
//! ## Design Principles
//!
//! 1. **Injected capabilities**: no global clients; every external
//!    dependency enters through a constructor
//! 2. **Decoupled legs**: operational cancellation succeeds even when the
//!    financial refund fails; the outcome reports both
//! 3. **At-most-once money moves**: every racy mutation is a conditional
//!    database write, decided by `rows_affected`

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod notify;
pub mod provider;
pub mod reconciler;
pub mod strategy;
pub mod stripe;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{PayError, PayResult};
pub use ledger::{LedgerService, PayoutResult};
pub use notify::{EventPublisher, OrderEvent, TracingPublisher};
pub use provider::{AccountContext, ChargeProvider, ChargeState, ProviderError, Refund};
pub use reconciler::{
    CancelRequest, CancellationOutcome, CancellationService, Caller, RefundOutcome,
};
pub use strategy::{locate_charge, lookup_plan, LocatedCharge};
pub use stripe::StripeClient;
