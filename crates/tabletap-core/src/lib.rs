//! # tabletap-core: Pure Business Logic for TableTap
//!
//! The financial heart of the TableTap restaurant ordering platform. All
//! money math lives here as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       TableTap Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Guest UI / Dashboard (Next.js)                     │   │
//! │  │    QR scan ──► Menu ──► Checkout ──► Pay ──► Track              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ tabletap-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   fees    │  │ tax/totals│  │   split   │  │   │
//! │  │   │ Money/Rate│  │ fee rules │  │ composer  │  │ platform/ │  │   │
//! │  │   │           │  │           │  │           │  │ vendor cut│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   tabletap-db (SQLite)        tabletap-pay (providers, ledger)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money and Rate types with integer arithmetic (no floats!)
//! - [`types`] - Domain types and the two status state machines
//! - [`fees`] - Fee rule engine
//! - [`tax`] - Two-mode tax calculator
//! - [`totals`] - Order total composer
//! - [`split`] - Platform/vendor charge split
//! - [`validation`] - Write-boundary validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output, every time
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64), all rates are
//!    basis points (u32)
//! 4. **Explicit Errors**: typed errors, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fees;
pub mod money;
pub mod split;
pub mod tax;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Rate};
pub use split::{split_charge, ChargeSplit};
pub use totals::{compose_total, price_order, OrderTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tax rate applied when a restaurant has not configured one.
///
/// 1900 bps = 19%, the standard VAT rate in the platform's home market.
/// Lazily-created RestaurantSettings rows start with this value.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1900;

/// Default platform revenue share for new restaurants (250 bps = 2.5%).
pub const DEFAULT_PLATFORM_FEE_BPS: u32 = 250;

/// Default settlement currency for new restaurants.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Maximum length of a cancellation reason.
///
/// Reasons are appended to order notes and carried in realtime events;
/// bounded so a single request cannot bloat either.
pub const MAX_REASON_LEN: usize = 500;
