//! # Error Types
//!
//! Domain-specific error types for tabletap-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tabletap-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  tabletap-db errors    └── DbError    - Storage failures                │
//! │  tabletap-pay errors   └── PayError   - Provider/reconciliation failures│
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError/PayError → caller          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Context in every message (order id, field, status)
//! 3. Errors are enum variants, never bare Strings
//! 4. Financial computations return a result or a ValidationError - no
//!    partial results, no silent clamping

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations in the financial core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An order status change the state machine forbids.
    ///
    /// ## When This Occurs
    /// - Cancelling an already-terminal order
    /// - Skipping ahead in the fulfilment chain
    #[error("illegal order status transition: {from} -> {to}")]
    IllegalStatusTransition { from: String, to: String },

    /// A payment status change the state machine forbids.
    ///
    /// ## When This Occurs
    /// - Refunding an order that was never paid
    /// - Cancelling an already-paid payment (paid orders refund instead)
    #[error("illegal payment status transition: {from} -> {to}")]
    IllegalPaymentTransition { from: String, to: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Malformed input, rejected before any computation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A monetary amount that must not be negative.
    #[error("{field} must not be negative, got {cents} cents")]
    NegativeAmount { field: String, cents: i64 },

    /// A rate outside [0, 10000] basis points.
    #[error("{field} must be between 0 and 10000 bps, got {bps}")]
    RateOutOfRange { field: String, bps: u32 },

    /// Numeric value out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Fee threshold window where min > max - an impossible combination.
    #[error("fee '{name}': min_order_cents {min} exceeds max_order_cents {max}")]
    ThresholdInverted { name: String, min: i64, max: i64 },

    /// Invalid format (e.g. malformed UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Text field exceeds its length bound.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
