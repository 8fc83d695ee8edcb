//! # Validation Module
//!
//! Write-boundary validation for TableTap configuration and checkout input.
//!
//! ## Validation Strategy
//! Configuration (fees, settings) is validated when the dashboard writes it,
//! never at read time in the hot computation path. Checkout input (amounts,
//! tips) is validated once at the edge of the engine; the pure computation
//! functions can then assume well-formed input and stay branch-light.
//!
//! ## Usage
//! ```rust
//! use tabletap_core::validation::{validate_amount_cents, validate_rate_bps};
//!
//! validate_amount_cents("subtotal", 5000).unwrap();
//! validate_rate_bps("tax_rate", 1900).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{CustomFee, FeeKind};
use crate::MAX_REASON_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates a monetary amount that must not be negative.
///
/// Zero is allowed: free orders and zero tips are legal.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::NegativeAmount {
            field: field.to_string(),
            cents,
        });
    }

    Ok(())
}

/// Validates a rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
/// - Tax rates and platform fees above 100% are always configuration errors
pub fn validate_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::RateOutOfRange {
            field: field.to_string(),
            bps,
        });
    }

    Ok(())
}

// =============================================================================
// Fee Configuration Validator
// =============================================================================

/// Validates a custom fee at the settings-write boundary.
///
/// ## Rules
/// - Name must not be empty
/// - Value must not be negative (zero is legal: produces a zero-amount line)
/// - Percent values are capped at 10000 bps (100% of the subtotal)
/// - min_order_cents / max_order_cents must not be negative
/// - min > max is an impossible window and is rejected, not clamped
pub fn validate_custom_fee(fee: &CustomFee) -> ValidationResult<()> {
    if fee.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "fee name".to_string(),
        });
    }

    if fee.value < 0 {
        return Err(ValidationError::NegativeAmount {
            field: format!("fee '{}' value", fee.name),
            cents: fee.value,
        });
    }

    if fee.kind == FeeKind::Percent && fee.value > 10000 {
        return Err(ValidationError::OutOfRange {
            field: format!("fee '{}' percent value", fee.name),
            min: 0,
            max: 10000,
        });
    }

    if let Some(min) = fee.min_order_cents {
        validate_amount_cents("min_order_cents", min)?;
    }
    if let Some(max) = fee.max_order_cents {
        validate_amount_cents("max_order_cents", max)?;
    }

    if let (Some(min), Some(max)) = (fee.min_order_cents, fee.max_order_cents) {
        if min > max {
            return Err(ValidationError::ThresholdInverted {
                name: fee.name.clone(),
                min,
                max,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Text Validators
// =============================================================================

/// Validates a cancellation reason.
///
/// Reasons are appended to order notes and forwarded in realtime events;
/// they are bounded so a single cancellation cannot bloat either.
pub fn validate_reason(reason: &str) -> ValidationResult<()> {
    if reason.len() > MAX_REASON_LEN {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: MAX_REASON_LEN,
        });
    }

    Ok(())
}

/// Validates a UUID string format.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
