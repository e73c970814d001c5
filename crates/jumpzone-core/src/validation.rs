//! # Validation Module
//!
//! Input validation utilities for JumpZone POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                     │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  ├── Amounts, discounts, names, phones                                 │
//! │  └── Called by the engine before any state changes                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: The operations themselves                                    │
//! │  └── Contextual checks (deposit vs expected cash, permissions)         │
//! │                                                                         │
//! │  Defense in depth: no operation mutates state after a failed check     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::Discount;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum guest name length.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum phone number length.
pub const MAX_PHONE_LEN: usize = 20;

/// Maximum counter search query length.
pub const MAX_QUERY_LEN: usize = 100;

/// Maximum free-text note length (deposit notes, discrepancy reasons).
pub const MAX_NOTE_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a guest name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 200 characters
pub fn validate_guest_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a contact phone number.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 20 characters
/// - Digits only; formatting characters are the frontend's concern
///
/// ## Example
/// ```rust
/// use jumpzone_core::validation::validate_phone;
///
/// assert!(validate_phone("9876543210").is_ok());
/// assert!(validate_phone("").is_err());
/// assert!(validate_phone("98-76").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() > MAX_PHONE_LEN {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: MAX_PHONE_LEN,
        });
    }

    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a counter search query.
///
/// ## Rules
/// - Can be empty (no-op search)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates an optional free-text note.
pub fn validate_note(note: &str) -> ValidationResult<()> {
    if note.len() > MAX_NOTE_LEN {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a non-negative amount in paise (prices, balances).
///
/// Zero is allowed: a drawer can legitimately open empty, and gift tickets
/// are free.
pub fn validate_amount_paise(field: &str, paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a strictly positive amount in paise (deposits, payments).
pub fn validate_positive_amount_paise(field: &str, paise: i64) -> ValidationResult<()> {
    if paise <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a discount configuration.
///
/// ## Rules
/// - Percentage discounts must not exceed 10000 bps (100%)
/// - Fixed discounts must be non-negative
///
/// A fixed discount larger than the eventual subtotal is fine; billing
/// clamps the effective amount.
pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    match discount {
        Discount::Percentage { bps } => {
            if *bps > 10_000 {
                return Err(ValidationError::OutOfRange {
                    field: "discount percentage".to_string(),
                    min: 0,
                    max: 10_000,
                });
            }
        }
        Discount::Fixed { amount_paise } => {
            validate_amount_paise("discount amount", *amount_paise)?;
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_guest_name() {
        assert!(validate_guest_name("Priya Patel").is_ok());
        assert!(validate_guest_name("").is_err());
        assert!(validate_guest_name("   ").is_err());
        assert!(validate_guest_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("98 76").is_err());
        assert!(validate_phone("+919876543210").is_err());
        assert!(validate_phone(&"9".repeat(30)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  anjali ").unwrap(), "anjali");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"x".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_amount_paise("price", 0).is_ok());
        assert!(validate_amount_paise("price", 50_000).is_ok());
        assert!(validate_amount_paise("price", -1).is_err());

        assert!(validate_positive_amount_paise("deposit amount", 100).is_ok());
        assert!(validate_positive_amount_paise("deposit amount", 0).is_err());
        assert!(validate_positive_amount_paise("deposit amount", -5).is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(&Discount::Percentage { bps: 1000 }).is_ok());
        assert!(validate_discount(&Discount::Percentage { bps: 10_000 }).is_ok());
        assert!(validate_discount(&Discount::Percentage { bps: 10_001 }).is_err());
        assert!(validate_discount(&Discount::Fixed { amount_paise: 500_000 }).is_ok());
        assert!(validate_discount(&Discount::Fixed { amount_paise: -1 }).is_err());
    }

    #[test]
    fn test_validate_note() {
        assert!(validate_note("mid-day safe drop").is_ok());
        assert!(validate_note(&"n".repeat(600)).is_err());
    }
}
