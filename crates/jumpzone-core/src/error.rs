//! # Error Types
//!
//! Domain-specific error types for jumpzone-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  jumpzone-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  jumpzone-store errors (separate crate)                                │
//! │  └── StoreError       - Snapshot persistence failures                  │
//! │                                                                         │
//! │  jumpzone-advisory errors (separate crate)                             │
//! │  └── AdvisoryError    - Suggestion backend failures (always            │
//! │                         degraded to a fallback string, never fatal)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (guest id, session id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every error is recoverable: correct the input and call again.
//!    No operation leaves partial state behind on failure.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Guest cannot be found in the relevant collection.
    #[error("Guest not found: {0}")]
    GuestNotFound(String),

    /// Pending transaction cannot be found.
    ///
    /// ## When This Occurs
    /// - Deleting a transaction that was already checked out or deleted
    /// - Selecting a transaction id that is not in the pending pool
    ///
    /// Bulk operations (merge, bulk assignment) do NOT raise this; they
    /// skip unknown ids silently.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// An operation that needs an active transaction was called while none
    /// is selected.
    #[error("No active transaction selected")]
    NoActiveTransaction,

    /// A transaction failed its checkout preconditions.
    ///
    /// ## When This Occurs
    /// - A ticket/membership entry has no jumper assigned
    /// - An assigned guest's waiver has lapsed since assignment
    ///
    /// Waiver validity is re-evaluated at checkout time on purpose: a waiver
    /// can expire between assignment and payment.
    #[error("Transaction {transaction_id} is not ready for checkout: {reason}")]
    CheckoutIneligible {
        transaction_id: String,
        reason: String,
    },

    /// Cart has exceeded maximum allowed entries.
    #[error("Cart cannot have more than {max} entries")]
    CartFull { max: usize },

    /// The cash drawer session is already closed.
    #[error("Cash drawer session {session_id} is already closed")]
    SessionClosed { session_id: String },

    /// The acting user is not allowed to perform the operation.
    ///
    /// ## When This Occurs
    /// - Closing a drawer session opened by someone else without the
    ///   close-any-session permission
    ///
    /// The session remains OPEN after this error.
    #[error("User {user} lacks permission '{permission}'")]
    PermissionDenied { user: String, permission: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-numeric phone).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A deposit larger than the cash the drawer should contain.
    ///
    /// Amounts are paise. The deposit is rejected outright; nothing is
    /// appended to the session.
    #[error("Deposit of {requested_paise} paise exceeds expected cash in drawer ({expected_paise} paise)")]
    DepositExceedsExpected {
        requested_paise: i64,
        expected_paise: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::PermissionDenied {
            user: "3333".to_string(),
            permission: "feature:cashdrawer:close_any_session".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "User 3333 lacks permission 'feature:cashdrawer:close_any_session'"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "deposit amount".to_string(),
        };
        assert_eq!(err.to_string(), "deposit amount must be positive");

        let err = ValidationError::DepositExceedsExpected {
            requested_paise: 235_001,
            expected_paise: 235_000,
        };
        assert!(err.to_string().contains("exceeds expected cash"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "opening balance".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
