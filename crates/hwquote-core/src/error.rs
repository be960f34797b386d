//! # Error Types
//!
//! Domain-specific error types for hwquote-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hwquote-core errors (this file)                                       │
//! │  ├── CoreError        - Quoting and quote sheet failures               │
//! │  └── ValidationError  - Quote parameter validation failures            │
//! │                                                                         │
//! │  hwquote-catalog errors (separate crate)                               │
//! │  └── CatalogError     - Data file loading and lookup failures          │
//! │                                                                         │
//! │  App errors                                                            │
//! │  └── AppError         - What the CLI and HTTP clients see              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → JSON body / stderr     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, line number, field)
//! 3. Errors are enum variants, never String
//! 4. The item calculator never fails; its range check is a separate function

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An item's quote leaves the representable decimal range.
    ///
    /// ## When This Occurs
    /// - The loader checks an item record such as cost 1e10 × quantity 1.8e19
    #[error("Amounts of item {id} exceed the supported range")]
    AmountOverflow { id: String },

    /// Quote sheet line cannot be found.
    #[error("Quote line not found: {0}")]
    QuoteLineNotFound(String),

    /// Quote sheet has reached its line limit.
    ///
    /// ## User Workflow
    /// ```text
    /// Add line (sheet already has 100)
    ///      │
    ///      ▼
    /// QuoteSheetFull { max: 100 }
    ///      │
    ///      ▼
    /// Client shows: "Quote sheet cannot have more than 100 lines"
    /// ```
    #[error("Quote sheet cannot have more than {max} lines")]
    QuoteSheetFull { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when quote parameters don't meet requirements.
/// Item records are never validated this way; only BOM quote parameters,
/// quote sheet input and CLI/HTTP arguments are.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed sheet override).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
