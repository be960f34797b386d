//! # Validation Module
//!
//! Input validation for quote parameters, quote sheet input and catalog
//! item ids.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Loader (hwquote-catalog)                                     │
//! │  ├── Shape validation (deserialization, required fields)               │
//! │  ├── Decimal range check of each item quote (reject or skip)           │
//! │  └── Duplicate id detection (warn, never reject)                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: CLI / HTTP arguments                                         │
//! │  ├── THIS MODULE: quantity, rates, shipping                            │
//! │  └── Rejected before any quoting runs                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Calculators (no validation)                                  │
//! │  └── Item quotes evaluate whatever the record holds                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hwquote_core::validation::validate_order_quantity;
//!
//! validate_order_quantity(500).unwrap();
//! ```

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{ItemRecord, Rate};
use crate::MAX_ORDER_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a finished-goods order quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed [`MAX_ORDER_QUANTITY`]
pub fn validate_order_quantity(qty: u64) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "qty".to_string(),
        });
    }

    if qty > MAX_ORDER_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "qty".to_string(),
            min: "1".to_string(),
            max: MAX_ORDER_QUANTITY.to_string(),
        });
    }

    Ok(())
}

/// Validates that a quote parameter rate lies in `[0, 1]`.
///
/// ## Example
/// ```rust
/// use hwquote_core::types::Rate;
/// use hwquote_core::validation::validate_rate;
///
/// assert!(validate_rate("tax_pct", Rate::from_bps(1300)).is_ok());
/// assert!(validate_rate("tax_pct", Rate::from_bps(10000)).is_ok());
/// assert!(validate_rate("tax_pct", Rate::from_bps(10001)).is_err());
/// ```
pub fn validate_rate(field: &str, rate: Rate) -> ValidationResult<()> {
    let ratio = rate.ratio();
    if ratio < Decimal::ZERO || ratio > Decimal::ONE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: "1".to_string(),
        });
    }

    Ok(())
}

/// Validates that an amount (e.g. order shipping) is not negative.
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Returns every item id that occurs more than once, in first-repeat order.
///
/// Duplicates are legal in a catalog; callers report them, they don't reject.
pub fn find_duplicate_ids(items: &[ItemRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for item in items {
        if !seen.insert(item.id.as_str()) && reported.insert(item.id.as_str()) {
            duplicates.push(item.id.clone());
        }
    }

    duplicates
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(id: &str) -> ItemRecord {
        ItemRecord {
            id: id.to_string(),
            name: "Hinge".to_string(),
            category: "Hinges".to_string(),
            material: "SUS304".to_string(),
            unit_material_cost: Money::from_decimal(dec!(1)),
            unit_labor_cost: Money::zero(),
            overhead_pct: Rate::zero(),
            profit_pct: Rate::zero(),
            tax_pct: Rate::zero(),
            quantity: 1,
        }
    }

    #[test]
    fn test_validate_order_quantity() {
        assert!(validate_order_quantity(1).is_ok());
        assert!(validate_order_quantity(MAX_ORDER_QUANTITY).is_ok());

        assert!(validate_order_quantity(0).is_err());
        assert!(validate_order_quantity(MAX_ORDER_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_rate_bounds_are_inclusive() {
        assert!(validate_rate("margin_pct", Rate::zero()).is_ok());
        assert!(validate_rate("margin_pct", Rate::from_ratio(dec!(1))).is_ok());
        assert!(validate_rate("margin_pct", Rate::from_ratio(dec!(-0.01))).is_err());
        assert!(validate_rate("margin_pct", Rate::from_ratio(dec!(1.01))).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("shipping", Money::zero()).is_ok());
        assert!(validate_non_negative("shipping", Money::from_cents(12000)).is_ok());
        assert!(validate_non_negative("shipping", Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_find_duplicate_ids() {
        let items = vec![item("A"), item("B"), item("A"), item("C"), item("A"), item("B")];
        assert_eq!(find_duplicate_ids(&items), vec!["A".to_string(), "B".to_string()]);
        assert!(find_duplicate_ids(&[item("A"), item("B")]).is_empty());
    }
}
