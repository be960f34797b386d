//! # Domain Types
//!
//! Core domain types for the item catalog quote.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────────────┐      compute_quote      ┌─────────────────────┐  │
//! │  │    ItemRecord     │ ──────────────────────► │  QuotedItemRecord   │  │
//! │  │  ───────────────  │                         │  ─────────────────  │  │
//! │  │  id, name         │                         │  item: ItemRecord   │  │
//! │  │  category         │                         │  quote: Breakdown   │  │
//! │  │  material         │                         │    material_total   │  │
//! │  │  unit costs       │                         │    labor_total      │  │
//! │  │  three rates      │                         │    overhead ...     │  │
//! │  │  quantity         │                         │    quote_total      │  │
//! │  └───────────────────┘                         └─────────────────────┘  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Rate       │   │  PricingMode    │   │  CatalogTotals  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  0.13 = 13%     │   │  GrossMargin    │   │  footer sums    │       │
//! │  │                 │   │  Markup         │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A ratio applied to an amount: overhead, profit, tax, waste, margin.
///
/// ## Representation
/// Stored as the plain ratio the data file uses: `0.13` means 13%.
/// Any value is representable, including negative rates and rates above 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    /// Creates a rate from a ratio (`0.13` = 13%).
    #[inline]
    pub const fn from_ratio(ratio: Decimal) -> Self {
        Rate(ratio)
    }

    /// Creates a rate from basis points (1300 = 13%).
    #[inline]
    pub fn from_bps(bps: u32) -> Self {
        Rate(Decimal::new(i64::from(bps), 4))
    }

    /// Returns the ratio.
    #[inline]
    pub const fn ratio(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a percentage (13 for 0.13).
    #[inline]
    pub fn percentage(&self) -> Decimal {
        self.0 * Decimal::ONE_HUNDRED
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(Decimal::ZERO)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

// =============================================================================
// Item Record
// =============================================================================

/// One catalog entry, before quoting.
///
/// ## Field Names
/// The serde names are the data file's column names, unchanged. Every
/// field is required: a record missing one fails to deserialize, which is
/// how the loader rejects malformed records.
///
/// ## Permissive Values
/// Costs may be negative and rates may fall outside `[0, 1)`. Neither is
/// checked; the calculator evaluates the formulas as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Catalog identifier. Expected to be unique, not enforced.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-form classification.
    pub category: String,

    /// Free-form material description.
    pub material: String,

    /// Material cost per item.
    pub unit_material_cost: Money,

    /// Labor cost per item.
    pub unit_labor_cost: Money,

    /// Overhead ratio applied to material + labor.
    pub overhead_pct: Rate,

    /// Profit ratio applied to the subtotal.
    pub profit_pct: Rate,

    /// Tax ratio applied to subtotal + profit.
    pub tax_pct: Rate,

    /// Number of items quoted.
    pub quantity: u64,
}

// =============================================================================
// Quote Breakdown
// =============================================================================

/// The seven derived fields of an item quote, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuoteBreakdown {
    pub material_total: Money,
    pub labor_total: Money,
    pub overhead: Money,
    pub subtotal: Money,
    pub profit: Money,
    pub tax: Money,
    pub quote_total: Money,
}

/// An item record together with its derived pricing fields.
///
/// Serializes flat: the ten input fields followed by the seven derived ones,
/// which is the row shape the renderers and the JSON API use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotedItemRecord {
    #[serde(flatten)]
    pub item: ItemRecord,

    #[serde(flatten)]
    pub quote: QuoteBreakdown,
}

// =============================================================================
// Catalog Totals
// =============================================================================

/// Footer sums over a quoted catalog.
///
/// Sums clamp at the type's maximum rather than overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogTotals {
    pub item_count: usize,
    pub total_quantity: u64,
    pub material_total: Money,
    pub labor_total: Money,
    pub subtotal: Money,
    pub tax: Money,
    pub quote_total: Money,
}

impl From<&[QuotedItemRecord]> for CatalogTotals {
    fn from(rows: &[QuotedItemRecord]) -> Self {
        rows.iter().fold(
            CatalogTotals {
                item_count: rows.len(),
                ..CatalogTotals::default()
            },
            |mut acc, row| {
                acc.total_quantity = acc.total_quantity.saturating_add(row.item.quantity);
                acc.material_total = acc.material_total.saturating_add(row.quote.material_total);
                acc.labor_total = acc.labor_total.saturating_add(row.quote.labor_total);
                acc.subtotal = acc.subtotal.saturating_add(row.quote.subtotal);
                acc.tax = acc.tax.saturating_add(row.quote.tax);
                acc.quote_total = acc.quote_total.saturating_add(row.quote.quote_total);
                acc
            },
        )
    }
}

// =============================================================================
// Pricing Mode
// =============================================================================

/// How the selling price is derived from the total cost of a BOM quote.
///
/// ```text
/// GrossMargin:  price = cost / (1 - margin)    margin is share of price
/// Markup:       price = cost × (1 + margin)    margin is share of cost
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    #[default]
    GrossMargin,
    Markup,
}

impl fmt::Display for PricingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingMode::GrossMargin => write!(f, "gross_margin"),
            PricingMode::Markup => write!(f, "markup"),
        }
    }
}

impl FromStr for PricingMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "gross_margin" | "margin" => Ok(PricingMode::GrossMargin),
            "markup" => Ok(PricingMode::Markup),
            _ => Err(ValidationError::NotAllowed {
                field: "pricing_mode".to_string(),
                allowed: vec!["gross_margin".to_string(), "markup".to_string()],
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_json() -> &'static str {
        r#"{
            "id": "BRK-001",
            "name": "L Bracket",
            "category": "Brackets",
            "material": "SPCC 1.5mm",
            "unit_material_cost": 10,
            "unit_labor_cost": 5,
            "overhead_pct": 0.1,
            "profit_pct": 0.2,
            "tax_pct": 0.13,
            "quantity": 2
        }"#
    }

    #[test]
    fn test_rate_constructors() {
        assert_eq!(Rate::from_bps(1300).ratio(), dec!(0.13));
        assert_eq!(Rate::from_ratio(dec!(0.0825)).percentage(), dec!(8.25));
        assert!(Rate::default().is_zero());
    }

    #[test]
    fn test_item_record_deserializes_from_data_file_shape() {
        let item: ItemRecord = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(item.id, "BRK-001");
        assert_eq!(item.unit_material_cost.amount(), dec!(10));
        assert_eq!(item.tax_pct.ratio(), dec!(0.13));
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_item_record_missing_field_is_rejected() {
        let json = r#"{ "id": "X", "name": "n", "category": "c", "material": "m",
                        "unit_material_cost": 1, "unit_labor_cost": 1,
                        "overhead_pct": 0, "profit_pct": 0, "quantity": 1 }"#;
        let err = serde_json::from_str::<ItemRecord>(json).unwrap_err();
        assert!(err.to_string().contains("tax_pct"));
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let json = sample_json().replace("\"quantity\": 2", "\"quantity\": -1");
        assert!(serde_json::from_str::<ItemRecord>(&json).is_err());
    }

    #[test]
    fn test_quoted_record_serializes_flat() {
        let item: ItemRecord = serde_json::from_str(sample_json()).unwrap();
        let quoted = QuotedItemRecord {
            item,
            quote: QuoteBreakdown::default(),
        };
        let value = serde_json::to_value(&quoted).unwrap();
        assert!(value.get("id").is_some());
        assert!(value.get("quote_total").is_some());
        assert!(value.get("item").is_none());
    }

    #[test]
    fn test_catalog_totals_clamp_at_the_decimal_range() {
        let mut item: ItemRecord = serde_json::from_str(sample_json()).unwrap();
        item.quantity = u64::MAX;
        let huge = Money::from_decimal(Decimal::MAX - dec!(1));
        let row = QuotedItemRecord {
            item,
            quote: QuoteBreakdown {
                material_total: huge,
                quote_total: huge,
                tax: Money::from_cents(100),
                ..QuoteBreakdown::default()
            },
        };
        let rows = vec![row.clone(), row];

        let totals = CatalogTotals::from(rows.as_slice());
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_quantity, u64::MAX);
        assert_eq!(totals.material_total.amount(), Decimal::MAX);
        assert_eq!(totals.quote_total.amount(), Decimal::MAX);
        assert_eq!(totals.tax, Money::from_cents(200));
    }

    #[test]
    fn test_pricing_mode_parsing() {
        assert_eq!("gross_margin".parse::<PricingMode>().unwrap(), PricingMode::GrossMargin);
        assert_eq!("gross-margin".parse::<PricingMode>().unwrap(), PricingMode::GrossMargin);
        assert_eq!("MARKUP".parse::<PricingMode>().unwrap(), PricingMode::Markup);
        assert!("discount".parse::<PricingMode>().is_err());
        assert_eq!(PricingMode::default(), PricingMode::GrossMargin);
        assert_eq!(PricingMode::Markup.to_string(), "markup");
    }
}
