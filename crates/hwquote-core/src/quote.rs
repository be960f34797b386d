//! # Item Quote Calculator
//!
//! Derives the seven pricing fields of an [`ItemRecord`].
//!
//! ## Formula Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Item Quote (evaluation order)                       │
//! │                                                                         │
//! │  material_total = unit_material_cost × quantity                        │
//! │  labor_total    = unit_labor_cost × quantity                           │
//! │  overhead       = (material_total + labor_total) × overhead_pct        │
//! │  subtotal       = material_total + labor_total + overhead              │
//! │  profit         = subtotal × profit_pct                                │
//! │  tax            = (subtotal + profit) × tax_pct                        │
//! │  quote_total    = subtotal + profit + tax                              │
//! │                                                                         │
//! │  Example: cost 10 + labor 5, qty 2, rates 0.1 / 0.2 / 0.13             │
//! │           20 + 10 → 3 → 33 → 6.6 → 5.148 → 44.748                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//! - Total: negative costs and out-of-range rates are evaluated as written.
//! - Pure: the input is consumed into the output, never mutated elsewhere.
//! - Exact: [`Money`] is decimal, so no step rounds.
//!
//! ## Magnitude
//! `Decimal` holds about 7.9e28. [`checked_breakdown`] reports a record whose
//! chain leaves that range, and the loader refuses such records.
//! [`compute_quote`] never panics: out of range steps saturate at the bound.

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{ItemRecord, QuoteBreakdown, QuotedItemRecord};

/// Computes the derived pricing fields of one item.
///
/// ## Example
/// ```rust
/// use hwquote_core::money::Money;
/// use hwquote_core::quote::compute_quote;
/// use hwquote_core::types::{ItemRecord, Rate};
///
/// let item = ItemRecord {
///     id: "BRK-001".into(),
///     name: "L Bracket".into(),
///     category: "Brackets".into(),
///     material: "SPCC".into(),
///     unit_material_cost: Money::from_cents(1000),
///     unit_labor_cost: Money::from_cents(500),
///     overhead_pct: Rate::from_bps(1000),
///     profit_pct: Rate::from_bps(2000),
///     tax_pct: Rate::from_bps(1300),
///     quantity: 2,
/// };
///
/// let quoted = compute_quote(item);
/// assert_eq!(quoted.quote.quote_total.to_string(), "44.748");
/// ```
pub fn compute_quote(item: ItemRecord) -> QuotedItemRecord {
    let quote = evaluate(&item, &SATURATING).unwrap_or_default();
    QuotedItemRecord { item, quote }
}

/// Computes quotes for a sequence of items, preserving order.
///
/// Each record is quoted independently of the others.
pub fn compute_quotes<I>(items: I) -> Vec<QuotedItemRecord>
where
    I: IntoIterator<Item = ItemRecord>,
{
    items.into_iter().map(compute_quote).collect()
}

/// Evaluates the formula chain, failing instead of leaving `Decimal`'s range.
///
/// Whenever this returns `Ok`, the breakdown equals what [`compute_quote`]
/// produces for the same record.
pub fn checked_breakdown(item: &ItemRecord) -> CoreResult<QuoteBreakdown> {
    evaluate(item, &CHECKED).ok_or_else(|| CoreError::AmountOverflow {
        id: item.id.clone(),
    })
}

struct Arithmetic {
    mul: fn(Decimal, Decimal) -> Option<Decimal>,
    add: fn(Decimal, Decimal) -> Option<Decimal>,
}

const CHECKED: Arithmetic = Arithmetic {
    mul: Decimal::checked_mul,
    add: Decimal::checked_add,
};

const SATURATING: Arithmetic = Arithmetic {
    mul: |a, b| Some(a.saturating_mul(b)),
    add: |a, b| Some(a.saturating_add(b)),
};

fn evaluate(item: &ItemRecord, ops: &Arithmetic) -> Option<QuoteBreakdown> {
    let mul = |m: Money, factor: Decimal| (ops.mul)(m.amount(), factor).map(Money::from_decimal);
    let add = |a: Money, b: Money| (ops.add)(a.amount(), b.amount()).map(Money::from_decimal);

    let quantity = Decimal::from(item.quantity);
    let material_total = mul(item.unit_material_cost, quantity)?;
    let labor_total = mul(item.unit_labor_cost, quantity)?;
    let direct = add(material_total, labor_total)?;
    let overhead = mul(direct, item.overhead_pct.ratio())?;
    let subtotal = add(direct, overhead)?;
    let profit = mul(subtotal, item.profit_pct.ratio())?;
    let taxable = add(subtotal, profit)?;
    let tax = mul(taxable, item.tax_pct.ratio())?;
    let quote_total = add(taxable, tax)?;

    Some(QuoteBreakdown {
        material_total,
        labor_total,
        overhead,
        subtotal,
        profit,
        tax,
        quote_total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
