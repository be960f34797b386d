//! # Quote Sheet
//!
//! A multi-line customer quote assembled from product quotes.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Quote Sheet Operations                               │
//! │                                                                         │
//! │  Action                    Method                 State Change          │
//! │  ──────                    ──────                 ────────────          │
//! │                                                                         │
//! │  Add product quote ──────► add_line() ─────────► lines.push(line)      │
//! │                                                                         │
//! │  Remove line ────────────► remove_line() ──────► lines.retain(..)      │
//! │                                                                         │
//! │  Start over ─────────────► clear() ────────────► lines, header reset   │
//! │                                                                         │
//! │  Show totals ────────────► QuoteSheetTotals::from(&sheet)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are frozen snapshots: re-pricing the product later does not touch a
//! line already on the sheet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bom::ProductQuote;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Rate;
use crate::MAX_QUOTE_LINES;

/// Who the quote is for and in which currency.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuoteHeader {
    pub quote_no: String,
    pub customer: String,
    pub currency: String,
}

/// One priced product on the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    /// Stable identity.
    pub id: Uuid,

    /// Display number, 1-based. Never reused while the line exists.
    pub line_id: u32,

    pub sku: String,
    pub product_name: String,
    pub qty: u64,
    pub unit_price: Money,
    pub line_total: Money,
    pub cost_total: Money,
    pub margin_pct: Rate,
    pub tax_pct: Rate,
    pub overhead_pct: Rate,
    pub scrap_rate: Rate,
    pub process_summary: String,
    pub process_cost: Money,
    pub material_cost: Money,
    pub packaging_cost: Money,
    pub added_at: DateTime<Utc>,
}

impl QuoteLine {
    /// Freezes a product quote into a line.
    pub fn from_quote(line_id: u32, quote: &ProductQuote) -> Self {
        QuoteLine {
            id: Uuid::new_v4(),
            line_id,
            sku: quote.sku.clone(),
            product_name: quote.product_name.clone(),
            qty: quote.params.qty,
            unit_price: quote.summary.unit_price,
            line_total: quote.summary.final_price_total,
            cost_total: quote.summary.total_cost,
            margin_pct: quote.params.margin_pct,
            tax_pct: quote.params.tax_pct,
            overhead_pct: quote.params.overhead_pct,
            scrap_rate: quote.params.scrap_rate,
            process_summary: "BOM".to_string(),
            process_cost: quote.summary.process_total,
            material_cost: quote.summary.material_total,
            packaging_cost: quote.summary.packaging_total,
            added_at: Utc::now(),
        }
    }
}

/// The in-memory quote sheet.
///
/// ## Invariants
/// - At most [`MAX_QUOTE_LINES`] lines
/// - `line_id`s are unique: a new line takes the highest existing number + 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSheet {
    pub header: QuoteHeader,
    pub lines: Vec<QuoteLine>,
    pub order_shipping: Money,
    pub created_at: DateTime<Utc>,
}

impl QuoteSheet {
    /// Creates an empty sheet.
    pub fn new(header: QuoteHeader) -> Self {
        QuoteSheet {
            header,
            lines: Vec::new(),
            order_shipping: Money::zero(),
            created_at: Utc::now(),
        }
    }

    /// Appends a product quote and returns the new line.
    ///
    /// The order shipping of the sheet becomes the quote's shipping, the
    /// same amount the product quote already carries in its subtotal.
    pub fn add_line(&mut self, quote: &ProductQuote) -> CoreResult<&QuoteLine> {
        if self.lines.len() >= MAX_QUOTE_LINES {
            return Err(CoreError::QuoteSheetFull {
                max: MAX_QUOTE_LINES,
            });
        }

        let line_id = self.lines.iter().map(|l| l.line_id).max().unwrap_or(0) + 1;
        self.order_shipping = quote.params.shipping_per_order;
        self.lines.push(QuoteLine::from_quote(line_id, quote));

        let index = self.lines.len() - 1;
        Ok(&self.lines[index])
    }

    /// Removes a line by its display number.
    pub fn remove_line(&mut self, line_id: u32) -> CoreResult<QuoteLine> {
        let index = self
            .lines
            .iter()
            .position(|l| l.line_id == line_id)
            .ok_or_else(|| CoreError::QuoteLineNotFound(line_id.to_string()))?;
        Ok(self.lines.remove(index))
    }

    /// Clears lines, header and shipping.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.header = QuoteHeader::default();
        self.order_shipping = Money::zero();
        self.created_at = Utc::now();
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line totals, before order shipping.
    pub fn lines_subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.line_total).sum()
    }

    pub fn final_total(&self) -> Money {
        self.lines_subtotal() + self.order_shipping
    }
}

impl Default for QuoteSheet {
    fn default() -> Self {
        Self::new(QuoteHeader::default())
    }
}

/// Quote sheet totals for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSheetTotals {
    pub line_count: usize,
    pub total_qty: u64,
    pub lines_subtotal: Money,
    pub order_shipping: Money,
    pub final_total: Money,
}

impl From<&QuoteSheet> for QuoteSheetTotals {
    fn from(sheet: &QuoteSheet) -> Self {
        QuoteSheetTotals {
            line_count: sheet.line_count(),
            total_qty: sheet.lines.iter().map(|l| l.qty).sum(),
            lines_subtotal: sheet.lines_subtotal(),
            order_shipping: sheet.order_shipping,
            final_total: sheet.final_total(),
        }
    }
}
