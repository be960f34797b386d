//! # Renderers
//!
//! Read-only views over calculator output. Nothing here feeds back into
//! the core.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Vec<QuotedItemRecord> ─┬──► table::items_table   (terminal)           │
//! │  + CatalogTotals        ├──► html::items_page     (browser)            │
//! │                         └──► ItemsReport          (JSON)               │
//! │                                                                         │
//! │  ProductQuote ──────────┬──► table::bom_table / process_table / ...    │
//! │                         └──► html::product_quote_page                  │
//! │                                                                         │
//! │  QuoteSheet ────────────────► html::quote_sheet_page                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod html;
pub mod table;

use clap::ValueEnum;
use hwquote_catalog::Catalog;
use hwquote_core::{CatalogTotals, QuotedItemRecord};
use serde::Serialize;

/// Output format of the `items` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Terminal table
    #[default]
    Table,
    /// Quoted items and totals as JSON
    Json,
    /// Self-contained HTML page
    Html,
}

/// Quoted items plus their footer totals.
#[derive(Debug, Clone, Serialize)]
pub struct ItemsReport {
    pub items: Vec<QuotedItemRecord>,
    pub totals: CatalogTotals,
}

impl From<&Catalog> for ItemsReport {
    fn from(catalog: &Catalog) -> Self {
        let (items, totals) = catalog.quoted_items_with_totals();
        ItemsReport { items, totals }
    }
}

/// Renders the items report in `format`.
pub fn render_items(report: &ItemsReport, format: OutputFormat, currency: &str) -> serde_json::Result<String> {
    match format {
        OutputFormat::Table => Ok(table::items_table(report, currency).to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(report),
        OutputFormat::Html => Ok(html::items_page(report, currency)),
    }
}
