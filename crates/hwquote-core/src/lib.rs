//! # hwquote-core: Pure Pricing Logic for hwquote
//!
//! This crate is the **heart** of hwquote. It contains every pricing rule as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        hwquote Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/hwquote (CLI + web renderer)               │   │
//! │  │    items table ──► product quote ──► quote sheet ──► export     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ hwquote-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   quote   │  │   money   │  │    bom    │  │quote_sheet│  │   │
//! │  │   │ ItemRecord│  │   Money   │  │  Product  │  │ QuoteLine │  │   │
//! │  │   │  7 fields │  │   Rate    │  │  sheets   │  │  totals   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                ▲                                        │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │              hwquote-catalog (Data Layer)                       │   │
//! │  │        JSON data file, lookup indexes, MasterData impl          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Item records, rates, pricing mode
//! - [`money`] - Exact decimal money
//! - [`quote`] - The item quote calculator
//! - [`master`] - Master data types and the [`MasterData`] lookup trait
//! - [`tiers`], [`process`], [`sheet`], [`bom`] - Product (BOM) quoting
//! - [`quote_sheet`] - Multi-line quote assembled from product quotes
//! - [`error`] - Domain error types
//! - [`validation`] - Parameter validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output
//! 2. **No I/O**: file system, network and logging live in the other crates
//! 3. **Decimal Money**: amounts are `rust_decimal::Decimal`, never floats
//! 4. **Explicit Errors**: errors are typed; item amounts past the decimal
//!    range clamp in [`compute_quote`] and are reported by [`quote::checked_breakdown`]
//!
//! ## Example Usage
//!
//! ```rust
//! use hwquote_core::{compute_quote, ItemRecord, Money, Rate};
//!
//! let quoted = compute_quote(ItemRecord {
//!     id: "BRK-001".into(),
//!     name: "L Bracket".into(),
//!     category: "Brackets".into(),
//!     material: "SPCC".into(),
//!     unit_material_cost: Money::from_cents(1000),
//!     unit_labor_cost: Money::from_cents(500),
//!     overhead_pct: Rate::from_bps(1000),
//!     profit_pct: Rate::from_bps(2000),
//!     tax_pct: Rate::from_bps(1300),
//!     quantity: 2,
//! });
//!
//! assert_eq!(quoted.quote.tax.to_string(), "5.148");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bom;
pub mod error;
pub mod master;
pub mod money;
pub mod process;
pub mod quote;
pub mod quote_sheet;
pub mod sheet;
pub mod tiers;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bom::{compute_product_quote, ProductQuote, QuoteParams, QuoteWarning};
pub use error::{CoreError, CoreResult, ValidationError};
pub use master::{MasterData, MasterDataSet, Product};
pub use money::{format_currency, Money};
pub use quote::{checked_breakdown, compute_quote, compute_quotes};
pub use quote_sheet::{QuoteHeader, QuoteLine, QuoteSheet, QuoteSheetTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines on one quote sheet.
pub const MAX_QUOTE_LINES: usize = 100;

/// Largest finished-goods quantity a product quote accepts.
pub const MAX_ORDER_QUANTITY: u64 = 1_000_000;
