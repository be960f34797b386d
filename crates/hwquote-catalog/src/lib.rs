//! # hwquote-catalog: Data Layer for hwquote
//!
//! Reads the static JSON data file and serves code-keyed lookups over it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        hwquote Data Flow                                │
//! │                                                                         │
//! │  data/catalog.json                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  hwquote-catalog (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    loader     │    │    Catalog    │    │    error     │  │   │
//! │  │   │ strict /      │───►│ items         │    │ CatalogError │  │   │
//! │  │   │ lenient parse │    │ indexes       │    │              │  │   │
//! │  │   └───────────────┘    │ impl          │    └──────────────┘  │   │
//! │  │                        │  MasterData   │                      │   │
//! │  │                        └───────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  hwquote-core calculators ──► apps/hwquote renderers                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hwquote_catalog::{load_from_path, LoadMode};
//!
//! let catalog = load_from_path("data/catalog.json", LoadMode::Strict)?;
//! for row in catalog.quoted_items() {
//!     println!("{} {}", row.item.id, row.quote.quote_total);
//! }
//! # Ok::<(), hwquote_catalog::CatalogError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod loader;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{Catalog, DanglingReference, ReferenceKind, SkippedRecord};
pub use error::{CatalogError, CatalogResult};
pub use loader::{load_from_path, load_from_str, LoadMode};
