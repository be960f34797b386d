//! # Server State
//!
//! Shared state behind the axum router.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────────┐  ┌─────────────────┐   │
//! │  │  Arc<Catalog>    │  │  QuoteSheetState     │  │  Arc<AppConfig> │   │
//! │  │                  │  │                      │  │                 │   │
//! │  │  read-only after │  │  Arc<Mutex<          │  │  read-only      │   │
//! │  │  start-up        │  │    QuoteSheet>>      │  │                 │   │
//! │  └──────────────────┘  └──────────────────────┘  └─────────────────┘   │
//! │                                                                         │
//! │  Every handler clones AppState (cheap Arc clones). Only quote sheet     │
//! │  handlers take the lock, and never across an await.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use hwquote_catalog::Catalog;
use hwquote_core::{MasterData, QuoteHeader, QuoteSheet};

use crate::config::AppConfig;

/// The in-memory quote sheet, shared by all requests.
#[derive(Debug, Clone)]
pub struct QuoteSheetState {
    sheet: Arc<Mutex<QuoteSheet>>,
    /// Header a cleared sheet starts over with.
    header: QuoteHeader,
}

impl QuoteSheetState {
    pub fn new(header: QuoteHeader) -> Self {
        QuoteSheetState {
            sheet: Arc::new(Mutex::new(QuoteSheet::new(header.clone()))),
            header,
        }
    }

    /// Executes a function with read access to the sheet.
    pub fn with_sheet<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&QuoteSheet) -> R,
    {
        let sheet = self.sheet.lock().expect("Quote sheet mutex poisoned");
        f(&sheet)
    }

    /// Executes a function with write access to the sheet.
    pub fn with_sheet_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut QuoteSheet) -> R,
    {
        let mut sheet = self.sheet.lock().expect("Quote sheet mutex poisoned");
        f(&mut sheet)
    }

    /// Drops every line and restores the configured header.
    pub fn reset(&self) {
        self.with_sheet_mut(|sheet| {
            sheet.clear();
            sheet.header = self.header.clone();
        });
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub quote_sheet: QuoteSheetState,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(catalog: Catalog, config: AppConfig) -> Self {
        let header = config.quote.header(&catalog.settings().currency);
        AppState {
            catalog: Arc::new(catalog),
            quote_sheet: QuoteSheetState::new(header),
            config: Arc::new(config),
        }
    }

    /// Currency amounts are shown in: the config override, else the data file's.
    pub fn currency(&self) -> &str {
        self.config
            .quote
            .currency
            .as_deref()
            .unwrap_or(&self.catalog.settings().currency)
    }
}
