//! # Data File Loader
//!
//! Reads the static JSON data file into a [`Catalog`].
//!
//! ## Accepted Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  [ {item}, {item}, ... ]            item list only, no master data      │
//! │                                                                         │
//! │  {                                  full data file                      │
//! │    "settings": {...},               every section optional              │
//! │    "materials": [...],                                                  │
//! │    "processes": [...],                                                  │
//! │    "quantity_tiers": [...],                                             │
//! │    "parts": [...],                                                      │
//! │    "purchased_items": [...],                                            │
//! │    "packaging_rules": {...},                                            │
//! │    "products": [...],                                                   │
//! │    "items": [ {item}, ... ]                                             │
//! │  }                                                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Load Modes
//! Item records are parsed one at a time so a defect can be pinned to its
//! position. In [`LoadMode::Strict`] the first malformed record fails the
//! load; in [`LoadMode::Lenient`] it is logged, recorded and skipped.
//! A record whose quote would leave the decimal range counts as malformed.
//! Master data sections are always strict.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use hwquote_core::master::MasterDataSet;
use hwquote_core::{checked_breakdown, ItemRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, SkippedRecord};
use crate::error::{CatalogError, CatalogResult};

// =============================================================================
// Load Mode
// =============================================================================

/// How malformed item records are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// Reject the whole file.
    #[default]
    Strict,
    /// Skip the record and keep going.
    Lenient,
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::Strict => write!(f, "strict"),
            LoadMode::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for LoadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(LoadMode::Strict),
            "lenient" => Ok(LoadMode::Lenient),
            _ => Err(format!("Invalid load mode: {}", s)),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Reads and parses the data file at `path`.
pub fn load_from_path(path: impl AsRef<Path>, mode: LoadMode) -> CatalogResult<Catalog> {
    let path = path.as_ref();
    debug!(path = %path.display(), %mode, "Reading data file");

    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let catalog = load_from_str(&text, mode)?;
    info!(
        path = %path.display(),
        items = catalog.items().len(),
        skipped = catalog.skipped().len(),
        products = catalog.master().products.len(),
        parts = catalog.master().parts.len(),
        materials = catalog.master().materials.len(),
        "Catalog loaded"
    );
    Ok(catalog)
}

/// Parses data file contents.
pub fn load_from_str(text: &str, mode: LoadMode) -> CatalogResult<Catalog> {
    let root: Value = serde_json::from_str(text)?;

    let (raw_items, master) = match root {
        Value::Array(items) => (items, MasterDataSet::default()),
        Value::Object(mut sections) => {
            let items = match sections.remove("items") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items,
                Some(other) => {
                    return Err(CatalogError::InvalidShape {
                        found: format!("\"items\" as {}", kind(&other)),
                    })
                }
            };
            let master: MasterDataSet = serde_json::from_value(Value::Object(sections))?;
            (items, master)
        }
        other => {
            return Err(CatalogError::InvalidShape {
                found: kind(&other).to_string(),
            })
        }
    };

    let (items, skipped) = parse_items(raw_items, mode)?;
    let catalog = Catalog::new(items, master, skipped);
    report(&catalog);
    Ok(catalog)
}

fn parse_items(
    raw: Vec<Value>,
    mode: LoadMode,
) -> CatalogResult<(Vec<ItemRecord>, Vec<SkippedRecord>)> {
    let mut items = Vec::with_capacity(raw.len());
    let mut skipped = Vec::new();

    for (index, value) in raw.into_iter().enumerate() {
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("<no id>")
            .to_string();

        match parse_item(value) {
            Ok(item) => items.push(item),
            Err(reason) => match mode {
                LoadMode::Strict => return Err(CatalogError::InvalidRecord { index, id, reason }),
                LoadMode::Lenient => {
                    warn!(index, id = %id, error = %reason, "Skipping malformed item record");
                    skipped.push(SkippedRecord { index, id, reason });
                }
            },
        }
    }

    Ok((items, skipped))
}

/// Deserializes one record and checks that its quote stays in decimal range.
fn parse_item(value: Value) -> Result<ItemRecord, String> {
    let item = serde_json::from_value::<ItemRecord>(value).map_err(|err| err.to_string())?;
    checked_breakdown(&item).map_err(|err| err.to_string())?;
    Ok(item)
}

/// Logs data quality issues that don't stop the load.
fn report(catalog: &Catalog) {
    for id in catalog.duplicate_ids() {
        warn!(id = %id, "Duplicate item id");
    }
    for dangling in catalog.dangling_references() {
        warn!(owner = %dangling.owner, kind = %dangling.kind, code = %dangling.code, "Dangling reference");
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
