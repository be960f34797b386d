//! # Catalog Error Types
//!
//! Error types for loading and querying the data file.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CatalogError (this module) ← Adds path, record index and id           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (in the app) ← HTTP status + JSON body, or CLI exit          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Data file loading and lookup errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Entity not found in the catalog.
    ///
    /// ## When This Occurs
    /// - Unknown product SKU on the CLI or in a URL
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The data file could not be read.
    ///
    /// ## When This Occurs
    /// - Path doesn't exist
    /// - File permissions issue
    #[error("Failed to read data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data file is not valid JSON, or a master data section is malformed.
    #[error("Failed to parse data file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The top-level value is neither an item list nor an object.
    #[error("Unsupported data file shape: expected a JSON array or object, found {found}")]
    InvalidShape { found: String },

    /// An item record is malformed (strict load mode only).
    ///
    /// ## When This Occurs
    /// - A required field is missing
    /// - A cost or rate is not a number
    /// - The quantity is negative or fractional
    #[error("Invalid item record #{index} ({id}): {reason}")]
    InvalidRecord {
        index: usize,
        id: String,
        reason: String,
    },
}

impl CatalogError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CatalogError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CatalogError::not_found("Product", "HB-404").to_string(),
            "Product not found: HB-404"
        );

        let err = CatalogError::InvalidRecord {
            index: 3,
            id: "BRK-009".to_string(),
            reason: "missing field `tax_pct`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid item record #3 (BRK-009): missing field `tax_pct`"
        );
    }
}
