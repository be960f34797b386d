//! # Application Error Type
//!
//! Unified error type for CLI commands and HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in hwquote                                │
//! │                                                                         │
//! │  CatalogError ──┐                                                       │
//! │  CoreError ─────┼──► AppError ──┬──► HTTP: status + {"code","message"} │
//! │  ValidationError┘     (code)    │                                       │
//! │  toml / io errors ──────┘       └──► CLI: anyhow context, exit 1       │
//! │                                                                         │
//! │  Browser / curl:                                                        │
//! │    404 { "code": "NOT_FOUND", "message": "Product not found: HB-9" }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hwquote_catalog::CatalogError;
use hwquote_core::{CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown SKU or quote line (404)
    NotFound,

    /// Bad quantity, rate, sheet override or request body (400)
    ValidationError,

    /// The quote sheet is at capacity (409)
    QuoteSheetFull,

    /// The data file could not be loaded (500)
    CatalogError,

    /// Configuration is unreadable or invalid (500)
    ConfigError,

    /// Anything else (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::QuoteSheetFull => StatusCode::CONFLICT,
            ErrorCode::CatalogError | ErrorCode::ConfigError | ErrorCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// ## When This Occurs
    /// - Unknown SKU, unreadable or malformed data file
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// ## When This Occurs
    /// - Quote line not on the sheet, quote sheet full, invalid parameters
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// ## When This Occurs
    /// - `--output` or `--export` path not writable
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Catalog(CatalogError::NotFound { .. }) => ErrorCode::NotFound,
            AppError::Catalog(_) => ErrorCode::CatalogError,
            AppError::Core(CoreError::QuoteLineNotFound(_)) => ErrorCode::NotFound,
            AppError::Core(CoreError::QuoteSheetFull { .. }) => ErrorCode::QuoteSheetFull,
            AppError::Core(CoreError::Validation(_))
            | AppError::Core(CoreError::AmountOverflow { .. })
            | AppError::Validation(_)
            | AppError::BadRequest(_) => ErrorCode::ValidationError,
            AppError::ConfigRead { .. } | AppError::ConfigParse(_) | AppError::InvalidConfig(_) => {
                ErrorCode::ConfigError
            }
            AppError::Write { .. } | AppError::Serialization(_) => ErrorCode::Internal,
        }
    }
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = code.status();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { code, message })).into_response()
    }
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
