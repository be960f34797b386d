//! # Product Quote Requests
//!
//! Turns CLI flags, URL query strings and request bodies into
//! [`QuoteParams`], then prices a product from the catalog.
//!
//! Anything the request leaves out comes from the data file's `settings`.

use hwquote_catalog::Catalog;
use hwquote_core::bom::parse_sheet_override;
use hwquote_core::master::Settings;
use hwquote_core::{
    compute_product_quote, MasterData, Money, PricingMode, ProductQuote, QuoteParams, Rate,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::error::AppResult;

/// Order quantity used when none is given.
pub const DEFAULT_QTY: u64 = 100;

/// Optional overrides for a product quote.
///
/// Used directly as the axum `Query` of the quote endpoints; `sheet` holds
/// comma-separated `PART=SPEC[:PIECES]` overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteRequest {
    pub qty: Option<u64>,
    pub overhead_pct: Option<Decimal>,
    pub tax_pct: Option<Decimal>,
    pub margin_pct: Option<Decimal>,
    pub scrap_rate: Option<Decimal>,
    pub mode: Option<PricingMode>,
    pub shipping: Option<Decimal>,
    pub sheet: Option<String>,
}

impl QuoteRequest {
    /// Sheet override strings, in the order given.
    pub fn sheet_overrides(&self) -> Vec<&str> {
        self.sheet
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolves the request against the data file settings.
    ///
    /// ## Errors
    /// A malformed sheet override or an out-of-range parameter.
    pub fn to_params(&self, settings: &Settings) -> AppResult<QuoteParams> {
        let mut params = QuoteParams::from_settings(settings, self.qty.unwrap_or(DEFAULT_QTY));

        if let Some(pct) = self.overhead_pct {
            params.overhead_pct = Rate::from_ratio(pct);
        }
        if let Some(pct) = self.tax_pct {
            params.tax_pct = Rate::from_ratio(pct);
        }
        if let Some(pct) = self.margin_pct {
            params.margin_pct = Rate::from_ratio(pct);
        }
        if let Some(rate) = self.scrap_rate {
            params.scrap_rate = Rate::from_ratio(rate);
        }
        if let Some(mode) = self.mode {
            params.pricing_mode = mode;
        }
        if let Some(shipping) = self.shipping {
            params.shipping_per_order = Money::from_decimal(shipping);
        }

        for raw in self.sheet_overrides() {
            let (part_code, sheet_override) = parse_sheet_override(raw)?;
            params.sheet_overrides.insert(part_code, sheet_override);
        }

        params.validate()?;
        Ok(params)
    }
}

/// Prices the product `sku` with `request` applied over the catalog settings.
pub fn quote_product(catalog: &Catalog, sku: &str, request: &QuoteRequest) -> AppResult<ProductQuote> {
    let product = catalog.product(sku)?;
    let params = request.to_params(catalog.settings())?;
    debug!(sku = %sku, qty = params.qty, mode = %params.pricing_mode, "Pricing product");

    let quote = compute_product_quote(catalog, product, &params)?;
    Ok(quote)
}
