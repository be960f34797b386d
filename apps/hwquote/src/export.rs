//! # Workbook Export
//!
//! Product quotes and the quote sheet as JSON workbooks: named worksheets,
//! each a list of flat row objects, ready to paste into a spreadsheet.
//!
//! ```text
//! Product quote                  Quote sheet
//! ─────────────                  ───────────
//! Quote_Header                   Quote_Header
//! Cost_Summary                   Quote_Lines
//! BOM_Breakdown
//! Process_Breakdown
//! Sheet_Alternatives  (only when the quote has sheet candidates)
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use hwquote_core::{ProductQuote, QuoteHeader, QuoteSheet};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::{AppError, AppResult};

/// One named worksheet.
#[derive(Debug, Clone, Serialize)]
pub struct Worksheet {
    pub name: &'static str,
    pub rows: Vec<Value>,
}

/// An exported workbook.
#[derive(Debug, Clone, Serialize)]
pub struct Workbook {
    /// Suggested download name.
    pub file_name: String,
    pub exported_at: DateTime<Utc>,
    pub sheets: Vec<Worksheet>,
}

impl Workbook {
    fn new(quote_no: &str) -> Self {
        let stem = if quote_no.trim().is_empty() {
            "quote"
        } else {
            quote_no.trim()
        };
        Workbook {
            file_name: format!("{}.json", stem),
            exported_at: Utc::now(),
            sheets: Vec::new(),
        }
    }

    fn push(&mut self, name: &'static str, rows: Vec<Value>) {
        self.sheets.push(Worksheet { name, rows });
    }

    /// Looks up a worksheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&'static str> {
        self.sheets.iter().map(|s| s.name).collect()
    }

    /// Writes the workbook as pretty-printed JSON.
    pub fn write_to(&self, path: &Path) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|source| AppError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), sheets = self.sheets.len(), "Workbook written");
        Ok(())
    }
}

fn rows<T: Serialize>(records: &[T]) -> AppResult<Vec<Value>> {
    records
        .iter()
        .map(|r| serde_json::to_value(r).map_err(AppError::from))
        .collect()
}

/// Exports one product quote.
pub fn product_quote_workbook(quote: &ProductQuote, header: &QuoteHeader) -> AppResult<Workbook> {
    let summary = &quote.summary;
    let params = &quote.params;
    let mut workbook = Workbook::new(&header.quote_no);

    workbook.push(
        "Quote_Header",
        vec![
            json!({ "field": "Quote No", "value": header.quote_no }),
            json!({ "field": "Customer", "value": header.customer }),
            json!({ "field": "Currency", "value": header.currency }),
            json!({ "field": "Product SKU", "value": quote.sku }),
            json!({ "field": "Product Name", "value": quote.product_name }),
            json!({ "field": "Quantity", "value": params.qty }),
            json!({ "field": "Total Material Cost", "value": summary.material_total }),
        ],
    );

    workbook.push(
        "Cost_Summary",
        vec![
            json!({ "item": "material_total", "value": summary.material_total }),
            json!({ "item": "process_total", "value": summary.process_total }),
            json!({ "item": "purchased_total", "value": summary.purchased_total }),
            json!({ "item": "packaging_total", "value": summary.packaging_total }),
            json!({ "item": "shipping_cost", "value": summary.shipping_cost }),
            json!({ "item": "overhead", "value": summary.overhead }),
            json!({ "item": "tax", "value": summary.tax }),
            json!({ "item": "total_cost", "value": summary.total_cost }),
            json!({ "item": "final_price_total", "value": summary.final_price_total }),
            json!({ "item": "unit_price", "value": summary.unit_price }),
            json!({ "item": "multiplier", "value": summary.multiplier }),
            json!({ "item": "pricing_mode", "value": params.pricing_mode }),
            json!({ "item": "margin_pct", "value": params.margin_pct }),
        ],
    );

    workbook.push("BOM_Breakdown", rows(&quote.bom_lines)?);
    workbook.push("Process_Breakdown", rows(&quote.process_lines)?);

    if !quote.sheet_alternatives.is_empty() {
        workbook.push("Sheet_Alternatives", rows(&quote.sheet_alternatives)?);
    }

    Ok(workbook)
}

/// Exports the whole quote sheet.
pub fn quote_sheet_workbook(sheet: &QuoteSheet) -> AppResult<Workbook> {
    let mut workbook = Workbook::new(&sheet.header.quote_no);

    workbook.push(
        "Quote_Header",
        vec![json!({
            "quote_no": sheet.header.quote_no,
            "customer": sheet.header.customer,
            "currency": sheet.header.currency,
            "order_shipping": sheet.order_shipping,
            "lines_subtotal": sheet.lines_subtotal(),
            "final_total": sheet.final_total(),
        })],
    );

    let lines = sheet
        .lines
        .iter()
        .map(|line| {
            json!({
                "line_id": line.line_id,
                "sku": line.sku,
                "product_name": line.product_name,
                "qty": line.qty,
                "unit_price": line.unit_price,
                "line_total": line.line_total,
                "material_cost": line.material_cost,
                "process_cost": line.process_cost,
                "packaging_cost": line.packaging_cost,
                "cost_total": line.cost_total,
                "process_summary": line.process_summary,
            })
        })
        .collect();
    workbook.push("Quote_Lines", lines);

    Ok(workbook)
}
