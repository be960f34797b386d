//! Self-contained HTML pages for the browser renderer.
//!
//! Every value that came from the data file is escaped with `html_escape`
//! before it is written into the page.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use hwquote_core::{format_currency, Money, ProductQuote, QuoteSheet, QuoteSheetTotals};

use super::ItemsReport;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse;margin-bottom:1.5rem}\
th,td{border:1px solid #ccc;padding:4px 8px}\
th{background:#f0f0f0;text-align:left}\
td.num{text-align:right;font-variant-numeric:tabular-nums}\
tfoot td{font-weight:bold;background:#fafafa}\
.warn{color:#a15c00}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n<h1>{}</h1>\n{}</body>\n</html>\n",
        encode_text(title),
        STYLE,
        encode_text(title),
        body
    )
}

/// Builds a `<table>`; `cells` are already-rendered `<td>` strings.
struct HtmlTable {
    html: String,
}

impl HtmlTable {
    fn new(headers: &[&str]) -> Self {
        let mut html = String::from("<table>\n<thead><tr>");
        for h in headers {
            let _ = write!(html, "<th>{}</th>", encode_text(h));
        }
        html.push_str("</tr></thead>\n<tbody>\n");
        HtmlTable { html }
    }

    fn row(&mut self, cells: &[String]) {
        self.html.push_str("<tr>");
        for cell in cells {
            self.html.push_str(cell);
        }
        self.html.push_str("</tr>\n");
    }

    fn finish(mut self, footer: Option<&[String]>) -> String {
        self.html.push_str("</tbody>\n");
        if let Some(cells) = footer {
            self.html.push_str("<tfoot><tr>");
            for cell in cells {
                self.html.push_str(cell);
            }
            self.html.push_str("</tr></tfoot>\n");
        }
        self.html.push_str("</table>\n");
        self.html
    }
}

fn td(text: impl AsRef<str>) -> String {
    format!("<td>{}</td>", encode_text(text.as_ref()))
}

fn td_num(value: impl ToString) -> String {
    format!("<td class=\"num\">{}</td>", encode_text(&value.to_string()))
}

fn td_money(value: Money, currency: &str) -> String {
    td_num(format_currency(value, currency))
}

// =============================================================================
// Items
// =============================================================================

/// The quoted items table with totals footer.
pub fn items_page(report: &ItemsReport, currency: &str) -> String {
    let mut table = HtmlTable::new(&[
        "ID",
        "Name",
        "Category",
        "Material",
        "Qty",
        "Unit Material",
        "Unit Labor",
        "Overhead %",
        "Profit %",
        "Tax %",
        "Material Total",
        "Labor Total",
        "Overhead",
        "Subtotal",
        "Profit",
        "Tax",
        "Quote Total",
    ]);

    for row in &report.items {
        let (item, quote) = (&row.item, &row.quote);
        table.row(&[
            td(&item.id),
            td(&item.name),
            td(&item.category),
            td(&item.material),
            td_num(item.quantity),
            td_num(item.unit_material_cost),
            td_num(item.unit_labor_cost),
            td_num(item.overhead_pct),
            td_num(item.profit_pct),
            td_num(item.tax_pct),
            td_num(quote.material_total),
            td_num(quote.labor_total),
            td_num(quote.overhead),
            td_num(quote.subtotal),
            td_num(quote.profit),
            td_num(quote.tax),
            td_num(quote.quote_total),
        ]);
    }

    let t = &report.totals;
    let footer = [
        td(format!("Total ({} items)", t.item_count)),
        td(""),
        td(""),
        td(""),
        td_num(t.total_quantity),
        td(""),
        td(""),
        td(""),
        td(""),
        td(""),
        td_num(t.material_total),
        td_num(t.labor_total),
        td(""),
        td_num(t.subtotal),
        td(""),
        td_num(t.tax),
        td_money(t.quote_total, currency),
    ];

    let mut body = table.finish(Some(&footer));
    body.push_str("<p><a href=\"/quote-sheet\">Quote sheet</a> · <a href=\"/api/items\">JSON</a></p>\n");
    page("Hardware Item Quotes", &body)
}

// =============================================================================
// Product Quote
// =============================================================================

/// Breakdown of one product quote.
pub fn product_quote_page(quote: &ProductQuote, currency: &str) -> String {
    let s = &quote.summary;
    let mut body = String::new();

    let _ = writeln!(
        body,
        "<p>{} · qty {} · {} {}%</p>",
        encode_text(&quote.product_name),
        quote.params.qty,
        quote.params.pricing_mode,
        quote.params.margin_pct.percentage().normalize()
    );

    if !quote.warnings.is_empty() {
        body.push_str("<ul class=\"warn\">\n");
        for warning in &quote.warnings {
            let _ = writeln!(body, "<li>{}</li>", encode_text(&warning.to_string()));
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<h2>Cost Summary</h2>\n");
    let mut summary = HtmlTable::new(&["Item", "Amount"]);
    for (label, value) in [
        ("Material", s.material_total),
        ("Process", s.process_total),
        ("Purchased", s.purchased_total),
        ("Packaging", s.packaging_total),
        ("Shipping", s.shipping_cost),
        ("Subtotal", s.subtotal),
        ("Overhead", s.overhead),
        ("Tax", s.tax),
        ("Total Cost", s.total_cost),
        ("Final Price", s.final_price_total),
        ("Unit Price", s.unit_price),
    ] {
        summary.row(&[td(label), td_money(value, currency)]);
    }
    if let Some(tier) = &quote.tier {
        summary.row(&[td("Quantity tier"), td(format!("{} (x{})", tier.label, s.multiplier.normalize()))]);
    }
    body.push_str(&summary.finish(None));

    body.push_str("<h2>BOM</h2>\n");
    let mut bom = HtmlTable::new(&["Type", "Code", "Name", "Qty", "Unit Cost", "Sheet", "Line Total"]);
    for line in &quote.bom_lines {
        bom.row(&[
            td(line.line_type.to_string()),
            td(&line.code),
            td(&line.name),
            td_num(line.qty_total.normalize()),
            td_money(line.unit_cost, currency),
            td(line.sheet_spec.as_deref().unwrap_or("")),
            td_money(line.line_total, currency),
        ]);
    }
    body.push_str(&bom.finish(None));

    if !quote.process_lines.is_empty() {
        body.push_str("<h2>Processes</h2>\n");
        let mut process = HtmlTable::new(&["Part", "Process", "Min/Unit", "Rate/Min", "Total"]);
        for line in &quote.process_lines {
            process.row(&[
                td(&line.part_code),
                td(&line.name),
                td_num(line.minutes_per_unit.normalize()),
                td_num(line.rate_per_min),
                td_money(line.total_cost, currency),
            ]);
        }
        body.push_str(&process.finish(None));
    }

    if !quote.sheet_alternatives.is_empty() {
        body.push_str("<h2>Sheet Alternatives</h2>\n");
        let mut sheets =
            HtmlTable::new(&["Part", "Sheet", "Pieces/Sheet", "Sheets", "Material Cost"]);
        for alt in &quote.sheet_alternatives {
            sheets.row(&[
                td(&alt.part_code),
                td(&alt.sheet_spec),
                td_num(alt.pieces_per_sheet),
                td_num(alt.sheets_needed),
                td_money(alt.material_cost, currency),
            ]);
        }
        body.push_str(&sheets.finish(None));
    }

    let sku = encode_double_quoted_attribute(&quote.sku);
    let _ = writeln!(
        body,
        "<p><a href=\"/api/products/{sku}/quote/export?qty={qty}\">Export workbook</a> · \
         <a href=\"/quote-sheet\">Quote sheet</a></p>",
        qty = quote.params.qty
    );

    page(&format!("Quote {}", quote.sku), &body)
}

// =============================================================================
// Quote Sheet
// =============================================================================

pub fn quote_sheet_page(sheet: &QuoteSheet) -> String {
    let currency = sheet.header.currency.as_str();
    let totals = QuoteSheetTotals::from(sheet);
    let mut body = String::new();

    let _ = writeln!(
        body,
        "<p>Quote {} · Customer {} · {}</p>",
        encode_text(&sheet.header.quote_no),
        encode_text(&sheet.header.customer),
        encode_text(currency)
    );

    if sheet.is_empty() {
        body.push_str("<p>No lines yet.</p>\n");
        return page("Quote Sheet", &body);
    }

    let mut table = HtmlTable::new(&[
        "Line", "SKU", "Product", "Qty", "Unit Price", "Line Total", "Cost Total",
    ]);
    for line in &sheet.lines {
        table.row(&[
            td_num(line.line_id),
            td(&line.sku),
            td(&line.product_name),
            td_num(line.qty),
            td_money(line.unit_price, currency),
            td_money(line.line_total, currency),
            td_money(line.cost_total, currency),
        ]);
    }
    body.push_str(&table.finish(None));

    let mut summary = HtmlTable::new(&["", ""]);
    summary.row(&[td("Lines subtotal"), td_money(totals.lines_subtotal, currency)]);
    summary.row(&[td("Order shipping"), td_money(totals.order_shipping, currency)]);
    summary.row(&[td("Final total"), td_money(totals.final_total, currency)]);
    body.push_str(&summary.finish(None));

    body.push_str("<p><a href=\"/api/quote-sheet/export\">Export workbook</a></p>\n");
    page("Quote Sheet", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quoting::{quote_product, QuoteRequest};
    use hwquote_catalog::{load_from_str, LoadMode};
    use hwquote_core::QuoteHeader;

    const DATA: &str = r#"{
        "purchased_items": [ { "item_code": "SCR", "name": "Screw <M4>", "unit_cost": 0.1 } ],
        "products": [ { "sku": "KIT", "name": "Kit & Co",
                        "bom_lines": [ { "type": "purchased", "code": "SCR" },
                                       { "type": "packaging", "code": "BOX" } ] } ],
        "items": [ { "id": "X-1", "name": "<script>alert(1)</script>", "category": "A&B",
                     "material": "m", "unit_material_cost": 1, "unit_labor_cost": 0,
                     "overhead_pct": 0, "profit_pct": 0, "tax_pct": 0, "quantity": 1 } ]
    }"#;

    #[test]
    fn test_items_page_escapes_values() {
        let catalog = load_from_str(DATA, LoadMode::Strict).unwrap();
        let html = items_page(&ItemsReport::from(&catalog), "USD");

        assert!(html.contains("<table>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<td>A&amp;B</td>"));
        assert!(html.contains("Total (1 items)"));
    }

    #[test]
    fn test_product_quote_page() {
        let catalog = load_from_str(DATA, LoadMode::Strict).unwrap();
        let quote = quote_product(&catalog, "KIT", &QuoteRequest::default()).unwrap();
        let html = product_quote_page(&quote, "USD");

        assert!(html.contains("Kit &amp; Co"));
        assert!(html.contains("Screw &lt;M4&gt;"));
        assert!(html.contains("class=\"warn\""));
        assert!(html.contains("packaging rule not found: BOX"));
        assert!(!html.contains("Sheet Alternatives"));
    }

    #[test]
    fn test_quote_sheet_page() {
        let catalog = load_from_str(DATA, LoadMode::Strict).unwrap();
        let mut sheet = QuoteSheet::new(QuoteHeader {
            quote_no: "Q-1".into(),
            customer: "ACME".into(),
            currency: "USD".into(),
        });
        assert!(quote_sheet_page(&sheet).contains("No lines yet."));

        let quote = quote_product(&catalog, "KIT", &QuoteRequest::default()).unwrap();
        sheet.add_line(&quote).unwrap();
        let html = quote_sheet_page(&sheet);
        assert!(html.contains("Final total"));
        assert!(html.contains("Kit &amp; Co"));
    }
}
