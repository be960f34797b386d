//! Terminal tables (comfy-table).
//!
//! Item tables show exact amounts; product quote tables round to cents.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use hwquote_core::master::MasterDataSet;
use hwquote_core::{format_currency, Money, ProductQuote};

use super::ItemsReport;

fn new_table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn num(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

fn cents(value: Money) -> Cell {
    num(format!("{:.2}", value.round_cents().amount()))
}

fn bold(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Bold)
}

// =============================================================================
// Items
// =============================================================================

/// Quoted items with a totals footer row.
pub fn items_table(report: &ItemsReport, currency: &str) -> Table {
    let mut table = new_table(vec![
        "ID",
        "Name",
        "Category",
        "Material",
        "Qty",
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
        table.add_row(vec![
            Cell::new(&item.id),
            Cell::new(&item.name),
            Cell::new(&item.category),
            Cell::new(&item.material),
            num(item.quantity),
            num(quote.material_total),
            num(quote.labor_total),
            num(quote.overhead),
            num(quote.subtotal),
            num(quote.profit),
            num(quote.tax),
            num(quote.quote_total),
        ]);
    }

    let totals = &report.totals;
    table.add_row(vec![
        bold(format!("TOTAL ({currency})")),
        bold(format!("{} items", totals.item_count)),
        Cell::new(""),
        Cell::new(""),
        num(totals.total_quantity),
        num(totals.material_total),
        num(totals.labor_total),
        Cell::new(""),
        num(totals.subtotal),
        Cell::new(""),
        num(totals.tax),
        num(totals.quote_total).add_attribute(Attribute::Bold),
    ]);

    table
}

// =============================================================================
// Master Data
// =============================================================================

/// One titled table per master data section.
pub fn master_tables(master: &MasterDataSet) -> Vec<(&'static str, Table)> {
    let settings = &master.settings;
    let mut settings_table = new_table(vec!["Setting", "Value"]);
    settings_table
        .add_row(vec![Cell::new("currency"), Cell::new(&settings.currency)])
        .add_row(vec![Cell::new("management_fee_pct"), num(settings.management_fee_pct)])
        .add_row(vec![Cell::new("tax_pct"), num(settings.tax_pct)])
        .add_row(vec![Cell::new("default_profit_pct"), num(settings.default_profit_pct)])
        .add_row(vec![Cell::new("wastage_pct"), num(settings.wastage_pct)])
        .add_row(vec![
            Cell::new("freight_cost_per_order"),
            num(settings.freight_cost_per_order),
        ])
        .add_row(vec![
            Cell::new("packaging_cost_per_unit"),
            num(settings.packaging_cost_per_unit),
        ]);

    let mut materials = new_table(vec!["Code", "Name", "Pricing", "Price/kg", "Sheet Options"]);
    for m in &master.materials {
        let sheets = m
            .sheet_options
            .iter()
            .map(|s| format!("{} @ {}", s.spec_label(), s.sheet_price))
            .collect::<Vec<_>>()
            .join("\n");
        materials.add_row(vec![
            Cell::new(&m.code),
            Cell::new(&m.name),
            Cell::new(m.pricing_mode),
            num(m.price_per_kg),
            Cell::new(sheets),
        ]);
    }

    let mut processes = new_table(vec!["Code", "Name", "Rate/min", "Setup"]);
    for p in &master.processes {
        processes.add_row(vec![
            Cell::new(&p.code),
            Cell::new(&p.name),
            num(p.unit_rate_per_min),
            num(p.setup_cost),
        ]);
    }

    let mut tiers = new_table(vec!["Label", "Min Qty", "Max Qty", "Multiplier"]);
    for t in &master.quantity_tiers {
        tiers.add_row(vec![
            Cell::new(&t.label),
            num(t.min_qty),
            num(t.max_qty.map(|q| q.to_string()).unwrap_or_else(|| "-".into())),
            num(t.multiplier),
        ]);
    }

    let mut parts = new_table(vec!["Code", "Name", "Material", "Blank (mm)", "Steps"]);
    for p in &master.parts {
        let steps = p
            .process_steps
            .iter()
            .filter(|s| s.enabled)
            .map(|s| format!("{} {}min", s.process_code, s.minutes_per_unit))
            .collect::<Vec<_>>()
            .join(", ");
        parts.add_row(vec![
            Cell::new(&p.part_code),
            Cell::new(&p.name),
            Cell::new(&p.material_code),
            Cell::new(format!(
                "{}x{}x{}",
                p.blank_length_mm, p.blank_width_mm, p.thickness_mm
            )),
            Cell::new(steps),
        ]);
    }

    let mut purchased = new_table(vec!["Code", "Name", "Unit Cost", "UOM", "Waste", "MOQ"]);
    for i in &master.purchased_items {
        purchased.add_row(vec![
            Cell::new(&i.item_code),
            Cell::new(&i.name),
            num(i.unit_cost),
            Cell::new(&i.uom),
            num(i.waste_pct),
            num(i.moq_qty.map(|q| q.to_string()).unwrap_or_else(|| "-".into())),
        ]);
    }

    let mut packaging = new_table(vec!["Code", "Rule", "Unit Cost", "Qty"]);
    for p in &master.packaging_rules.per_unit {
        packaging.add_row(vec![
            Cell::new(&p.item_code),
            Cell::new("per unit"),
            num(p.unit_cost),
            num(p.qty_per_unit),
        ]);
    }
    for p in &master.packaging_rules.per_carton {
        packaging.add_row(vec![
            Cell::new(&p.item_code),
            Cell::new("per carton"),
            num(p.unit_cost),
            num(p.qty_per_carton),
        ]);
    }

    let mut products = new_table(vec!["SKU", "Name", "Units/Carton", "BOM Lines"]);
    for p in &master.products {
        products.add_row(vec![
            Cell::new(&p.sku),
            Cell::new(&p.name),
            num(p.units_per_carton.map(|u| u.to_string()).unwrap_or_else(|| "-".into())),
            num(p.bom_lines.len()),
        ]);
    }

    vec![
        ("Settings", settings_table),
        ("Materials", materials),
        ("Processes", processes),
        ("Quantity Tiers", tiers),
        ("Parts", parts),
        ("Purchased Items", purchased),
        ("Packaging Rules", packaging),
        ("Products", products),
    ]
}

// =============================================================================
// Product Quote
// =============================================================================

pub fn bom_table(quote: &ProductQuote) -> Table {
    let mut table = new_table(vec![
        "Type", "Code", "Name", "Qty", "UOM", "Unit Cost", "Material", "Process", "Sheet",
        "Line Total",
    ]);
    for line in &quote.bom_lines {
        let sheet = match (&line.sheet_spec, line.pieces_per_sheet, line.sheets_needed) {
            (Some(spec), Some(pieces), Some(sheets)) => {
                format!("{spec} ({pieces}/sheet, {sheets} sheets)")
            }
            _ => String::new(),
        };
        let name = if line.optional {
            format!("{} (optional)", line.name)
        } else {
            line.name.clone()
        };
        table.add_row(vec![
            Cell::new(line.line_type),
            Cell::new(&line.code),
            Cell::new(name),
            num(line.qty_total.normalize()),
            Cell::new(&line.uom),
            cents(line.unit_cost),
            cents(line.material_cost),
            cents(line.process_cost),
            Cell::new(sheet),
            cents(line.line_total),
        ]);
    }
    table
}

pub fn process_table(quote: &ProductQuote) -> Table {
    let mut table = new_table(vec![
        "Part", "Process", "Name", "Min/Unit", "Rate/Min", "Qty", "Runtime", "Setup", "Total",
    ]);
    for line in &quote.process_lines {
        table.add_row(vec![
            Cell::new(&line.part_code),
            Cell::new(&line.process_code),
            Cell::new(&line.name),
            num(line.minutes_per_unit.normalize()),
            num(line.rate_per_min),
            num(line.qty),
            cents(line.runtime_cost),
            cents(line.setup_cost),
            cents(line.total_cost),
        ]);
    }
    table
}

/// Sheet candidates, cheapest first per part.
pub fn sheet_alternatives_table(quote: &ProductQuote) -> Table {
    let mut table = new_table(vec![
        "Part", "Sheet", "Sheet Price", "Pieces/Sheet", "Sheets", "Material Cost",
    ]);
    for alt in &quote.sheet_alternatives {
        table.add_row(vec![
            Cell::new(&alt.part_code),
            Cell::new(&alt.sheet_spec),
            cents(alt.sheet_price),
            num(alt.pieces_per_sheet),
            num(alt.sheets_needed),
            cents(alt.material_cost),
        ]);
    }
    table
}

pub fn cost_summary_table(quote: &ProductQuote, currency: &str) -> Table {
    let s = &quote.summary;
    let p = &quote.params;
    let tier = quote
        .tier
        .as_ref()
        .map(|t| format!("{} (x{})", t.label, s.multiplier.normalize()))
        .unwrap_or_else(|| format!("none (x{})", s.multiplier.normalize()));

    let mut table = new_table(vec!["Item", "Amount"]);
    let money_rows = [
        ("Material", s.material_total),
        ("Process", s.process_total),
        ("Purchased", s.purchased_total),
        ("Packaging", s.packaging_total),
        ("Shipping", s.shipping_cost),
        ("Subtotal", s.subtotal),
        ("Overhead", s.overhead),
        ("Pre-tax", s.pre_tax),
        ("Tax", s.tax),
        ("Total Cost", s.total_cost),
    ];
    for (label, value) in money_rows {
        table.add_row(vec![Cell::new(label), num(format_currency(value, currency))]);
    }
    table
        .add_row(vec![Cell::new("Quantity tier"), num(tier)])
        .add_row(vec![
            Cell::new("Pricing"),
            num(format!("{} {}%", p.pricing_mode, p.margin_pct.percentage().normalize())),
        ])
        .add_row(vec![
            bold("Final Price"),
            num(format_currency(s.final_price_total, currency)).add_attribute(Attribute::Bold),
        ])
        .add_row(vec![
            bold("Unit Price"),
            num(format_currency(s.unit_price, currency)).add_attribute(Attribute::Bold),
        ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quoting::{quote_product, QuoteRequest};
    use hwquote_catalog::{load_from_str, LoadMode};

    const DATA: &str = r#"{
        "settings": { "currency": "USD" },
        "processes": [ { "code": "BEND", "name": "Press brake", "unit_rate_per_min": 1.2 } ],
        "quantity_tiers": [ { "label": "Volume", "min_qty": 50, "multiplier": 0.9 } ],
        "parts": [ { "part_code": "P-BODY", "material_code": "NONE",
                     "process_steps": [ { "process_code": "BEND", "minutes_per_unit": 0.25 } ] } ],
        "purchased_items": [ { "item_code": "SCR", "name": "M4 screw", "unit_cost": 0.1, "uom": "pcs" } ],
        "products": [ { "sku": "BOX", "name": "Enclosure",
                        "bom_lines": [ { "type": "part", "code": "P-BODY" },
                                       { "type": "purchased", "code": "SCR", "qty_per_unit": 4 } ] } ],
        "items": [ { "id": "BRK-001", "name": "L Bracket", "category": "Brackets", "material": "SPCC",
                     "unit_material_cost": 10, "unit_labor_cost": 5,
                     "overhead_pct": 0.1, "profit_pct": 0.2, "tax_pct": 0.13, "quantity": 2 } ]
    }"#;

    #[test]
    fn test_items_table_has_footer() {
        let catalog = load_from_str(DATA, LoadMode::Strict).unwrap();
        let rendered = items_table(&ItemsReport::from(&catalog), "USD").to_string();

        assert!(rendered.contains("L Bracket"));
        assert!(rendered.contains("5.148"));
        assert!(rendered.contains("TOTAL (USD)"));
        assert!(rendered.contains("1 items"));
    }

    #[test]
    fn test_master_tables() {
        let catalog = load_from_str(DATA, LoadMode::Strict).unwrap();
        let tables = master_tables(catalog.master());

        let titles: Vec<&str> = tables.iter().map(|(title, _)| *title).collect();
        assert_eq!(titles.len(), 8);
        assert_eq!(titles[0], "Settings");

        let processes = tables[2].1.to_string();
        assert!(processes.contains("Press brake"));
    }

    #[test]
    fn test_product_quote_tables() {
        let catalog = load_from_str(DATA, LoadMode::Strict).unwrap();
        let quote = quote_product(&catalog, "BOX", &QuoteRequest::default()).unwrap();

        let bom = bom_table(&quote).to_string();
        assert!(bom.contains("M4 screw"));
        assert!(bom.contains("40.00"));

        let process = process_table(&quote).to_string();
        assert!(process.contains("Press brake"));

        let summary = cost_summary_table(&quote, "USD").to_string();
        assert!(summary.contains("Volume (x0.9)"));
        assert!(summary.contains("Final Price"));
        assert!(summary.contains("USD "));

        assert_eq!(sheet_alternatives_table(&quote).row_iter().count(), 0);
    }
}
