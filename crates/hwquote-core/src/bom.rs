//! # Product (BOM) Quote
//!
//! Prices a finished product from its bill of materials.
//!
//! ## Roll-up
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Product Quote Flow                               │
//! │                                                                         │
//! │  BOM lines ──┬── part ──────► sheet nesting / weight  ──► material     │
//! │              │                process steps           ──► process      │
//! │              ├── purchased ─► max(qty, MOQ) × cost × (1 + waste)       │
//! │              └── packaging ─► per unit | per carton                    │
//! │                                                                         │
//! │  subtotal   = material + process + purchased + packaging + shipping    │
//! │  overhead   = subtotal × overhead_pct                                  │
//! │  pre_tax    = subtotal + overhead                                      │
//! │  tax        = pre_tax × tax_pct                                        │
//! │  total_cost = pre_tax + tax                                            │
//! │  final      = total_cost / (1 - margin)    gross margin (margin < 1)   │
//! │             = total_cost × (1 + margin)    markup                      │
//! │  final     ×= tier multiplier(qty)                                     │
//! │  unit_price = final / qty                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown codes never fail the quote: the line is skipped (or its material
//! costed at zero) and a [`QuoteWarning`] is recorded.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{CoreResult, ValidationError};
use crate::master::{
    BomLine, BomLineType, MasterData, MaterialPricingMode, PackagingRule, Part, Product,
    QuantityTier, Settings, SheetOption,
};
use crate::money::Money;
use crate::process::{compute_process_costs, ProcessLine};
use crate::sheet::{evaluate_sheet_option, evaluate_sheet_options, SheetEvaluation};
use crate::tiers::find_multiplier;
use crate::types::{PricingMode, Rate};
use crate::validation::{
    validate_non_negative, validate_order_quantity, validate_rate, ValidationResult,
};

// =============================================================================
// Parameters
// =============================================================================

/// Engineering override of the recommended sheet for one part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetOverride {
    /// Label of a candidate sheet, e.g. `2440x1220x1.5mm`.
    pub sheet_spec: String,
    /// Replaces the computed pieces per sheet when set.
    pub pieces_per_sheet: Option<u64>,
}

/// Parses `PART=SPEC` or `PART=SPEC:PIECES`.
///
/// ```rust
/// use hwquote_core::bom::parse_sheet_override;
///
/// let (part, o) = parse_sheet_override("P-PANEL=2440x1220x1.5mm:40").unwrap();
/// assert_eq!(part, "P-PANEL");
/// assert_eq!(o.sheet_spec, "2440x1220x1.5mm");
/// assert_eq!(o.pieces_per_sheet, Some(40));
/// ```
pub fn parse_sheet_override(input: &str) -> ValidationResult<(String, SheetOverride)> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "sheet override".to_string(),
        reason: reason.to_string(),
    };

    let (part_code, rest) = input
        .split_once('=')
        .ok_or_else(|| invalid("expected PART=SPEC[:PIECES]"))?;

    let (sheet_spec, pieces_per_sheet) = match rest.split_once(':') {
        Some((spec, pieces)) => {
            let pieces: u64 = pieces
                .trim()
                .parse()
                .map_err(|_| invalid("pieces per sheet must be a whole number"))?;
            (spec, Some(pieces))
        }
        None => (rest, None),
    };

    let part_code = part_code.trim();
    let sheet_spec = sheet_spec.trim();
    if part_code.is_empty() || sheet_spec.is_empty() {
        return Err(invalid("part code and sheet spec are required"));
    }

    Ok((
        part_code.to_string(),
        SheetOverride {
            sheet_spec: sheet_spec.to_string(),
            pieces_per_sheet,
        },
    ))
}

/// Inputs of a product quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteParams {
    pub qty: u64,
    pub overhead_pct: Rate,
    pub tax_pct: Rate,
    pub margin_pct: Rate,
    /// Scrap allowance for by-weight materials.
    pub scrap_rate: Rate,
    pub pricing_mode: PricingMode,
    pub shipping_per_order: Money,
    /// Keyed by part code.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub sheet_overrides: HashMap<String, SheetOverride>,
}

impl QuoteParams {
    /// Parameters seeded from the data file's settings.
    pub fn from_settings(settings: &Settings, qty: u64) -> Self {
        Self {
            qty,
            overhead_pct: settings.management_fee_pct,
            tax_pct: settings.tax_pct,
            margin_pct: settings.default_profit_pct,
            scrap_rate: settings.wastage_pct,
            pricing_mode: PricingMode::GrossMargin,
            shipping_per_order: settings.freight_cost_per_order,
            sheet_overrides: HashMap::new(),
        }
    }

    /// Rejects a zero quantity, rates outside `[0, 1]` and negative shipping.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_order_quantity(self.qty)?;
        validate_rate("overhead_pct", self.overhead_pct)?;
        validate_rate("tax_pct", self.tax_pct)?;
        validate_rate("margin_pct", self.margin_pct)?;
        validate_rate("scrap_rate", self.scrap_rate)?;
        validate_non_negative("shipping_per_order", self.shipping_per_order)?;
        Ok(())
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// One costed BOM line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BomLineCost {
    pub line_type: BomLineType,
    pub code: String,
    pub name: String,
    pub qty_total: Decimal,
    pub uom: String,
    pub unit_cost: Money,
    pub line_total: Money,
    pub material_cost: Money,
    pub process_cost: Money,
    pub sheet_spec: Option<String>,
    pub pieces_per_sheet: Option<u64>,
    pub sheets_needed: Option<u64>,
    pub optional: bool,
}

/// A candidate sheet considered for a part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetAlternative {
    pub part_code: String,
    pub sheet_spec: String,
    pub sheet_price: Money,
    pub pieces_per_sheet: u64,
    pub sheets_needed: u64,
    pub material_cost: Money,
}

/// Cost buckets and prices of a product quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CostSummary {
    pub material_total: Money,
    pub process_total: Money,
    pub purchased_total: Money,
    pub packaging_total: Money,
    pub shipping_cost: Money,
    pub subtotal: Money,
    pub overhead: Money,
    pub pre_tax: Money,
    pub tax: Money,
    pub total_cost: Money,
    pub final_price_total: Money,
    pub unit_price: Money,
    pub multiplier: Decimal,
}

/// Something the quote could not price as the data file describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuoteWarning {
    UnknownPart { code: String },
    /// Negative, or too large to count in whole parts.
    UnpricedPartQuantity { code: String, qty_per_unit: Decimal },
    UnknownMaterial { part_code: String, material_code: String },
    NoSheetOptions { part_code: String },
    UnknownSheetSpec { part_code: String, sheet_spec: String },
    UnknownPurchasedItem { code: String },
    UnknownPackaging { code: String },
}

impl fmt::Display for QuoteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteWarning::UnknownPart { code } => write!(f, "part not found: {code}"),
            QuoteWarning::UnpricedPartQuantity { code, qty_per_unit } => {
                write!(f, "part {code}: quantity per unit {qty_per_unit} cannot be priced")
            }
            QuoteWarning::UnknownMaterial {
                part_code,
                material_code,
            } => write!(f, "part {part_code}: material not found: {material_code}"),
            QuoteWarning::NoSheetOptions { part_code } => {
                write!(f, "part {part_code}: material has no sheet options")
            }
            QuoteWarning::UnknownSheetSpec {
                part_code,
                sheet_spec,
            } => write!(
                f,
                "part {part_code}: sheet override {sheet_spec} is not a candidate, using recommendation"
            ),
            QuoteWarning::UnknownPurchasedItem { code } => {
                write!(f, "purchased item not found: {code}")
            }
            QuoteWarning::UnknownPackaging { code } => {
                write!(f, "packaging rule not found: {code}")
            }
        }
    }
}

/// A fully costed product quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductQuote {
    pub sku: String,
    pub product_name: String,
    pub params: QuoteParams,
    pub bom_lines: Vec<BomLineCost>,
    pub process_lines: Vec<ProcessLine>,
    pub sheet_alternatives: Vec<SheetAlternative>,
    pub summary: CostSummary,
    pub tier: Option<QuantityTier>,
    pub warnings: Vec<QuoteWarning>,
}

// =============================================================================
// Computation
// =============================================================================

#[derive(Default)]
struct Accumulator {
    lines: Vec<BomLineCost>,
    process_lines: Vec<ProcessLine>,
    alternatives: Vec<SheetAlternative>,
    warnings: Vec<QuoteWarning>,
    material_total: Money,
    process_total: Money,
    purchased_total: Money,
    packaging_total: Money,
}

/// Prices `product` against `master` with `params`.
///
/// ## Errors
/// Only parameter validation fails; see [`QuoteParams::validate`].
pub fn compute_product_quote(
    master: &dyn MasterData,
    product: &Product,
    params: &QuoteParams,
) -> CoreResult<ProductQuote> {
    params.validate()?;

    let mut acc = Accumulator::default();
    for line in &product.bom_lines {
        match line.line_type {
            BomLineType::Part => cost_part(master, line, params, &mut acc),
            BomLineType::Purchased => cost_purchased(master, line, params, &mut acc),
            BomLineType::Packaging => cost_packaging(master, product, line, params, &mut acc),
        }
    }

    let shipping_cost = params.shipping_per_order;
    let subtotal = acc.material_total
        + acc.process_total
        + acc.purchased_total
        + acc.packaging_total
        + shipping_cost;
    let overhead = subtotal.apply_rate(params.overhead_pct);
    let pre_tax = subtotal + overhead;
    let tax = pre_tax.apply_rate(params.tax_pct);
    let total_cost = pre_tax + tax;

    let margin = params.margin_pct.ratio();
    let priced = match params.pricing_mode {
        PricingMode::GrossMargin if margin < Decimal::ONE => {
            Money::from_decimal(total_cost.amount() / (Decimal::ONE - margin))
        }
        PricingMode::GrossMargin => total_cost,
        PricingMode::Markup => total_cost.scale(Decimal::ONE + margin),
    };

    let tier = find_multiplier(master.quantity_tiers(), params.qty);
    let final_price_total = priced.scale(tier.multiplier);
    let unit_price = Money::from_decimal(final_price_total.amount() / Decimal::from(params.qty));

    Ok(ProductQuote {
        sku: product.sku.clone(),
        product_name: product.name.clone(),
        params: params.clone(),
        bom_lines: acc.lines,
        process_lines: acc.process_lines,
        sheet_alternatives: acc.alternatives,
        summary: CostSummary {
            material_total: acc.material_total,
            process_total: acc.process_total,
            purchased_total: acc.purchased_total,
            packaging_total: acc.packaging_total,
            shipping_cost,
            subtotal,
            overhead,
            pre_tax,
            tax,
            total_cost,
            final_price_total,
            unit_price,
            multiplier: tier.multiplier,
        },
        tier: tier.tier,
        warnings: acc.warnings,
    })
}

fn cost_part(master: &dyn MasterData, line: &BomLine, params: &QuoteParams, acc: &mut Accumulator) {
    let Some(part) = master.part(&line.code) else {
        acc.warnings.push(QuoteWarning::UnknownPart {
            code: line.code.clone(),
        });
        return;
    };

    let qty_per_unit = line.qty_per_unit_or_one();
    let part_qty = if qty_per_unit < Decimal::ZERO {
        None
    } else {
        Decimal::from(params.qty)
            .checked_mul(qty_per_unit)
            .and_then(|qty| qty.ceil().to_u64())
    };
    let Some(part_qty) = part_qty else {
        acc.warnings.push(QuoteWarning::UnpricedPartQuantity {
            code: line.code.clone(),
            qty_per_unit,
        });
        return;
    };

    let mut sheet: Option<SheetEvaluation> = None;
    let material_cost = match master.material(&part.material_code) {
        None => {
            acc.warnings.push(QuoteWarning::UnknownMaterial {
                part_code: part.part_code.clone(),
                material_code: part.material_code.clone(),
            });
            Money::zero()
        }
        Some(material) => match material.pricing_mode {
            MaterialPricingMode::BySheet => {
                sheet = choose_sheet(&material.sheet_options, part, part_qty, params, acc);
                sheet.as_ref().map(|s| s.material_cost).unwrap_or_default()
            }
            MaterialPricingMode::ByWeight => {
                let weight = part.weight_kg_per_unit.unwrap_or_default();
                material.price_per_kg.scale(
                    weight * Decimal::from(part_qty) * (Decimal::ONE + params.scrap_rate.ratio()),
                )
            }
        },
    };

    let process = compute_process_costs(&part.process_steps, master, part_qty, &part.part_code);
    let line_total = material_cost + process.total;
    let unit_cost = if part_qty > 0 {
        Money::from_decimal(line_total.amount() / Decimal::from(part_qty))
    } else {
        Money::zero()
    };

    acc.material_total += material_cost;
    acc.process_total += process.total;
    acc.process_lines.extend(process.lines);
    acc.lines.push(BomLineCost {
        line_type: BomLineType::Part,
        code: part.part_code.clone(),
        name: part.name.clone(),
        qty_total: Decimal::from(part_qty),
        uom: "pc".to_string(),
        unit_cost,
        line_total,
        material_cost,
        process_cost: process.total,
        sheet_spec: sheet.as_ref().map(|s| s.sheet_spec.clone()),
        pieces_per_sheet: sheet.as_ref().map(|s| s.pieces_per_sheet),
        sheets_needed: sheet.as_ref().map(|s| s.sheets_needed),
        optional: line.optional,
    });
}

/// Picks the recommended sheet, or the engineering override when it names a
/// candidate. Every candidate is recorded as an alternative.
fn choose_sheet(
    options: &[SheetOption],
    part: &Part,
    part_qty: u64,
    params: &QuoteParams,
    acc: &mut Accumulator,
) -> Option<SheetEvaluation> {
    let rows = evaluate_sheet_options(options, part, part_qty);
    if rows.is_empty() {
        acc.warnings.push(QuoteWarning::NoSheetOptions {
            part_code: part.part_code.clone(),
        });
        return None;
    }

    acc.alternatives.extend(rows.iter().map(|row| SheetAlternative {
        part_code: part.part_code.clone(),
        sheet_spec: row.sheet_spec.clone(),
        sheet_price: row.sheet_price,
        pieces_per_sheet: row.pieces_per_sheet,
        sheets_needed: row.sheets_needed,
        material_cost: row.material_cost,
    }));

    if let Some(over) = params.sheet_overrides.get(&part.part_code) {
        match rows.iter().find(|row| row.sheet_spec == over.sheet_spec) {
            Some(row) => {
                return Some(evaluate_sheet_option(
                    &row.option,
                    part,
                    part_qty,
                    over.pieces_per_sheet,
                ))
            }
            None => acc.warnings.push(QuoteWarning::UnknownSheetSpec {
                part_code: part.part_code.clone(),
                sheet_spec: over.sheet_spec.clone(),
            }),
        }
    }

    rows.into_iter().next()
}

fn cost_purchased(
    master: &dyn MasterData,
    line: &BomLine,
    params: &QuoteParams,
    acc: &mut Accumulator,
) {
    let Some(item) = master.purchased_item(&line.code) else {
        acc.warnings.push(QuoteWarning::UnknownPurchasedItem {
            code: line.code.clone(),
        });
        return;
    };

    let base_qty = Decimal::from(params.qty) * line.qty_per_unit_or_one();
    let total_qty = match item.moq_qty {
        Some(moq) if moq > Decimal::ZERO => base_qty.max(moq),
        _ => base_qty,
    };
    let line_total = item
        .unit_cost
        .scale(total_qty * (Decimal::ONE + item.waste_pct.ratio()));

    acc.purchased_total += line_total;
    acc.lines.push(BomLineCost {
        line_type: BomLineType::Purchased,
        code: item.item_code.clone(),
        name: item.name.clone(),
        qty_total: total_qty,
        uom: item.uom.clone(),
        unit_cost: item.unit_cost,
        line_total,
        material_cost: Money::zero(),
        process_cost: Money::zero(),
        sheet_spec: None,
        pieces_per_sheet: None,
        sheets_needed: None,
        optional: line.optional,
    });
}

fn cost_packaging(
    master: &dyn MasterData,
    product: &Product,
    line: &BomLine,
    params: &QuoteParams,
    acc: &mut Accumulator,
) {
    let Some(rule) = master.packaging_rule(&line.code) else {
        acc.warnings.push(QuoteWarning::UnknownPackaging {
            code: line.code.clone(),
        });
        return;
    };

    let total_qty = match rule {
        PackagingRule::PerUnit(unit) => {
            Decimal::from(params.qty) * line.qty_per_unit.unwrap_or(unit.qty_per_unit)
        }
        PackagingRule::PerCarton(carton) => {
            let cartons = carton
                .units_per_carton
                .or(product.units_per_carton)
                .filter(|&units| units > 0)
                .map_or(0, |units| params.qty.div_ceil(units));
            Decimal::from(cartons) * carton.qty_per_carton
        }
    };
    let line_total = rule.unit_cost().scale(total_qty);

    acc.packaging_total += line_total;
    acc.lines.push(BomLineCost {
        line_type: BomLineType::Packaging,
        code: rule.item_code().to_string(),
        name: rule.item_code().to_string(),
        qty_total: total_qty,
        uom: "pack".to_string(),
        unit_cost: rule.unit_cost(),
        line_total,
        material_cost: Money::zero(),
        process_cost: Money::zero(),
        sheet_spec: None,
        pieces_per_sheet: None,
        sheets_needed: None,
        optional: line.optional,
    });
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::master::MasterDataSet;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn fixture() -> MasterDataSet {
        serde_json::from_value(serde_json::json!({
            "materials": [
                {
                    "code": "SPCC", "name": "Cold rolled steel", "pricing_mode": "by_sheet",
                    "sheet_options": [
                        { "sheet_length_mm": 2440, "sheet_width_mm": 1220, "thickness_mm": 1.5, "sheet_price": 380 },
                        { "sheet_length_mm": 2000, "sheet_width_mm": 1000, "thickness_mm": 1.5, "sheet_price": 200 }
                    ]
                },
                { "code": "AL6061", "name": "Aluminium bar", "price_per_kg": 30 }
            ],
            "processes": [
                { "code": "LASER", "name": "Laser cutting", "unit_rate_per_min": 1.5, "setup_cost": 50 },
                { "code": "BEND", "name": "Press brake", "unit_rate_per_min": 1.2, "setup_cost": 30 }
            ],
            "quantity_tiers": [
                { "label": "small", "min_qty": 1, "max_qty": 99, "multiplier": 1.2 },
                { "label": "standard", "min_qty": 100, "max_qty": 999, "multiplier": 1.0 },
                { "label": "bulk", "min_qty": 1000, "multiplier": 0.9 }
            ],
            "parts": [
                {
                    "part_code": "P-PANEL", "name": "Side panel", "material_code": "SPCC",
                    "thickness_mm": 1.5, "blank_length_mm": 300, "blank_width_mm": 200,
                    "process_steps": [
                        { "process_code": "LASER", "minutes_per_unit": 0.5 },
                        { "process_code": "BEND", "minutes_per_unit": 0.25 }
                    ]
                },
                {
                    "part_code": "P-BLOCK", "name": "Hinge block", "material_code": "AL6061",
                    "weight_kg_per_unit": 0.2,
                    "process_steps": [
                        { "process_code": "BEND", "minutes_per_unit": 0.1 },
                        { "process_code": "LASER", "minutes_per_unit": 9, "enabled": false }
                    ]
                }
            ],
            "purchased_items": [
                { "item_code": "SCR-M4", "name": "M4 screw", "unit_cost": 0.05, "uom": "pc",
                  "waste_pct": 0.02, "moq_qty": 1000 },
                { "item_code": "HNG", "name": "Concealed hinge", "unit_cost": 2.5, "uom": "pc" }
            ],
            "packaging_rules": {
                "per_unit": [ { "item_code": "BAG", "unit_cost": 0.1, "qty_per_unit": 1 } ],
                "per_carton": [ { "item_code": "CTN", "unit_cost": 3, "qty_per_carton": 1 } ]
            },
            "products": [
                {
                    "sku": "HB-200", "name": "Hinge box", "units_per_carton": 20,
                    "bom_lines": [
                        { "type": "part", "code": "P-PANEL", "qty_per_unit": 2 },
                        { "type": "part", "code": "P-BLOCK" },
                        { "type": "purchased", "code": "SCR-M4", "qty_per_unit": 8 },
                        { "type": "purchased", "code": "HNG", "qty_per_unit": 2, "optional": true },
                        { "type": "packaging", "code": "BAG" },
                        { "type": "packaging", "code": "CTN" }
                    ]
                },
                {
                    "sku": "BROKEN", "name": "Dangling references",
                    "bom_lines": [
                        { "type": "part", "code": "P-NOPE" },
                        { "type": "purchased", "code": "X-NOPE" },
                        { "type": "packaging", "code": "CTN" },
                        { "type": "packaging", "code": "BOX-NOPE" }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    fn params(qty: u64) -> QuoteParams {
        QuoteParams {
            shipping_per_order: Money::from_cents(12000),
            ..QuoteParams::from_settings(&Settings::default(), qty)
        }
    }

    fn quote(sku: &str, params: &QuoteParams) -> ProductQuote {
        let master = fixture();
        let product = master.product(sku).unwrap().clone();
        compute_product_quote(&master, &product, params).unwrap()
    }

    #[test]
    fn test_bom_lines() {
        let q = quote("HB-200", &params(100));
        let totals: Vec<(&str, Decimal, Decimal)> = q
            .bom_lines
            .iter()
            .map(|l| (l.code.as_str(), l.qty_total, l.line_total.amount()))
            .collect();

        assert_eq!(
            totals,
            vec![
                ("P-PANEL", dec!(200), dec!(2290)),
                ("P-BLOCK", dec!(100), dec!(660)),
                ("SCR-M4", dec!(1000), dec!(51)),
                ("HNG", dec!(200), dec!(500)),
                ("BAG", dec!(100), dec!(10)),
                ("CTN", dec!(5), dec!(15)),
            ]
        );
        assert!(q.warnings.is_empty());

        let panel = &q.bom_lines[0];
        assert_eq!(panel.sheet_spec.as_deref(), Some("2000x1000x1.5mm"));
        assert_eq!(panel.pieces_per_sheet, Some(22));
        assert_eq!(panel.sheets_needed, Some(10));
        assert_eq!(panel.material_cost.amount(), dec!(2000));
        assert_eq!(panel.process_cost.amount(), dec!(290));
        assert_eq!(panel.unit_cost.amount(), dec!(11.45));
        assert!(q.bom_lines[3].optional);
    }

    #[test]
    fn test_cost_summary_gross_margin() {
        let q = quote("HB-200", &params(100));
        let s = q.summary;

        assert_eq!(s.material_total.amount(), dec!(2618));
        assert_eq!(s.process_total.amount(), dec!(332));
        assert_eq!(s.purchased_total.amount(), dec!(551));
        assert_eq!(s.packaging_total.amount(), dec!(25));
        assert_eq!(s.subtotal.amount(), dec!(3646));
        assert_eq!(s.overhead.amount(), dec!(182.3));
        assert_eq!(s.pre_tax.amount(), dec!(3828.3));
        assert_eq!(s.tax.amount(), dec!(497.679));
        assert_eq!(s.total_cost.amount(), dec!(4325.979));
        assert_eq!(s.multiplier, dec!(1.0));
        assert_eq!(s.final_price_total.round_cents().amount(), dec!(5275.58));
        assert_eq!(s.unit_price.round_cents().amount(), dec!(52.76));
        assert_eq!(q.tier.unwrap().label, "standard");
    }

    #[test]
    fn test_markup_mode() {
        let q = quote(
            "HB-200",
            &QuoteParams {
                pricing_mode: PricingMode::Markup,
                ..params(100)
            },
        );
        assert_eq!(q.summary.final_price_total.amount(), dec!(5104.65522));
        assert_eq!(q.summary.unit_price.amount(), dec!(51.0465522));
    }

    #[test]
    fn test_full_margin_leaves_cost_unchanged() {
        let q = quote(
            "HB-200",
            &QuoteParams {
                margin_pct: Rate::from_ratio(dec!(1)),
                ..params(100)
            },
        );
        assert_eq!(q.summary.final_price_total, q.summary.total_cost);
    }

    #[test]
    fn test_tier_multiplier_applies() {
        let q = quote(
            "HB-200",
            &QuoteParams {
                pricing_mode: PricingMode::Markup,
                margin_pct: Rate::zero(),
                ..params(1000)
            },
        );
        assert_eq!(q.summary.multiplier, dec!(0.9));
        assert_eq!(
            q.summary.final_price_total,
            q.summary.total_cost.scale(dec!(0.9))
        );
    }

    #[test]
    fn test_sheet_alternatives_recorded() {
        let q = quote("HB-200", &params(100));
        let specs: Vec<(&str, Decimal)> = q
            .sheet_alternatives
            .iter()
            .map(|a| (a.sheet_spec.as_str(), a.material_cost.amount()))
            .collect();
        assert_eq!(
            specs,
            vec![("2000x1000x1.5mm", dec!(2000)), ("2440x1220x1.5mm", dec!(2280))]
        );
    }

    #[test]
    fn test_sheet_override() {
        let (part, over) = parse_sheet_override("P-PANEL=2440x1220x1.5mm:40").unwrap();
        let mut p = params(100);
        p.sheet_overrides.insert(part, over);

        let q = quote("HB-200", &p);
        let panel = &q.bom_lines[0];
        assert_eq!(panel.sheet_spec.as_deref(), Some("2440x1220x1.5mm"));
        assert_eq!(panel.sheets_needed, Some(5));
        assert_eq!(panel.material_cost.amount(), dec!(1900));
    }

    #[test]
    fn test_unknown_sheet_override_falls_back() {
        let (part, over) = parse_sheet_override("P-PANEL=1x1x1mm").unwrap();
        let mut p = params(100);
        p.sheet_overrides.insert(part, over);

        let q = quote("HB-200", &p);
        assert_eq!(q.bom_lines[0].sheet_spec.as_deref(), Some("2000x1000x1.5mm"));
        assert!(matches!(q.warnings[0], QuoteWarning::UnknownSheetSpec { .. }));
    }

    #[test]
    fn test_dangling_references_become_warnings() {
        let q = quote("BROKEN", &params(10));

        assert_eq!(
            q.warnings,
            vec![
                QuoteWarning::UnknownPart {
                    code: "P-NOPE".to_string()
                },
                QuoteWarning::UnknownPurchasedItem {
                    code: "X-NOPE".to_string()
                },
                QuoteWarning::UnknownPackaging {
                    code: "BOX-NOPE".to_string()
                },
            ]
        );
        // CTN has no carton size on the rule or the product: zero cartons.
        assert_eq!(q.bom_lines.len(), 1);
        assert!(q.bom_lines[0].line_total.is_zero());
        assert_eq!(q.summary.subtotal.amount(), dec!(120));
    }

    #[test]
    fn test_unpriceable_part_quantity_is_reported() {
        let master = fixture();
        let mut product = master.product("HB-200").unwrap().clone();
        product.bom_lines[0].qty_per_unit = Some(dec!(-2));
        product.bom_lines[1].qty_per_unit = Some(Decimal::MAX);

        let q = compute_product_quote(&master, &product, &params(10)).unwrap();

        assert_eq!(
            q.warnings,
            vec![
                QuoteWarning::UnpricedPartQuantity {
                    code: "P-PANEL".to_string(),
                    qty_per_unit: dec!(-2),
                },
                QuoteWarning::UnpricedPartQuantity {
                    code: "P-BLOCK".to_string(),
                    qty_per_unit: Decimal::MAX,
                },
            ]
        );
        assert_eq!(
            q.warnings[0].to_string(),
            "part P-PANEL: quantity per unit -2 cannot be priced"
        );
        assert!(q.bom_lines.iter().all(|line| line.code != "P-PANEL" && line.code != "P-BLOCK"));
        assert!(q.summary.material_total.is_zero());
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let master = fixture();
        let product = master.product("HB-200").unwrap().clone();

        let zero_qty = compute_product_quote(&master, &product, &params(0));
        assert!(matches!(zero_qty, Err(CoreError::Validation(_))));

        let bad_rate = QuoteParams {
            tax_pct: Rate::from_ratio(dec!(1.5)),
            ..params(10)
        };
        assert!(compute_product_quote(&master, &product, &bad_rate).is_err());

        let bad_shipping = QuoteParams {
            shipping_per_order: Money::from_cents(-1),
            ..params(10)
        };
        assert!(compute_product_quote(&master, &product, &bad_shipping).is_err());
    }

    #[test]
    fn test_parse_sheet_override_errors() {
        assert!(parse_sheet_override("no-equals").is_err());
        assert!(parse_sheet_override("P=").is_err());
        assert!(parse_sheet_override("P=2440x1220x1.5mm:many").is_err());

        let (_, o) = parse_sheet_override(" P = 2440x1220x1.5mm ").unwrap();
        assert_eq!(o.sheet_spec, "2440x1220x1.5mm");
        assert!(o.pieces_per_sheet.is_none());
    }
}
