//! # Master Data
//!
//! Reference data a product quote is priced from: settings, materials,
//! processes, parts, purchased items, packaging rules, products and
//! quantity tiers.
//!
//! ## Lookup Seam
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   compute_product_quote(&dyn MasterData, &Product, &QuoteParams)        │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │        ┌─────────────────┐                                              │
//! │        │   MasterData    │  trait: code → record lookups                │
//! │        └────────┬────────┘                                              │
//! │                 │                                                       │
//! │       ┌─────────┴──────────┐                                            │
//! │       ▼                    ▼                                            │
//! │  MasterDataSet        Catalog (hwquote-catalog)                         │
//! │  linear scans,        HashMap indexes built once                        │
//! │  used in tests        at load time                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every section and most fields default when absent, so a data file only
//! has to carry what it uses. When a code appears twice, the later entry wins.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;
use crate::types::Rate;

// =============================================================================
// Settings
// =============================================================================

/// Quote defaults taken from the data file's `settings` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Default overhead rate for product quotes.
    #[serde(default = "default_management_fee_pct")]
    pub management_fee_pct: Rate,

    #[serde(default = "default_tax_pct")]
    pub tax_pct: Rate,

    /// Default margin for product quotes.
    #[serde(default = "default_profit_pct")]
    pub default_profit_pct: Rate,

    /// Default scrap rate for by-weight materials.
    #[serde(default = "default_wastage_pct")]
    pub wastage_pct: Rate,

    #[serde(default = "default_freight_cost_per_order")]
    pub freight_cost_per_order: Money,

    #[serde(default = "default_packaging_cost_per_unit")]
    pub packaging_cost_per_unit: Money,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_management_fee_pct() -> Rate {
    Rate::from_bps(500)
}

fn default_tax_pct() -> Rate {
    Rate::from_bps(1300)
}

fn default_profit_pct() -> Rate {
    Rate::from_bps(1800)
}

fn default_wastage_pct() -> Rate {
    Rate::from_bps(300)
}

fn default_freight_cost_per_order() -> Money {
    Money::from_cents(12000)
}

fn default_packaging_cost_per_unit() -> Money {
    Money::from_cents(60)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            management_fee_pct: default_management_fee_pct(),
            tax_pct: default_tax_pct(),
            default_profit_pct: default_profit_pct(),
            wastage_pct: default_wastage_pct(),
            freight_cost_per_order: default_freight_cost_per_order(),
            packaging_cost_per_unit: default_packaging_cost_per_unit(),
        }
    }
}

// =============================================================================
// Materials
// =============================================================================

/// How a material's cost is derived for a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialPricingMode {
    /// Part weight × price per kg × (1 + scrap).
    #[default]
    ByWeight,
    /// Whole sheets, chosen by nesting the blank.
    BySheet,
}

impl fmt::Display for MaterialPricingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialPricingMode::ByWeight => write!(f, "by_weight"),
            MaterialPricingMode::BySheet => write!(f, "by_sheet"),
        }
    }
}

/// A purchasable stock sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetOption {
    #[serde(default)]
    pub sheet_length_mm: f64,
    #[serde(default)]
    pub sheet_width_mm: f64,
    #[serde(default)]
    pub thickness_mm: f64,
    #[serde(default)]
    pub sheet_price: Money,
}

impl SheetOption {
    /// Display label, e.g. `2440x1220x1.5mm`.
    pub fn spec_label(&self) -> String {
        format!(
            "{}x{}x{}mm",
            self.sheet_length_mm, self.sheet_width_mm, self.thickness_mm
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub density_g_cm3: Option<Decimal>,
    #[serde(default)]
    pub price_per_kg: Money,
    #[serde(default)]
    pub surface_finish: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub pricing_mode: MaterialPricingMode,
    #[serde(default)]
    pub sheet_options: Vec<SheetOption>,
}

// =============================================================================
// Processes & Parts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit_rate_per_min: Money,
    #[serde(default)]
    pub setup_cost: Money,
    #[serde(default)]
    pub description: String,
}

/// One routing step of a manufactured part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub process_code: String,
    #[serde(default)]
    pub minutes_per_unit: Decimal,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// A part manufactured in-house from sheet or bar stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub part_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub material_code: String,
    #[serde(default)]
    pub thickness_mm: f64,
    #[serde(default)]
    pub blank_length_mm: f64,
    #[serde(default)]
    pub blank_width_mm: f64,
    #[serde(default = "default_true")]
    pub allow_rotate: bool,
    #[serde(default = "default_edge_margin_mm")]
    pub edge_margin_mm: f64,
    #[serde(default = "default_kerf_mm")]
    pub kerf_mm: f64,
    #[serde(default = "default_nest_efficiency")]
    pub nest_efficiency: f64,
    /// Finished weight, used when the material is priced by weight.
    #[serde(default)]
    pub weight_kg_per_unit: Option<Decimal>,
    #[serde(default)]
    pub process_steps: Vec<ProcessStep>,
}

fn default_true() -> bool {
    true
}

fn default_edge_margin_mm() -> f64 {
    10.0
}

fn default_kerf_mm() -> f64 {
    2.0
}

fn default_nest_efficiency() -> f64 {
    0.85
}

// =============================================================================
// Purchased Items & Packaging
// =============================================================================

/// A bought-in component (fasteners, hinges, gaskets).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasedItem {
    pub item_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit_cost: Money,
    #[serde(default)]
    pub uom: String,
    #[serde(default)]
    pub waste_pct: Rate,
    /// Minimum order quantity; ignored when absent or not positive.
    #[serde(default)]
    pub moq_qty: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerUnitPackaging {
    pub item_code: String,
    #[serde(default)]
    pub unit_cost: Money,
    #[serde(default = "default_one")]
    pub qty_per_unit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerCartonPackaging {
    pub item_code: String,
    #[serde(default)]
    pub unit_cost: Money,
    #[serde(default = "default_one")]
    pub qty_per_carton: Decimal,
    /// Overrides the product's carton size when set.
    #[serde(default)]
    pub units_per_carton: Option<u64>,
}

fn default_one() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackagingRules {
    #[serde(default)]
    pub per_unit: Vec<PerUnitPackaging>,
    #[serde(default)]
    pub per_carton: Vec<PerCartonPackaging>,
}

/// A resolved packaging rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagingRule<'a> {
    PerUnit(&'a PerUnitPackaging),
    PerCarton(&'a PerCartonPackaging),
}

impl PackagingRules {
    /// Finds the rule for a packaging code. Per-carton rules shadow
    /// per-unit rules with the same code.
    pub fn resolve(&self, code: &str) -> Option<PackagingRule<'_>> {
        if let Some(rule) = self.per_carton.iter().rev().find(|r| r.item_code == code) {
            return Some(PackagingRule::PerCarton(rule));
        }
        self.per_unit
            .iter()
            .rev()
            .find(|r| r.item_code == code)
            .map(PackagingRule::PerUnit)
    }
}

impl PackagingRule<'_> {
    pub fn item_code(&self) -> &str {
        match self {
            PackagingRule::PerUnit(rule) => &rule.item_code,
            PackagingRule::PerCarton(rule) => &rule.item_code,
        }
    }

    pub fn unit_cost(&self) -> Money {
        match self {
            PackagingRule::PerUnit(rule) => rule.unit_cost,
            PackagingRule::PerCarton(rule) => rule.unit_cost,
        }
    }
}

// =============================================================================
// Quantity Tiers
// =============================================================================

/// A price multiplier band keyed on order quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityTier {
    #[serde(default)]
    pub label: String,
    pub min_qty: u64,
    /// Inclusive upper bound; open-ended when absent.
    #[serde(default)]
    pub max_qty: Option<u64>,
    pub multiplier: Decimal,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BomLineType {
    Part,
    Purchased,
    Packaging,
}

impl fmt::Display for BomLineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BomLineType::Part => write!(f, "part"),
            BomLineType::Purchased => write!(f, "purchased"),
            BomLineType::Packaging => write!(f, "packaging"),
        }
    }
}

/// One line of a product's bill of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomLine {
    #[serde(rename = "type")]
    pub line_type: BomLineType,
    pub code: String,
    /// Quantity per finished unit. Absent means 1, except for per-unit
    /// packaging where the rule's own quantity applies.
    #[serde(default)]
    pub qty_per_unit: Option<Decimal>,
    #[serde(default)]
    pub optional: bool,
}

impl BomLine {
    pub fn qty_per_unit_or_one(&self) -> Decimal {
        self.qty_per_unit.unwrap_or(Decimal::ONE)
    }
}

/// A finished good with its bill of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub units_per_carton: Option<u64>,
    #[serde(default)]
    pub bom_lines: Vec<BomLine>,
}

// =============================================================================
// MasterData Trait
// =============================================================================

/// Code-keyed lookups over master data.
///
/// Implemented by [`MasterDataSet`] and by the catalog crate's indexed
/// `Catalog`. Lookups return `None` for unknown codes; the product quote
/// turns those into warnings.
pub trait MasterData {
    fn settings(&self) -> &Settings;
    fn material(&self, code: &str) -> Option<&Material>;
    fn process(&self, code: &str) -> Option<&Process>;
    fn part(&self, code: &str) -> Option<&Part>;
    fn purchased_item(&self, code: &str) -> Option<&PurchasedItem>;
    fn packaging_rule(&self, code: &str) -> Option<PackagingRule<'_>>;
    fn quantity_tiers(&self) -> &[QuantityTier];
}

/// All master data sections, as they appear in the data file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MasterDataSet {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub processes: Vec<Process>,
    #[serde(default)]
    pub quantity_tiers: Vec<QuantityTier>,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub purchased_items: Vec<PurchasedItem>,
    #[serde(default)]
    pub packaging_rules: PackagingRules,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl MasterDataSet {
    pub fn product(&self, sku: &str) -> Option<&Product> {
        self.products.iter().rev().find(|p| p.sku == sku)
    }
}

impl MasterData for MasterDataSet {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn material(&self, code: &str) -> Option<&Material> {
        self.materials.iter().rev().find(|m| m.code == code)
    }

    fn process(&self, code: &str) -> Option<&Process> {
        self.processes.iter().rev().find(|p| p.code == code)
    }

    fn part(&self, code: &str) -> Option<&Part> {
        self.parts.iter().rev().find(|p| p.part_code == code)
    }

    fn purchased_item(&self, code: &str) -> Option<&PurchasedItem> {
        self.purchased_items.iter().rev().find(|i| i.item_code == code)
    }

    fn packaging_rule(&self, code: &str) -> Option<PackagingRule<'_>> {
        self.packaging_rules.resolve(code)
    }

    fn quantity_tiers(&self) -> &[QuantityTier] {
        &self.quantity_tiers
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
