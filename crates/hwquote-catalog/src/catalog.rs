//! # Catalog
//!
//! The loaded data file with code-keyed indexes over its master data.
//!
//! ## Lookups
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog                                         │
//! │                                                                         │
//! │  items: Vec<ItemRecord>          file order, duplicates kept            │
//! │  master: MasterDataSet           as deserialized                        │
//! │                                                                         │
//! │  indexes (built once):                                                  │
//! │    material code  ──► materials[i]                                      │
//! │    process code   ──► processes[i]                                      │
//! │    part code      ──► parts[i]                                          │
//! │    item code      ──► purchased_items[i]                                │
//! │    sku            ──► products[i]                                       │
//! │                                                                         │
//! │  A repeated code indexes its last occurrence.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fmt;

use hwquote_core::master::{
    BomLineType, MasterData, MasterDataSet, Material, PackagingRule, Part, Process, Product,
    PurchasedItem, QuantityTier, Settings,
};
use hwquote_core::validation::find_duplicate_ids;
use hwquote_core::{compute_quotes, CatalogTotals, ItemRecord, QuotedItemRecord};
use serde::Serialize;

use crate::error::{CatalogError, CatalogResult};

/// An item record the lenient loader dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Position in the data file's item list.
    pub index: usize,
    pub id: String,
    pub reason: String,
}

/// A code that points at nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    /// SKU or part code holding the reference.
    pub owner: String,
    pub kind: ReferenceKind,
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Part,
    PurchasedItem,
    Packaging,
    Material,
    Process,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Part => "part",
            ReferenceKind::PurchasedItem => "purchased_item",
            ReferenceKind::Packaging => "packaging",
            ReferenceKind::Material => "material",
            ReferenceKind::Process => "process",
        };
        write!(f, "{}", name)
    }
}

fn index_by<T>(records: &[T], key: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| (key(record).to_string(), i))
        .collect()
}

/// The loaded data file.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<ItemRecord>,
    master: MasterDataSet,
    skipped: Vec<SkippedRecord>,
    materials: HashMap<String, usize>,
    processes: HashMap<String, usize>,
    parts: HashMap<String, usize>,
    purchased_items: HashMap<String, usize>,
    products: HashMap<String, usize>,
}

impl Catalog {
    /// Builds the indexes over already-parsed data.
    pub fn new(items: Vec<ItemRecord>, master: MasterDataSet, skipped: Vec<SkippedRecord>) -> Self {
        Catalog {
            materials: index_by(&master.materials, |m| m.code.as_str()),
            processes: index_by(&master.processes, |p| p.code.as_str()),
            parts: index_by(&master.parts, |p| p.part_code.as_str()),
            purchased_items: index_by(&master.purchased_items, |i| i.item_code.as_str()),
            products: index_by(&master.products, |p| p.sku.as_str()),
            items,
            master,
            skipped,
        }
    }

    /// Item records in data file order.
    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    /// Item records with their derived pricing fields, in data file order.
    pub fn quoted_items(&self) -> Vec<QuotedItemRecord> {
        compute_quotes(self.items.iter().cloned())
    }

    /// Quoted items plus their footer totals.
    pub fn quoted_items_with_totals(&self) -> (Vec<QuotedItemRecord>, CatalogTotals) {
        let rows = self.quoted_items();
        let totals = CatalogTotals::from(rows.as_slice());
        (rows, totals)
    }

    pub fn master(&self) -> &MasterDataSet {
        &self.master
    }

    /// Records the lenient loader dropped.
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    /// Products in data file order.
    pub fn products(&self) -> &[Product] {
        &self.master.products
    }

    /// Looks up a product by SKU.
    pub fn product(&self, sku: &str) -> CatalogResult<&Product> {
        self.products
            .get(sku)
            .map(|&i| &self.master.products[i])
            .ok_or_else(|| CatalogError::not_found("Product", sku))
    }

    /// Item ids that occur more than once.
    pub fn duplicate_ids(&self) -> Vec<String> {
        find_duplicate_ids(&self.items)
    }

    /// BOM lines, parts and process steps whose codes resolve to nothing.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        let mut push = |owner: &str, kind: ReferenceKind, code: &str| {
            dangling.push(DanglingReference {
                owner: owner.to_string(),
                kind,
                code: code.to_string(),
            })
        };

        for product in &self.master.products {
            for line in &product.bom_lines {
                let (kind, found) = match line.line_type {
                    BomLineType::Part => (ReferenceKind::Part, self.part(&line.code).is_some()),
                    BomLineType::Purchased => (
                        ReferenceKind::PurchasedItem,
                        self.purchased_item(&line.code).is_some(),
                    ),
                    BomLineType::Packaging => (
                        ReferenceKind::Packaging,
                        self.packaging_rule(&line.code).is_some(),
                    ),
                };
                if !found {
                    push(&product.sku, kind, &line.code);
                }
            }
        }

        for part in &self.master.parts {
            if self.material(&part.material_code).is_none() {
                push(&part.part_code, ReferenceKind::Material, &part.material_code);
            }
            for step in &part.process_steps {
                if self.process(&step.process_code).is_none() {
                    push(&part.part_code, ReferenceKind::Process, &step.process_code);
                }
            }
        }

        dangling
    }
}

impl MasterData for Catalog {
    fn settings(&self) -> &Settings {
        &self.master.settings
    }

    fn material(&self, code: &str) -> Option<&Material> {
        self.materials.get(code).map(|&i| &self.master.materials[i])
    }

    fn process(&self, code: &str) -> Option<&Process> {
        self.processes.get(code).map(|&i| &self.master.processes[i])
    }

    fn part(&self, code: &str) -> Option<&Part> {
        self.parts.get(code).map(|&i| &self.master.parts[i])
    }

    fn purchased_item(&self, code: &str) -> Option<&PurchasedItem> {
        self.purchased_items
            .get(code)
            .map(|&i| &self.master.purchased_items[i])
    }

    fn packaging_rule(&self, code: &str) -> Option<PackagingRule<'_>> {
        self.master.packaging_rules.resolve(code)
    }

    fn quantity_tiers(&self) -> &[QuantityTier] {
        &self.master.quantity_tiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_from_str, LoadMode};
    use hwquote_core::{compute_product_quote, QuoteParams};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const DATA: &str = r#"{
        "materials": [ { "code": "AL6061", "price_per_kg": 30 } ],
        "processes": [
            { "code": "CNC", "name": "Milling", "unit_rate_per_min": 2 },
            { "code": "CNC", "name": "Milling (2024 rate)", "unit_rate_per_min": 2.5 }
        ],
        "parts": [
            { "part_code": "P-BLOCK", "material_code": "AL6061", "weight_kg_per_unit": 0.5,
              "process_steps": [ { "process_code": "CNC", "minutes_per_unit": 2 },
                                 { "process_code": "ANODIZE", "minutes_per_unit": 1 } ] },
            { "part_code": "P-ODD", "material_code": "TI-GR5" }
        ],
        "purchased_items": [ { "item_code": "SCR", "unit_cost": 0.1 } ],
        "packaging_rules": { "per_unit": [ { "item_code": "BAG", "unit_cost": 0.2 } ] },
        "products": [
            { "sku": "KNOB", "name": "Control knob",
              "bom_lines": [ { "type": "part", "code": "P-BLOCK" },
                             { "type": "purchased", "code": "SCR", "qty_per_unit": 2 },
                             { "type": "packaging", "code": "BAG" },
                             { "type": "packaging", "code": "CTN" } ] }
        ],
        "items": [
            { "id": "A", "name": "a", "category": "c", "material": "m",
              "unit_material_cost": 10, "unit_labor_cost": 5,
              "overhead_pct": 0.1, "profit_pct": 0.2, "tax_pct": 0.13, "quantity": 2 },
            { "id": "B", "name": "b", "category": "c", "material": "m",
              "unit_material_cost": 1, "unit_labor_cost": 0,
              "overhead_pct": 0, "profit_pct": 0, "tax_pct": 0, "quantity": 3 }
        ]
    }"#;

    fn catalog() -> Catalog {
        load_from_str(DATA, LoadMode::Strict).unwrap()
    }

    #[test]
    fn test_product_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.product("KNOB").unwrap().name, "Control knob");
        assert!(matches!(
            catalog.product("NOPE"),
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[test]
    fn test_repeated_code_indexes_last_occurrence() {
        let catalog = catalog();
        let process = catalog.process("CNC").unwrap();
        assert_eq!(process.unit_rate_per_min.amount(), dec!(2.5));
    }

    #[test]
    fn test_quoted_items_with_totals() {
        let (rows, totals) = catalog().quoted_items_with_totals();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].quote.quote_total.amount(), dec!(44.748));
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_quantity, 5);
        assert_eq!(totals.quote_total.amount(), dec!(47.748));
    }

    #[test]
    fn test_dangling_references() {
        let found: Vec<(String, ReferenceKind, String)> = catalog()
            .dangling_references()
            .into_iter()
            .map(|d| (d.owner, d.kind, d.code))
            .collect();

        assert_eq!(
            found,
            vec![
                ("KNOB".to_string(), ReferenceKind::Packaging, "CTN".to_string()),
                ("P-BLOCK".to_string(), ReferenceKind::Process, "ANODIZE".to_string()),
                ("P-ODD".to_string(), ReferenceKind::Material, "TI-GR5".to_string()),
            ]
        );
    }

    #[test]
    fn test_catalog_drives_product_quote() {
        let catalog = catalog();
        let product = catalog.product("KNOB").unwrap();
        let params = QuoteParams::from_settings(catalog.settings(), 10);

        let quote = compute_product_quote(&catalog, product, &params).unwrap();

        // block: 10 × 0.5 kg × 30 × 1.03 = 154.5, CNC 2 × 2.5 × 10 = 50
        assert_eq!(quote.summary.material_total.amount(), dec!(154.5));
        assert_eq!(quote.summary.process_total.amount(), dec!(50));
        assert_eq!(quote.summary.purchased_total.amount(), dec!(2));
        assert_eq!(quote.summary.packaging_total.amount(), dec!(2));
        assert_eq!(quote.warnings.len(), 1);
    }
}
