//! # Sheet Nesting
//!
//! Estimates how many blanks fit on a stock sheet and how many sheets an
//! order needs.
//!
//! ## Grid Layout
//! ```text
//! ┌──────────────────── sheet_length ────────────────────┐
//! │ edge_margin                                           │
//! │   ┌──────┐ ┌──────┐ ┌──────┐ ┌──────┐                 │
//! │   │blank │k│blank │k│blank │k│blank │  ...            │  count_a: blanks
//! │   └──────┘ └──────┘ └──────┘ └──────┘                 │  as drawn
//! │   ┌──────┐ ┌──────┐ ┌──────┐ ┌──────┐                 │
//! │   │blank │ │blank │ │blank │ │blank │                 │  count_b: blanks
//! │   └──────┘ └──────┘ └──────┘ └──────┘                 │  rotated 90°
//! │                                           edge_margin │
//! └───────────────────────────────────────────────────────┘
//!   pitch = blank + kerf (k);   pieces = floor(max(a, b) × efficiency)
//! ```
//!
//! Geometry is in millimetres as `f64`; only the resulting counts feed the
//! decimal cost arithmetic.

use serde::Serialize;

use crate::master::{Part, SheetOption};
use crate::money::Money;

/// Nesting result for one sheet option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SheetLayout {
    pub count_a: u64,
    pub count_b: u64,
    pub raw_count: u64,
    pub pieces_per_sheet_calc: u64,
    pub pieces_per_sheet: u64,
    pub sheets_needed: u64,
}

/// A priced sheet option for a part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetEvaluation {
    pub sheet_spec: String,
    pub sheet_price: Money,
    pub pieces_per_sheet: u64,
    pub sheets_needed: u64,
    pub material_cost: Money,
    #[serde(skip)]
    pub option: SheetOption,
    #[serde(skip)]
    pub layout: SheetLayout,
}

fn fit(usable: f64, pitch: f64) -> u64 {
    if pitch > 0.0 {
        // Saturating cast; usable is never negative.
        (usable / pitch).floor() as u64
    } else {
        0
    }
}

/// Lays out `qty` pieces of `part` on `option`.
///
/// A positive `pieces_override` replaces the computed pieces per sheet.
pub fn compute_sheet_layout(
    option: &SheetOption,
    part: &Part,
    qty: u64,
    pieces_override: Option<u64>,
) -> SheetLayout {
    let usable_l = (option.sheet_length_mm - 2.0 * part.edge_margin_mm).max(0.0);
    let usable_w = (option.sheet_width_mm - 2.0 * part.edge_margin_mm).max(0.0);
    let pitch_l = part.blank_length_mm + part.kerf_mm;
    let pitch_w = part.blank_width_mm + part.kerf_mm;

    let count_a = fit(usable_l, pitch_l) * fit(usable_w, pitch_w);
    let count_b = if part.allow_rotate {
        fit(usable_l, pitch_w) * fit(usable_w, pitch_l)
    } else {
        0
    };

    let raw_count = count_a.max(count_b);
    let pieces_per_sheet_calc = if raw_count > 0 {
        ((raw_count as f64 * part.nest_efficiency).floor() as u64).max(1)
    } else {
        1
    };

    let pieces_per_sheet = match pieces_override {
        Some(pieces) if pieces > 0 => pieces,
        _ => pieces_per_sheet_calc,
    };

    SheetLayout {
        count_a,
        count_b,
        raw_count,
        pieces_per_sheet_calc,
        pieces_per_sheet,
        sheets_needed: qty.div_ceil(pieces_per_sheet),
    }
}

/// Prices one sheet option for a part, optionally with a pieces override.
pub fn evaluate_sheet_option(
    option: &SheetOption,
    part: &Part,
    qty: u64,
    pieces_override: Option<u64>,
) -> SheetEvaluation {
    let layout = compute_sheet_layout(option, part, qty, pieces_override);
    SheetEvaluation {
        sheet_spec: option.spec_label(),
        sheet_price: option.sheet_price,
        pieces_per_sheet: layout.pieces_per_sheet,
        sheets_needed: layout.sheets_needed,
        material_cost: option.sheet_price * layout.sheets_needed,
        option: option.clone(),
        layout,
    }
}

/// Prices the sheet options closest in thickness to the part.
///
/// Returns the candidates sorted by material cost, cheapest first (ties
/// keep data file order). The first entry is the recommendation.
pub fn evaluate_sheet_options(
    options: &[SheetOption],
    part: &Part,
    qty: u64,
) -> Vec<SheetEvaluation> {
    let diff = |option: &SheetOption| (option.thickness_mm - part.thickness_mm).abs();

    let Some(min_diff) = options.iter().map(diff).min_by(f64::total_cmp) else {
        return Vec::new();
    };

    let mut rows: Vec<SheetEvaluation> = options
        .iter()
        .filter(|option| diff(*option) == min_diff)
        .map(|option| evaluate_sheet_option(option, part, qty, None))
        .collect();

    rows.sort_by_key(|row| row.material_cost);
    rows
}
