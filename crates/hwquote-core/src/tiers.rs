//! Quantity tier lookup.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::master::QuantityTier;

/// Result of a tier lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierMatch {
    pub multiplier: Decimal,
    /// `None` only when no tiers are configured.
    pub tier: Option<QuantityTier>,
}

/// Finds the price multiplier for an order quantity.
///
/// ## Rules
/// ```text
/// tiers sorted by min_qty (stable)
///   candidate: min_qty <= qty && (max_qty absent || qty <= max_qty)
///   last candidate wins
/// no candidate, tiers present → tier with the smallest min_qty
/// no tiers                    → multiplier 1, no tier
/// ```
pub fn find_multiplier(tiers: &[QuantityTier], qty: u64) -> TierMatch {
    let mut sorted: Vec<&QuantityTier> = tiers.iter().collect();
    sorted.sort_by_key(|t| t.min_qty);

    let candidate = sorted
        .iter()
        .rev()
        .find(|t| qty >= t.min_qty && t.max_qty.map_or(true, |max| qty <= max))
        .or_else(|| sorted.first());

    match candidate {
        Some(tier) => TierMatch {
            multiplier: tier.multiplier,
            tier: Some((*tier).clone()),
        },
        None => TierMatch {
            multiplier: Decimal::ONE,
            tier: None,
        },
    }
}
