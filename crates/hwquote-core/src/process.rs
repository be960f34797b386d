//! Process (routing) costing for manufactured parts.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::master::{MasterData, ProcessStep};
use crate::money::Money;

/// Cost of one routing step for one part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessLine {
    pub part_code: String,
    pub process_code: String,
    /// Process name, or the code when the process is unknown.
    pub name: String,
    pub minutes_per_unit: Decimal,
    pub rate_per_min: Money,
    pub qty: u64,
    pub runtime_cost: Money,
    pub setup_cost: Money,
    pub total_cost: Money,
}

/// Summed routing cost of a part plus one row per costed step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProcessCost {
    pub total: Money,
    pub lines: Vec<ProcessLine>,
}

/// Costs the enabled steps of a part's routing for `qty` pieces.
///
/// ```text
/// runtime_cost = minutes_per_unit × rate_per_min × qty
/// total_cost   = runtime_cost + setup_cost          (setup once per step)
/// ```
///
/// Disabled steps are skipped. A step whose process code is unknown costs
/// nothing but still gets a row, named after its code.
pub fn compute_process_costs(
    steps: &[ProcessStep],
    master: &dyn MasterData,
    qty: u64,
    part_code: &str,
) -> ProcessCost {
    let lines: Vec<ProcessLine> = steps
        .iter()
        .filter(|step| step.enabled)
        .map(|step| {
            let process = master.process(&step.process_code);
            let rate_per_min = process.map(|p| p.unit_rate_per_min).unwrap_or_default();
            let setup_cost = process.map(|p| p.setup_cost).unwrap_or_default();
            let runtime_cost = rate_per_min.scale(step.minutes_per_unit) * qty;

            ProcessLine {
                part_code: part_code.to_string(),
                process_code: step.process_code.clone(),
                name: process
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| step.process_code.clone()),
                minutes_per_unit: step.minutes_per_unit,
                rate_per_min,
                qty,
                runtime_cost,
                setup_cost,
                total_cost: runtime_cost + setup_cost,
            }
        })
        .collect();

    ProcessCost {
        total: lines.iter().map(|line| line.total_cost).sum(),
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::{MasterDataSet, Process};
    use rust_decimal_macros::dec;

    fn master() -> MasterDataSet {
        MasterDataSet {
            processes: vec![
                Process {
                    code: "LASER".to_string(),
                    name: "Laser cutting".to_string(),
                    unit_rate_per_min: Money::from_cents(150),
                    setup_cost: Money::from_cents(5000),
                    description: String::new(),
                },
                Process {
                    code: "BEND".to_string(),
                    name: "Press brake".to_string(),
                    unit_rate_per_min: Money::from_cents(120),
                    setup_cost: Money::from_cents(3000),
                    description: String::new(),
                },
            ],
            ..MasterDataSet::default()
        }
    }

    fn step(code: &str, minutes: Decimal, enabled: bool) -> ProcessStep {
        ProcessStep {
            process_code: code.to_string(),
            minutes_per_unit: minutes,
            enabled,
        }
    }

    #[test]
    fn test_runtime_plus_setup() {
        let cost = compute_process_costs(
            &[step("LASER", dec!(0.5), true), step("BEND", dec!(0.25), true)],
            &master(),
            100,
            "P-100",
        );

        // LASER: 0.5 × 1.5 × 100 = 75 + 50 setup; BEND: 0.25 × 1.2 × 100 = 30 + 30
        assert_eq!(cost.lines.len(), 2);
        assert_eq!(cost.lines[0].runtime_cost.amount(), dec!(75));
        assert_eq!(cost.lines[0].total_cost.amount(), dec!(125));
        assert_eq!(cost.lines[1].total_cost.amount(), dec!(60));
        assert_eq!(cost.total.amount(), dec!(185));
        assert_eq!(cost.lines[0].part_code, "P-100");
    }

    #[test]
    fn test_disabled_steps_are_skipped() {
        let cost = compute_process_costs(
            &[step("LASER", dec!(1), false), step("BEND", dec!(1), true)],
            &master(),
            10,
            "P-100",
        );
        assert_eq!(cost.lines.len(), 1);
        assert_eq!(cost.lines[0].process_code, "BEND");
    }

    #[test]
    fn test_unknown_process_costs_nothing() {
        let cost = compute_process_costs(&[step("WELD", dec!(3), true)], &master(), 10, "P-100");
        assert_eq!(cost.lines.len(), 1);
        assert_eq!(cost.lines[0].name, "WELD");
        assert!(cost.total.is_zero());
    }

    #[test]
    fn test_no_steps() {
        let cost = compute_process_costs(&[], &master(), 10, "P-100");
        assert_eq!(cost, ProcessCost::default());
    }
}
