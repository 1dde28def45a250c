//! A user-owned list of saved pricing scenarios for side-by-side comparison.

use serde::{Deserialize, Serialize};

use super::unit_cost::{price_unit, UnitPricingInput, UnitPricingOutput};
use crate::error::DiagnosticsError;
use crate::types::Money;
use crate::DiagnosticsResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedScenario {
    pub name: String,
    pub input: UnitPricingInput,
    pub output: UnitPricingOutput,
}

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRow {
    pub name: String,
    pub unit_cost: Money,
    pub price: Money,
    pub profit_per_unit: Money,
    pub commission_amount: Money,
    pub cheapest: bool,
    pub most_profitable: bool,
}

/// Scenarios in the order they were saved. Only the owner mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioBook {
    scenarios: Vec<SavedScenario>,
}

impl ScenarioBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price `input` and append it. An impossible margin is returned as an
    /// error and nothing is saved.
    pub fn save(
        &mut self,
        name: impl Into<String>,
        input: UnitPricingInput,
    ) -> DiagnosticsResult<&SavedScenario> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DiagnosticsError::InvalidInput {
                field: "name".into(),
                reason: "A saved scenario needs a name.".into(),
            });
        }
        let output = price_unit(&input)?;
        self.scenarios.push(SavedScenario {
            name,
            input,
            output,
        });
        Ok(&self.scenarios[self.scenarios.len() - 1])
    }

    pub fn clear(&mut self) {
        self.scenarios.clear();
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedScenario> {
        self.scenarios.iter()
    }

    /// Rows in insertion order, flagging the lowest price and the highest
    /// profit per unit (first one wins on ties).
    pub fn comparison(&self) -> Vec<ScenarioRow> {
        let cheapest = position_by(&self.scenarios, |a, b| a.output.price < b.output.price);
        let richest = position_by(&self.scenarios, |a, b| {
            a.output.profit_per_unit > b.output.profit_per_unit
        });

        self.scenarios
            .iter()
            .enumerate()
            .map(|(i, s)| ScenarioRow {
                name: s.name.clone(),
                unit_cost: s.output.unit_cost,
                price: s.output.price,
                profit_per_unit: s.output.profit_per_unit,
                commission_amount: s.output.commission_amount,
                cheapest: cheapest == Some(i),
                most_profitable: richest == Some(i),
            })
            .collect()
    }
}

/// Index of the first scenario that no later one beats.
fn position_by<F>(scenarios: &[SavedScenario], better: F) -> Option<usize>
where
    F: Fn(&SavedScenario, &SavedScenario) -> bool,
{
    let mut best: Option<usize> = None;
    for (i, s) in scenarios.iter().enumerate() {
        match best {
            Some(b) if !better(s, &scenarios[b]) => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn input(material: Money, margin: Decimal, commission: Decimal) -> UnitPricingInput {
        UnitPricingInput {
            material_cost: material,
            hourly_wage: dec!(12),
            minutes_per_unit: dec!(15),
            period_fixed_costs: dec!(2_000),
            monthly_capacity_units: dec!(1_000),
            margin_pct: margin,
            commission_pct: commission,
        }
    }

    #[test]
    fn test_save_and_clear() {
        let mut book = ScenarioBook::new();
        let saved = book.save("Shop", input(dec!(4), dec!(30), dec!(0))).unwrap();
        assert_eq!(saved.output.unit_cost, dec!(9));
        book.save("Marketplace", input(dec!(4), dec!(30), dec!(15))).unwrap();
        assert_eq!(book.len(), 2);
        book.clear();
        assert!(book.is_empty());
    }

    #[test]
    fn test_impossible_scenario_not_saved() {
        let mut book = ScenarioBook::new();
        let err = book.save("Greedy", input(dec!(4), dec!(80), dec!(20)));
        assert!(matches!(err, Err(DiagnosticsError::ImpossibleMargin { .. })));
        assert!(book.is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut book = ScenarioBook::new();
        assert!(book.save("  ", input(dec!(4), dec!(30), dec!(0))).is_err());
    }

    #[test]
    fn test_comparison_flags() {
        let mut book = ScenarioBook::new();
        book.save("Direct", input(dec!(4), dec!(30), dec!(0))).unwrap();
        book.save("Marketplace", input(dec!(4), dec!(30), dec!(15))).unwrap();
        book.save("Premium", input(dec!(4), dec!(50), dec!(0))).unwrap();

        let rows = book.comparison();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Direct", "Marketplace", "Premium"]);
        assert!(rows[0].cheapest);
        assert!(!rows[1].cheapest);
        assert!(rows[2].most_profitable);
        assert_eq!(rows.iter().filter(|r| r.most_profitable).count(), 1);
    }

    #[test]
    fn test_empty_comparison() {
        assert!(ScenarioBook::new().comparison().is_empty());
    }
}
