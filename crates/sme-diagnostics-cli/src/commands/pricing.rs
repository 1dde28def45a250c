use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

use sme_diagnostics_core::pricing::scenarios::ScenarioBook;
use sme_diagnostics_core::pricing::unit_cost::{self, UnitPricingInput};
use sme_diagnostics_core::with_metadata;

use crate::input;

/// Arguments for pricing one unit
#[derive(Args)]
pub struct PriceArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Materials per unit
    #[arg(long)]
    pub material_cost: Option<Decimal>,

    /// Wage per hour
    #[arg(long)]
    pub hourly_wage: Option<Decimal>,

    /// Minutes of labour per unit
    #[arg(long)]
    pub minutes_per_unit: Option<Decimal>,

    /// Fixed costs of the period to absorb
    #[arg(long)]
    pub fixed_costs: Option<Decimal>,

    /// Units that can be produced in a month
    #[arg(long, alias = "capacity")]
    pub monthly_capacity_units: Option<Decimal>,

    /// Desired margin on the selling price, in %
    #[arg(long, alias = "margin")]
    pub margin_pct: Option<Decimal>,

    /// Platform commission on the selling price, in %
    #[arg(long, alias = "commission")]
    pub commission_pct: Option<Decimal>,
}

/// Arguments for comparing pricing scenarios
#[derive(Args)]
pub struct PriceCompareArgs {
    /// Path to JSON array of named scenarios
    #[arg(long)]
    pub input: Option<String>,
}

/// One entry of a comparison file: a name plus the unit pricing fields.
#[derive(Debug, Serialize, Deserialize)]
struct NamedScenario {
    name: String,
    #[serde(flatten)]
    input: UnitPricingInput,
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let price_input: UnitPricingInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        UnitPricingInput {
            material_cost: args
                .material_cost
                .ok_or("--material-cost is required (or provide --input)")?,
            hourly_wage: args.hourly_wage.unwrap_or(Decimal::ZERO),
            minutes_per_unit: args.minutes_per_unit.unwrap_or(Decimal::ZERO),
            period_fixed_costs: args.fixed_costs.unwrap_or(Decimal::ZERO),
            monthly_capacity_units: args.monthly_capacity_units.unwrap_or(Decimal::ZERO),
            margin_pct: args
                .margin_pct
                .ok_or("--margin-pct is required (or provide --input)")?,
            commission_pct: args.commission_pct.unwrap_or(Decimal::ZERO),
        }
    };
    let result = unit_cost::analyze_unit_pricing(&price_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_price_compare(args: PriceCompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenarios: Vec<NamedScenario> = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for scenario comparison".into());
    };

    let start = Instant::now();
    let mut book = ScenarioBook::new();
    let mut warnings = Vec::new();
    for scenario in scenarios {
        if let Err(e) = book.save(scenario.name.clone(), scenario.input) {
            tracing::warn!(scenario = %scenario.name, error = %e, "scenario skipped");
            warnings.push(format!("Scenario '{}' skipped: {}", scenario.name, e));
        }
    }
    if book.is_empty() {
        return Err("No scenario could be priced".into());
    }

    let output = with_metadata(
        "Cost-plus price per scenario, lowest price and highest profit flagged",
        &json!({ "scenarios": book.len() }),
        warnings,
        start.elapsed().as_micros() as u64,
        book.comparison(),
    );
    Ok(serde_json::to_value(output)?)
}
