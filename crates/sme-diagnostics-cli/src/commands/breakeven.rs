use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use sme_diagnostics_core::diagnostics::breakeven::{self, TargetSalesInput};
use sme_diagnostics_core::with_metadata;

use crate::input;

/// Arguments for break-even and target sales
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct BreakevenArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Fixed costs of the period
    #[arg(long)]
    pub fixed_costs: Option<Decimal>,

    /// Contribution margin ratio (0.40 = 40%)
    #[arg(long, alias = "cm-ratio")]
    pub contribution_margin_ratio: Option<Decimal>,

    /// Profit the owner wants on top of break-even
    #[arg(long)]
    pub target_profit: Option<Decimal>,

    /// Current sales, for shortfall and margin of safety
    #[arg(long)]
    pub current_sales: Option<Decimal>,
}

pub fn run_breakeven(args: BreakevenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let be_input: TargetSalesInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        TargetSalesInput {
            fixed_costs: args
                .fixed_costs
                .ok_or("--fixed-costs is required (or provide --input)")?,
            contribution_margin_ratio: args
                .contribution_margin_ratio
                .ok_or("--contribution-margin-ratio is required (or provide --input)")?,
            target_profit: args.target_profit.unwrap_or(Decimal::ZERO),
            current_sales: args.current_sales,
        }
    };

    let start = Instant::now();
    let result = breakeven::target_sales(&be_input)?;
    let mut warnings = Vec::new();
    if !result.reachable {
        warnings.push(
            "Contribution margin is not positive; no sales volume covers the fixed costs.".to_string(),
        );
    }

    let output = with_metadata(
        "Break-even = fixed costs / contribution margin ratio",
        &be_input,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}
