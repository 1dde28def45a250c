use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use sme_diagnostics_core::valuation::business_value::{self, OwnedPremises, ValuationInput};

use crate::input;
use crate::settings::Settings;

/// Arguments for an EBITDA-multiple valuation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ValuationArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// EBITDA of one period
    #[arg(long)]
    pub ebitda: Option<Decimal>,

    /// Multiple of annual EBITDA (defaults to the configured multiple)
    #[arg(long)]
    pub multiple: Option<Decimal>,

    /// Periods per year used to annualise (defaults to the configured value)
    #[arg(long)]
    pub periods_per_year: Option<u32>,

    /// Outstanding bank debt
    #[arg(long)]
    pub bank_debt: Option<Decimal>,

    /// Market rent of owner-occupied premises, per period
    #[arg(long, requires = "real_estate_value")]
    pub virtual_rent: Option<Decimal>,

    /// Market value of owner-occupied premises
    #[arg(long, requires = "virtual_rent")]
    pub real_estate_value: Option<Decimal>,
}

pub fn run_valuation(args: ValuationArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let request: Option<Value> = if let Some(ref path) = args.input {
        Some(input::file::read_json_value(path)?)
    } else {
        input::stdin::read_stdin()?
    };

    let val_input: ValuationInput = if let Some(mut request) = request {
        settings.fill_valuation_defaults(&mut request)?;
        serde_json::from_value(request)?
    } else {
        let owned_premises = match (args.virtual_rent, args.real_estate_value) {
            (Some(virtual_rent), Some(real_estate_value)) => Some(OwnedPremises {
                virtual_rent,
                real_estate_value,
            }),
            _ => None,
        };
        ValuationInput {
            period_ebitda: args.ebitda.ok_or("--ebitda is required (or provide --input)")?,
            periods_per_year: args
                .periods_per_year
                .unwrap_or(settings.engine.periods_per_year),
            multiple: args.multiple.unwrap_or(settings.engine.valuation_multiple),
            owned_premises,
            bank_debt: args.bank_debt.unwrap_or(Decimal::ZERO),
        }
    };
    let result = business_value::value_business(&val_input)?;
    Ok(serde_json::to_value(result)?)
}
