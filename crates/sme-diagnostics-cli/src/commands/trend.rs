use clap::Args;
use serde_json::Value;

use sme_diagnostics_core::trend::import;
use sme_diagnostics_core::trend::periods::{self, TrendInput};

use crate::input;
use crate::settings::Settings;

/// Arguments for multi-period trend analysis
#[derive(Args)]
pub struct TrendArgs {
    /// Path to JSON input file (company_name, periods, optional settings)
    #[arg(long, conflicts_with = "csv")]
    pub input: Option<String>,

    /// Path to a CSV table, one row per period
    #[arg(long)]
    pub csv: Option<String>,

    /// Company name for a CSV import
    #[arg(long, default_value = "Unnamed business")]
    pub company: String,
}

pub fn run_trend(args: TrendArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.csv {
        let table = import::read_periods(input::file::open(path)?)?;
        let trend_input = TrendInput {
            company_name: args.company,
            periods: table.periods,
            settings: settings.engine.clone(),
        };
        let mut result = periods::analyze_trend(&trend_input)?;
        result.warnings.splice(0..0, table.warnings);
        return Ok(serde_json::to_value(result)?);
    }

    let mut request: Value = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json>, --csv <file.csv> or stdin required for trend analysis".into());
    };
    settings.fill_defaults(&mut request)?;

    let trend_input: TrendInput = serde_json::from_value(request)?;
    let result = periods::analyze_trend(&trend_input)?;
    Ok(serde_json::to_value(result)?)
}
