use clap::Args;
use serde_json::Value;

use sme_diagnostics_core::diagnostics::report::{self, DiagnosisInput};

use crate::input;
use crate::settings::Settings;

/// Arguments for a full diagnosis
#[derive(Args)]
pub struct DiagnoseArgs {
    /// Path to JSON input file (company_name, financials, optional settings/rules)
    #[arg(long)]
    pub input: Option<String>,

    /// Override the company name printed on the summary
    #[arg(long)]
    pub company: Option<String>,
}

pub fn run_diagnose(args: DiagnoseArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: Value = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for diagnosis".into());
    };
    settings.fill_defaults(&mut request)?;

    let mut diag_input: DiagnosisInput = serde_json::from_value(request)?;
    if let Some(name) = args.company {
        diag_input.company_name = name;
    }
    let result = report::run_diagnosis(&diag_input)?;
    Ok(serde_json::to_value(result)?)
}
