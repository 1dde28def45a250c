use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use std::str::FromStr;

use sme_diagnostics_core::diagnostics::classification::{MetricKind, RuleTable};
use sme_diagnostics_core::diagnostics::report::{self, DiagnosisInput};
use sme_diagnostics_core::pricing::unit_cost::{self, UnitPricingInput};
use sme_diagnostics_core::trend::import;
use sme_diagnostics_core::trend::periods::{self, TrendInput};
use sme_diagnostics_core::valuation::business_value::{self, ValuationInput};
use sme_diagnostics_core::EngineSettings;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Diagnosis
// ---------------------------------------------------------------------------

#[napi]
pub fn diagnose(input_json: String) -> NapiResult<String> {
    let input: DiagnosisInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = report::run_diagnosis(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// `value` is a decimal string so no precision is lost crossing into JS.
#[napi]
pub fn classify_metric(metric: String, value: String) -> NapiResult<String> {
    let metric = MetricKind::from_str(&metric).map_err(to_napi_error)?;
    let value = Decimal::from_str(value.trim()).map_err(to_napi_error)?;
    let classification = RuleTable::standard().judge(metric, value);
    serde_json::to_string(&classification).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Pricing and valuation
// ---------------------------------------------------------------------------

#[napi]
pub fn unit_price(input_json: String) -> NapiResult<String> {
    let input: UnitPricingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = unit_cost::analyze_unit_pricing(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn value_business(input_json: String) -> NapiResult<String> {
    let input: ValuationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = business_value::value_business(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_trend(input_json: String) -> NapiResult<String> {
    let input: TrendInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = periods::analyze_trend(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Import a CSV table (one row per period) and analyse it in one call.
#[napi]
pub fn analyze_trend_csv(
    company_name: String,
    csv_text: String,
    settings_json: Option<String>,
) -> NapiResult<String> {
    let settings: EngineSettings = match settings_json {
        Some(json) => serde_json::from_str(&json).map_err(to_napi_error)?,
        None => EngineSettings::default(),
    };
    let table = import::parse_periods(&csv_text).map_err(to_napi_error)?;
    let input = TrendInput {
        company_name,
        periods: table.periods,
        settings,
    };
    let mut output = periods::analyze_trend(&input).map_err(to_napi_error)?;
    output.warnings.splice(0..0, table.warnings);
    serde_json::to_string(&output).map_err(to_napi_error)
}
