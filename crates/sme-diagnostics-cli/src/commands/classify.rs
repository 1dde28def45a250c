use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;

use sme_diagnostics_core::diagnostics::classification::MetricKind;
use sme_diagnostics_core::with_metadata;

use crate::settings::Settings;

/// Arguments for classifying one ratio
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ClassifyArgs {
    /// Metric name, e.g. rent_ratio, acid-test, cash_conversion_cycle
    #[arg(long)]
    pub metric: String,

    /// Observed value (percent for ratios on a 0-100 scale, days for the cycle)
    #[arg(long)]
    pub value: Decimal,
}

pub fn run_classify(args: ClassifyArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let metric: MetricKind = args.metric.parse()?;
    let classification = settings.rule_table().judge(metric, args.value);
    let table = if settings.rules.is_some() { "configured" } else { "standard" };

    let output = with_metadata(
        "First matching threshold rule for the metric",
        &json!({ "rule_table": table }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        classification,
    );
    Ok(serde_json::to_value(output)?)
}
