use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::metrics::DerivedMetrics;
use crate::error::DiagnosticsError;
use crate::statements::FinancialInputs;
use crate::DiagnosticsResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Alert level for a single ratio. Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Healthy,
    Warning,
    Critical,
}

/// The ratios the rule table knows how to judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    GrossMargin,
    Ebitda,
    EbitdaMargin,
    RentRatio,
    PayrollRatio,
    CashConversionCycle,
    AcidTest,
    InterestCoverage,
    MarginOfSafety,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

/// One row of the threshold table: if `metric <comparison> threshold`
/// then `severity`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub metric: MetricKind,
    pub comparison: Comparison,
    pub threshold: Decimal,
    pub severity: Severity,
}

/// The verdict on one observed ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub metric: MetricKind,
    pub value: Decimal,
    pub severity: Severity,
    pub message: String,
}

/// Headline operating condition used in the printable summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingStatus {
    Critical,
    Vulnerable,
    Solid,
}

/// Headline cash condition used in the printable summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityStatus {
    FinancialSuffocation,
    OptimalLiquidity,
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

const fn rule(
    metric: MetricKind,
    comparison: Comparison,
    threshold: Decimal,
    severity: Severity,
) -> ClassificationRule {
    ClassificationRule {
        metric,
        comparison,
        threshold,
        severity,
    }
}

/// Rules are scanned top to bottom; the first match for a metric wins, so
/// the stricter threshold of each metric comes first.
pub const STANDARD_RULES: &[ClassificationRule] = &[
    rule(MetricKind::GrossMargin, Comparison::LessThan, dec!(30), Severity::Warning),
    rule(MetricKind::Ebitda, Comparison::LessThan, dec!(0), Severity::Critical),
    rule(MetricKind::EbitdaMargin, Comparison::LessThan, dec!(10), Severity::Warning),
    rule(MetricKind::RentRatio, Comparison::GreaterThan, dec!(15), Severity::Critical),
    rule(MetricKind::RentRatio, Comparison::GreaterOrEqual, dec!(10), Severity::Warning),
    rule(MetricKind::PayrollRatio, Comparison::GreaterThan, dec!(45), Severity::Critical),
    rule(MetricKind::PayrollRatio, Comparison::GreaterOrEqual, dec!(30), Severity::Warning),
    rule(MetricKind::CashConversionCycle, Comparison::GreaterThan, dec!(60), Severity::Critical),
    rule(MetricKind::CashConversionCycle, Comparison::GreaterThan, dec!(0), Severity::Warning),
    rule(MetricKind::AcidTest, Comparison::LessThan, dec!(0.8), Severity::Critical),
    rule(MetricKind::AcidTest, Comparison::LessThan, dec!(1.1), Severity::Warning),
    rule(MetricKind::InterestCoverage, Comparison::LessThan, dec!(1.5), Severity::Critical),
    rule(MetricKind::InterestCoverage, Comparison::LessThan, dec!(3), Severity::Warning),
    rule(MetricKind::MarginOfSafety, Comparison::LessThan, dec!(0), Severity::Critical),
    rule(MetricKind::MarginOfSafety, Comparison::LessThan, dec!(10), Severity::Warning),
];

/// An ordered set of classification rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    rules: Vec<ClassificationRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleTable {
    pub fn standard() -> Self {
        Self {
            rules: STANDARD_RULES.to_vec(),
        }
    }

    /// Build a custom table, e.g. from configuration.
    pub fn new(rules: Vec<ClassificationRule>) -> DiagnosticsResult<Self> {
        if rules.is_empty() {
            return Err(DiagnosticsError::InsufficientData(
                "A rule table needs at least one rule.".into(),
            ));
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn classify(&self, metric: MetricKind, value: Decimal) -> Severity {
        evaluate(&self.rules, metric, value)
    }

    /// [`RuleTable::classify`] plus the message shown to the owner.
    pub fn judge(&self, metric: MetricKind, value: Decimal) -> Classification {
        let severity = self.classify(metric, value);
        Classification {
            metric,
            value,
            severity,
            message: describe(metric, severity).to_string(),
        }
    }
}

/// Classify one value against the standard thresholds.
pub fn classify(metric: MetricKind, value: Decimal) -> Severity {
    evaluate(STANDARD_RULES, metric, value)
}

fn evaluate(rules: &[ClassificationRule], metric: MetricKind, value: Decimal) -> Severity {
    rules
        .iter()
        .filter(|r| r.metric == metric)
        .find(|r| r.comparison.holds(value, r.threshold))
        .map(|r| r.severity)
        .unwrap_or(Severity::Healthy)
}

impl Comparison {
    pub fn holds(self, value: Decimal, threshold: Decimal) -> bool {
        match self {
            Comparison::LessThan => value < threshold,
            Comparison::LessOrEqual => value <= threshold,
            Comparison::GreaterThan => value > threshold,
            Comparison::GreaterOrEqual => value >= threshold,
        }
    }
}

// ---------------------------------------------------------------------------
// Assessment of a full metric record
// ---------------------------------------------------------------------------

/// Classify every applicable ratio of one period.
///
/// Ratios are skipped when they carry no information: rent or payroll not
/// itemised, acid test without current liabilities, coverage without
/// interest expense, margin of safety without revenue.
pub fn assess(
    inputs: &FinancialInputs,
    metrics: &DerivedMetrics,
    table: &RuleTable,
) -> Vec<Classification> {
    observations(inputs, metrics)
        .into_iter()
        .map(|(metric, value)| table.judge(metric, value))
        .collect()
}

/// Worst severity among a set of classifications.
pub fn overall_severity(classifications: &[Classification]) -> Severity {
    classifications
        .iter()
        .map(|c| c.severity)
        .max()
        .unwrap_or(Severity::Healthy)
}

pub fn operating_status(metrics: &DerivedMetrics) -> OperatingStatus {
    if metrics.ebitda < Decimal::ZERO {
        OperatingStatus::Critical
    } else if metrics.ebitda_margin_pct < dec!(10) {
        OperatingStatus::Vulnerable
    } else {
        OperatingStatus::Solid
    }
}

pub fn liquidity_status(metrics: &DerivedMetrics) -> LiquidityStatus {
    if metrics.cash_conversion_cycle > Decimal::ZERO {
        LiquidityStatus::FinancialSuffocation
    } else {
        LiquidityStatus::OptimalLiquidity
    }
}

fn observations(inputs: &FinancialInputs, m: &DerivedMetrics) -> Vec<(MetricKind, Decimal)> {
    let has_revenue = inputs.revenue > Decimal::ZERO;
    let mut obs = Vec::with_capacity(9);

    if has_revenue {
        obs.push((MetricKind::GrossMargin, m.gross_margin_pct));
    }
    obs.push((MetricKind::Ebitda, m.ebitda));
    if has_revenue {
        obs.push((MetricKind::EbitdaMargin, m.ebitda_margin_pct));
    }
    if let Some(rent) = m.rent_ratio_pct.filter(|_| has_revenue) {
        obs.push((MetricKind::RentRatio, rent));
    }
    if let Some(payroll) = m.payroll_ratio_pct.filter(|_| m.gross_profit > Decimal::ZERO) {
        obs.push((MetricKind::PayrollRatio, payroll));
    }
    obs.push((MetricKind::CashConversionCycle, m.cash_conversion_cycle));
    if m.current_liabilities > Decimal::ZERO {
        obs.push((MetricKind::AcidTest, m.acid_test_ratio));
    }
    if inputs.interest_expense > Decimal::ZERO {
        obs.push((MetricKind::InterestCoverage, m.interest_coverage));
    }
    if has_revenue {
        obs.push((MetricKind::MarginOfSafety, m.margin_of_safety_pct));
    }
    obs
}

fn describe(metric: MetricKind, severity: Severity) -> &'static str {
    use MetricKind as M;
    use Severity as S;
    match (metric, severity) {
        (M::GrossMargin, S::Healthy) => "Gross margin leaves room to cover operating costs.",
        (M::GrossMargin, _) => "Gross margin is thin; review purchasing costs and pricing.",
        (M::Ebitda, S::Critical) => "The business burns cash: operating expenses exceed gross profit.",
        (M::Ebitda, _) => "Operations generate cash.",
        (M::EbitdaMargin, S::Healthy) => "Operating margin is healthy.",
        (M::EbitdaMargin, _) => "Operating margin is very low.",
        (M::RentRatio, S::Critical) => "Rent takes an excessive share of sales; real-estate risk.",
        (M::RentRatio, S::Warning) => "Rent is approaching an unsafe share of sales.",
        (M::RentRatio, S::Healthy) => "Rent is within a sustainable share of sales.",
        (M::PayrollRatio, S::Critical) => "Payroll consumes most of the gross profit.",
        (M::PayrollRatio, S::Warning) => "Payroll weighs heavily on gross profit.",
        (M::PayrollRatio, S::Healthy) => "Payroll is proportionate to gross profit.",
        (M::CashConversionCycle, S::Critical) => {
            "Cash is tied up for over 60 days; insolvency risk despite profits."
        }
        (M::CashConversionCycle, S::Warning) => "The owner finances part of the operating cycle.",
        (M::CashConversionCycle, S::Healthy) => "The operating cycle is financed by suppliers.",
        (M::AcidTest, S::Critical) => "Liquid assets cannot cover short-term obligations.",
        (M::AcidTest, S::Warning) => "Liquid assets barely cover short-term obligations.",
        (M::AcidTest, S::Healthy) => "Liquid assets comfortably cover short-term obligations.",
        (M::InterestCoverage, S::Critical) => "Operating cash barely services interest.",
        (M::InterestCoverage, S::Warning) => "Interest coverage is tight.",
        (M::InterestCoverage, S::Healthy) => "Interest is comfortably covered.",
        (M::MarginOfSafety, S::Critical) => "Sales are below break-even; every month loses money.",
        (M::MarginOfSafety, S::Warning) => "High risk: a small drop in sales turns into losses.",
        (M::MarginOfSafety, S::Healthy) => "Sales sit comfortably above break-even.",
    }
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

impl MetricKind {
    pub const ALL: [MetricKind; 9] = [
        MetricKind::GrossMargin,
        MetricKind::Ebitda,
        MetricKind::EbitdaMargin,
        MetricKind::RentRatio,
        MetricKind::PayrollRatio,
        MetricKind::CashConversionCycle,
        MetricKind::AcidTest,
        MetricKind::InterestCoverage,
        MetricKind::MarginOfSafety,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::GrossMargin => "gross_margin",
            MetricKind::Ebitda => "ebitda",
            MetricKind::EbitdaMargin => "ebitda_margin",
            MetricKind::RentRatio => "rent_ratio",
            MetricKind::PayrollRatio => "payroll_ratio",
            MetricKind::CashConversionCycle => "cash_conversion_cycle",
            MetricKind::AcidTest => "acid_test",
            MetricKind::InterestCoverage => "interest_coverage",
            MetricKind::MarginOfSafety => "margin_of_safety",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = DiagnosticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        MetricKind::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| DiagnosticsError::InvalidInput {
                field: "metric".into(),
                reason: format!("Unknown metric '{}'.", s),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
