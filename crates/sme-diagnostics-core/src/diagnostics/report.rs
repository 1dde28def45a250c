use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::classification::{
    self, Classification, ClassificationRule, LiquidityStatus, OperatingStatus, RuleTable,
    Severity,
};
use super::metrics::{self, DerivedMetrics};
use super::verdict::{self, Verdict};
use crate::statements::{EngineSettings, FinancialInputs};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::DiagnosticsResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// A full diagnosis request for one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisInput {
    pub company_name: String,
    /// Date printed on the summary; today when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    pub financials: FinancialInputs,
    #[serde(default)]
    pub settings: EngineSettings,
    /// Replacement threshold table; the standard one when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<ClassificationRule>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisOutput {
    pub company_name: String,
    pub as_of: NaiveDate,
    pub metrics: DerivedMetrics,
    pub classifications: Vec<Classification>,
    /// Worst severity across all classifications
    pub overall_severity: Severity,
    pub verdict: Verdict,
    pub operating_status: OperatingStatus,
    pub liquidity_status: LiquidityStatus,
    pub recommendations: Vec<String>,
    /// Revenue-to-net-income bridge for waterfall charts
    pub waterfall: Vec<WaterfallStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// A movement added to the running total
    Relative,
    /// A running total shown as its own bar
    Subtotal,
    /// The final total
    Total,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallStep {
    pub label: String,
    pub amount: Money,
    pub kind: StepKind,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate the inputs, derive every metric, classify the ratios, pick the
/// verdict and build recommendations plus the waterfall bridge.
pub fn run_diagnosis(
    input: &DiagnosisInput,
) -> DiagnosticsResult<ComputationOutput<DiagnosisOutput>> {
    let start = Instant::now();

    input.financials.validate()?;
    input.settings.validate()?;
    let table = match &input.rules {
        Some(rules) => RuleTable::new(rules.clone())?,
        None => RuleTable::standard(),
    };

    let mut warnings = input.financials.consistency_warnings();

    let m = metrics::compute(&input.financials, &input.settings);
    let classifications = classification::assess(&input.financials, &m, &table);
    let overall_severity = classification::overall_severity(&classifications);
    let verdict = verdict::explain(&m);

    if m.contribution_margin_ratio <= Decimal::ZERO && !input.financials.revenue.is_zero() {
        warnings.push(
            "Contribution margin is zero or negative; break-even is unreachable (set to 0)."
                .into(),
        );
    }

    tracing::debug!(
        company = %input.company_name,
        ebitda = %m.ebitda,
        ccc = %m.cash_conversion_cycle,
        verdict = ?verdict.code,
        "diagnosis computed"
    );

    let output = DiagnosisOutput {
        company_name: input.company_name.clone(),
        as_of: input.as_of.unwrap_or_else(|| Utc::now().date_naive()),
        recommendations: recommendations(&input.financials, &m),
        waterfall: waterfall(&input.financials, &m),
        operating_status: classification::operating_status(&m),
        liquidity_status: classification::liquidity_status(&m),
        metrics: m,
        classifications,
        overall_severity,
        verdict,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "SME Financial Diagnosis (EBITDA cascade, break-even, cash conversion cycle)",
        &serde_json::json!({
            "period_days": input.settings.period_days,
            "periods_per_year": input.settings.periods_per_year,
            "valuation_multiple": input.settings.valuation_multiple.to_string(),
            "fixed_costs": "operating expenses + interest",
            "payroll_ratio_base": "gross profit",
            "custom_rules": input.rules.is_some(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Action items triggered by the cash cycle and survival-line figures.
pub fn recommendations(inputs: &FinancialInputs, m: &DerivedMetrics) -> Vec<String> {
    let mut recs = Vec::new();

    if m.dso > dec!(45) {
        recs.push(
            "Collections are slow. Offer an early-payment discount (e.g. 2% at 10 days) \
             or use factoring."
                .to_string(),
        );
    }
    if m.dio > dec!(60) {
        recs.push(
            "Stock is stagnant. Clear out dead inventory to release trapped cash.".to_string(),
        );
    }
    // Supplier terms only matter while the owner is funding a gap.
    if m.dpo < dec!(30) && m.cash_conversion_cycle > Decimal::ZERO && !inputs.cogs.is_zero() {
        recs.push(
            "Suppliers are paid too quickly. Negotiate 45 to 60 day payment terms.".to_string(),
        );
    }
    if m.cash_conversion_cycle > Decimal::ZERO {
        recs.push(format!(
            "The owner finances a {} day gap in the operating cycle. \
             Prioritise longer supplier terms.",
            m.financing_gap_days.round_dp(0)
        ));
    }
    if m.break_even_shortfall > Decimal::ZERO {
        recs.push(format!(
            "Sales are {} below break-even. Costs are not covered.",
            m.break_even_shortfall.round_dp(2)
        ));
    } else if !inputs.revenue.is_zero() && m.margin_of_safety_pct < dec!(10) {
        recs.push(
            "Margin of safety is below 10%. Any small drop in sales will produce losses."
                .to_string(),
        );
    }
    if m.ebitda < Decimal::ZERO {
        recs.push(
            "Operating expenses exceed gross profit. Restructure payroll or fixed costs \
             immediately."
                .to_string(),
        );
    }

    recs
}

/// Revenue → gross profit → EBITDA → net income bridge.
pub fn waterfall(inputs: &FinancialInputs, m: &DerivedMetrics) -> Vec<WaterfallStep> {
    let other_charges = inputs
        .depreciation
        .saturating_add(inputs.interest_expense)
        .saturating_add(inputs.income_tax);
    let step = |label: &str, amount: Money, kind: StepKind| WaterfallStep {
        label: label.to_string(),
        amount,
        kind,
    };
    vec![
        step("Revenue", inputs.revenue, StepKind::Relative),
        step("Cost of sales", -inputs.cogs, StepKind::Relative),
        step("Gross profit", m.gross_profit, StepKind::Subtotal),
        step("Operating expenses", -inputs.operating_expenses, StepKind::Relative),
        step("EBITDA", m.ebitda, StepKind::Subtotal),
        step("Other charges", -other_charges, StepKind::Relative),
        step("Net income", m.net_income, StepKind::Total),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::verdict::VerdictCode;
    use crate::error::DiagnosticsError;

    fn sample_input() -> DiagnosisInput {
        DiagnosisInput {
            company_name: "Panaderia Sol".into(),
            as_of: NaiveDate::from_ymd_opt(2024, 3, 31),
            financials: FinancialInputs {
                revenue: dec!(50_000),
                cogs: dec!(30_000),
                operating_expenses: dec!(15_000),
                rent: Some(dec!(4_000)),
                payroll: Some(dec!(7_000)),
                depreciation: dec!(1_500),
                interest_expense: dec!(500),
                income_tax: dec!(900),
                cash: dec!(8_000),
                accounts_receivable: dec!(15_000),
                inventory: dec!(20_000),
                accounts_payable: dec!(10_000),
                bank_debt: dec!(12_000),
                other_current_liabilities: Decimal::ZERO,
            },
            settings: EngineSettings::default(),
            rules: None,
        }
    }

    #[test]
    fn test_diagnosis_healthy_sample() {
        let out = run_diagnosis(&sample_input()).unwrap();
        let r = &out.result;
        assert_eq!(r.verdict.code, VerdictCode::Healthy);
        assert_eq!(r.operating_status, OperatingStatus::Solid);
        assert_eq!(r.liquidity_status, LiquidityStatus::FinancialSuffocation);
        assert_eq!(r.as_of, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert!(out.warnings.is_empty(), "warnings: {:?}", out.warnings);
    }

    #[test]
    fn test_negative_input_rejected() {
        let mut input = sample_input();
        input.financials.cash = dec!(-1);
        match run_diagnosis(&input) {
            Err(DiagnosticsError::InvalidInput { field, .. }) => assert_eq!(field, "cash"),
            other => panic!("Expected InvalidInput, got {:?}", other.map(|o| o.result)),
        }
    }

    #[test]
    fn test_waterfall_ends_at_net_income() {
        let out = run_diagnosis(&sample_input()).unwrap();
        let steps = &out.result.waterfall;
        assert_eq!(steps.len(), 7);
        let last = steps.last().unwrap();
        assert_eq!(last.kind, StepKind::Total);
        assert_eq!(last.amount, dec!(2_100));
        let relative_sum: Decimal = steps
            .iter()
            .filter(|s| s.kind == StepKind::Relative)
            .map(|s| s.amount)
            .sum();
        assert_eq!(relative_sum, last.amount);
    }

    #[test]
    fn test_recommendations_for_slow_cycle() {
        let mut input = sample_input();
        input.financials.accounts_receivable = dec!(80_000); // DSO 48
        input.financials.inventory = dec!(70_000); // DIO 70
        input.financials.accounts_payable = dec!(5_000); // DPO 5
        let out = run_diagnosis(&input).unwrap();
        let recs = &out.result.recommendations;
        assert!(recs.iter().any(|r| r.contains("early-payment")));
        assert!(recs.iter().any(|r| r.contains("dead inventory")));
        assert!(recs.iter().any(|r| r.contains("45 to 60 day")));
        assert_eq!(out.result.verdict.code, VerdictCode::CashCycleInsolvency);
    }

    #[test]
    fn test_no_supplier_advice_when_suppliers_finance_the_cycle() {
        let mut input = sample_input();
        input.financials.accounts_receivable = Decimal::ZERO;
        input.financials.inventory = Decimal::ZERO;
        let out = run_diagnosis(&input).unwrap();
        let r = &out.result;
        // DPO 10 days, nothing receivable or in stock
        assert_eq!(r.metrics.dpo, dec!(10));
        assert_eq!(r.metrics.cash_conversion_cycle, dec!(-10));
        assert_eq!(r.liquidity_status, LiquidityStatus::OptimalLiquidity);
        assert!(!r.recommendations.iter().any(|s| s.contains("45 to 60 day")));
        assert!(!r.recommendations.iter().any(|s| s.contains("supplier terms")));
    }

    #[test]
    fn test_below_break_even_shortfall() {
        let mut input = sample_input();
        input.financials.operating_expenses = dec!(24_000);
        let out = run_diagnosis(&input).unwrap();
        let r = &out.result;
        // (24_000 + 500) / 0.4 = 61_250
        assert_eq!(r.metrics.break_even_shortfall, dec!(11_250));
        assert!(r.recommendations.iter().any(|s| s.contains("below break-even")));
        assert_eq!(r.overall_severity, Severity::Critical);
    }

    #[test]
    fn test_custom_rules_used() {
        let mut input = sample_input();
        input.rules = Some(vec![ClassificationRule {
            metric: classification::MetricKind::RentRatio,
            comparison: classification::Comparison::GreaterThan,
            threshold: dec!(5),
            severity: Severity::Critical,
        }]);
        let out = run_diagnosis(&input).unwrap();
        let rent = out
            .result
            .classifications
            .iter()
            .find(|c| c.metric == classification::MetricKind::RentRatio)
            .unwrap();
        assert_eq!(rent.severity, Severity::Critical);
    }
}
