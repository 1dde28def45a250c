use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sme_diagnostics_core::diagnostics::classification::{self, MetricKind, Severity};
use sme_diagnostics_core::diagnostics::metrics::{compute, compute_default};
use sme_diagnostics_core::diagnostics::report::{run_diagnosis, DiagnosisInput};
use sme_diagnostics_core::diagnostics::verdict::{verdict, VerdictCode};
use sme_diagnostics_core::diagnostics::breakeven;
use sme_diagnostics_core::{EngineSettings, FinancialInputs};

fn corner_shop() -> FinancialInputs {
    FinancialInputs {
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
    }
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn test_profit_cascade_reference() {
    let m = compute_default(&corner_shop());
    assert_eq!(m.gross_profit, dec!(20_000));
    assert_eq!(m.ebitda, dec!(5_000));
    assert_eq!(m.ebitda_margin_pct, dec!(10.0));
    assert_eq!(m.ebit, dec!(3_500));
    assert_eq!(m.net_income, dec!(2_100));
}

#[test]
fn test_cash_cycle_reference() {
    let m = compute_default(&corner_shop());
    // 15_000 / 50_000 x 30
    assert_eq!(m.dso, dec!(9));
    // 20_000 / 30_000 x 30
    assert_eq!(m.dio, dec!(20));
    // 10_000 / 30_000 x 30
    assert_eq!(m.dpo, dec!(10));
    assert_eq!(m.cash_conversion_cycle, m.dso + m.dio - m.dpo);
    assert_eq!(m.cash_conversion_cycle, dec!(19));
}

// ===========================================================================
// Zero guards
// ===========================================================================

#[test]
fn test_zero_revenue_zeroes_revenue_ratios() {
    let mut inputs = corner_shop();
    inputs.revenue = Decimal::ZERO;
    let m = compute_default(&inputs);
    assert_eq!(m.gross_margin_pct, Decimal::ZERO);
    assert_eq!(m.ebitda_margin_pct, Decimal::ZERO);
    assert_eq!(m.ebit_margin_pct, Decimal::ZERO);
    assert_eq!(m.net_margin_pct, Decimal::ZERO);
    assert_eq!(m.rent_ratio_pct, Some(Decimal::ZERO));
    assert_eq!(m.dso, Decimal::ZERO);
    assert_eq!(m.contribution_margin_ratio, Decimal::ZERO);
    assert_eq!(m.break_even_sales, Decimal::ZERO);
    assert_eq!(m.margin_of_safety_pct, Decimal::ZERO);
}

#[test]
fn test_negative_revenue_zeroes_revenue_ratios() {
    let mut inputs = corner_shop();
    inputs.revenue = dec!(-100);
    let m = compute_default(&inputs);
    assert_eq!(m.gross_margin_pct, Decimal::ZERO);
    assert_eq!(m.ebitda_margin_pct, Decimal::ZERO);
    assert_eq!(m.dso, Decimal::ZERO);
    assert_eq!(m.margin_of_safety_pct, Decimal::ZERO);
}

#[test]
fn test_zero_cogs_zeroes_inventory_and_payable_days() {
    let mut inputs = corner_shop();
    inputs.cogs = Decimal::ZERO;
    let m = compute_default(&inputs);
    assert_eq!(m.dio, Decimal::ZERO);
    assert_eq!(m.dpo, Decimal::ZERO);
    assert_eq!(m.cash_conversion_cycle, m.dso);
}

#[test]
fn test_no_liabilities_and_no_interest() {
    let mut inputs = corner_shop();
    inputs.accounts_payable = Decimal::ZERO;
    inputs.bank_debt = Decimal::ZERO;
    inputs.interest_expense = Decimal::ZERO;
    let m = compute_default(&inputs);
    assert_eq!(m.acid_test_ratio, Decimal::ZERO);
    assert_eq!(m.interest_coverage, Decimal::ZERO);
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_compute_is_idempotent() {
    let inputs = corner_shop();
    let settings = EngineSettings::default();
    assert_eq!(compute(&inputs, &settings), compute(&inputs, &settings));
}

#[test]
fn test_more_opex_strictly_lowers_ebitda() {
    let mut inputs = corner_shop();
    let mut prev = compute_default(&inputs);
    for _ in 0..5 {
        inputs.operating_expenses += dec!(1_250);
        let next = compute_default(&inputs);
        assert!(next.ebitda < prev.ebitda);
        assert!(next.ebitda_margin_pct < prev.ebitda_margin_pct);
        prev = next;
    }
}

#[test]
fn test_break_even_satisfies_definition() {
    let m = compute_default(&corner_shop());
    let recovered = m.break_even_sales * m.contribution_margin_ratio;
    assert!((recovered - m.fixed_costs).abs() < dec!(0.000001));
    assert_eq!(
        breakeven::required_sales(m.fixed_costs, Decimal::ZERO, m.contribution_margin_ratio),
        m.break_even_sales
    );
}

// ===========================================================================
// Classification and verdict
// ===========================================================================

#[test]
fn test_verdict_priority_ebitda_over_cash_cycle() {
    let mut inputs = corner_shop();
    inputs.operating_expenses = dec!(30_000);
    inputs.inventory = dec!(90_000);
    let m = compute_default(&inputs);
    assert!(m.ebitda < Decimal::ZERO);
    assert!(m.cash_conversion_cycle > dec!(60));
    assert_eq!(verdict(&m), VerdictCode::EbitdaNegative);
}

#[test]
fn test_standard_thresholds_from_table() {
    assert_eq!(classification::classify(MetricKind::GrossMargin, dec!(25)), Severity::Warning);
    assert_eq!(classification::classify(MetricKind::Ebitda, dec!(-0.01)), Severity::Critical);
    assert_eq!(classification::classify(MetricKind::RentRatio, dec!(12)), Severity::Warning);
    assert_eq!(classification::classify(MetricKind::PayrollRatio, dec!(50)), Severity::Critical);
    assert_eq!(
        classification::classify(MetricKind::CashConversionCycle, dec!(-5)),
        Severity::Healthy
    );
    assert_eq!(classification::classify(MetricKind::AcidTest, dec!(1.5)), Severity::Healthy);
    assert_eq!(
        classification::classify(MetricKind::InterestCoverage, dec!(1.4)),
        Severity::Critical
    );
}

#[test]
fn test_full_diagnosis_envelope() {
    let input = DiagnosisInput {
        company_name: "Corner Shop".into(),
        as_of: None,
        financials: corner_shop(),
        settings: EngineSettings::default(),
        rules: None,
    };
    let out = run_diagnosis(&input).unwrap();
    assert_eq!(out.result.verdict.code, VerdictCode::Healthy);
    assert!(out.methodology.contains("break-even"));
    assert_eq!(out.assumptions["payroll_ratio_base"], "gross profit");

    let payroll = out
        .result
        .classifications
        .iter()
        .find(|c| c.metric == MetricKind::PayrollRatio)
        .unwrap();
    // 7_000 / 20_000 = 35%
    assert_eq!(payroll.value, dec!(35));
    assert_eq!(payroll.severity, Severity::Warning);

    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["verdict"]["code"], "healthy");
}
