use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sme_diagnostics_core::diagnostics::verdict::VerdictCode;
use sme_diagnostics_core::trend::import;
use sme_diagnostics_core::trend::periods::{analyze_trend, TrendDirection, TrendInput};
use sme_diagnostics_core::{DiagnosticsError, EngineSettings};

const HEADER: &str = "period,revenue,cogs,operating_expenses,rent,payroll,depreciation,\
interest_expense,income_tax,cash,accounts_receivable,inventory,accounts_payable,bank_debt";

fn year_csv() -> String {
    let mut csv = HEADER.to_string();
    for month in 1..=12u32 {
        let revenue = 40_000 + month * 1_000;
        let cogs = revenue * 6 / 10;
        csv.push_str(&format!(
            "\n2024-{:02},{},{},12000,3000,5000,1000,400,600,6000,12000,15000,9000,10000",
            month, revenue, cogs
        ));
    }
    csv
}

#[test]
fn test_csv_year_to_trend() {
    let imported = import::parse_periods(&year_csv()).unwrap();
    assert!(imported.warnings.is_empty());
    assert_eq!(imported.periods.len(), 12);

    let out = analyze_trend(&TrendInput {
        company_name: "Imported".into(),
        periods: imported.periods,
        settings: EngineSettings::default(),
    })
    .unwrap();

    let r = &out.result;
    assert_eq!(r.period_results.len(), 12);
    assert_eq!(r.period_results[0].period, "2024-01");
    // revenue 41_000 -> 52_000
    let expected = (dec!(52_000) - dec!(41_000)) / dec!(41_000) * dec!(100);
    assert_eq!(r.changes.revenue_growth_pct, expected);
    assert_eq!(r.changes.revenue_trend, TrendDirection::Improving);
    assert_eq!(r.changes.ebitda_trend, TrendDirection::Improving);
    assert!(r.loss_making_periods.is_empty());
    assert!(r
        .period_results
        .iter()
        .all(|p| p.verdict == VerdictCode::Healthy));
}

#[test]
fn test_missing_money_column_fails_fast() {
    let csv = year_csv().replacen("bank_debt", "bank_loans", 1);
    match import::parse_periods(&csv) {
        Err(DiagnosticsError::MissingColumn { column }) => assert_eq!(column, "bank_debt"),
        other => panic!("Expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn test_trend_input_from_json() {
    let json = r#"{
        "company_name": "JsonCo",
        "periods": [
            { "period": "Q1", "revenue": "30000", "cogs": "18000", "operating_expenses": "9000",
              "depreciation": "0", "interest_expense": "0", "income_tax": "0", "cash": "0",
              "accounts_receivable": "0", "inventory": "0", "accounts_payable": "0",
              "bank_debt": "0" },
            { "period": "Q2", "revenue": "30000", "cogs": "18000", "operating_expenses": "13000",
              "depreciation": "0", "interest_expense": "0", "income_tax": "0", "cash": "0",
              "accounts_receivable": "0", "inventory": "0", "accounts_payable": "0",
              "bank_debt": "0" }
        ]
    }"#;
    let input: TrendInput = serde_json::from_str(json).unwrap();
    let out = analyze_trend(&input).unwrap();
    assert_eq!(out.result.loss_making_periods, vec!["Q2".to_string()]);
    assert_eq!(out.result.changes.ebitda_trend, TrendDirection::Deteriorating);
    assert_eq!(out.result.changes.revenue_growth_pct, Decimal::ZERO);
    assert_eq!(out.result.changes.revenue_trend, TrendDirection::Stable);
}
