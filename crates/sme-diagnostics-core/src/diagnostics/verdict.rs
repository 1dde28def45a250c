use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::metrics::DerivedMetrics;

/// The single headline diagnosis for a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictCode {
    /// EBITDA is negative: emergency intervention
    EbitdaNegative,
    /// Cash conversion cycle above 60 days: insolvent despite profitability
    CashCycleInsolvency,
    /// Rent above 15% of sales
    RealEstateRisk,
    Healthy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub code: VerdictCode,
    pub message: String,
}

type Check = fn(&DerivedMetrics) -> bool;

/// Evaluated in order; the first check that fires decides the verdict.
const CHAIN: &[(VerdictCode, Check)] = &[
    (VerdictCode::EbitdaNegative, burns_cash),
    (VerdictCode::CashCycleInsolvency, cash_trapped),
    (VerdictCode::RealEstateRisk, rent_heavy),
];

fn burns_cash(m: &DerivedMetrics) -> bool {
    m.ebitda < Decimal::ZERO
}

fn cash_trapped(m: &DerivedMetrics) -> bool {
    m.cash_conversion_cycle > dec!(60)
}

fn rent_heavy(m: &DerivedMetrics) -> bool {
    m.rent_ratio_pct.is_some_and(|r| r > dec!(15))
}

pub fn verdict(metrics: &DerivedMetrics) -> VerdictCode {
    CHAIN
        .iter()
        .find(|(_, fires)| fires(metrics))
        .map(|(code, _)| *code)
        .unwrap_or(VerdictCode::Healthy)
}

/// [`verdict`] together with its message.
pub fn explain(metrics: &DerivedMetrics) -> Verdict {
    let code = verdict(metrics);
    Verdict {
        code,
        message: code.message().to_string(),
    }
}

impl VerdictCode {
    pub fn message(self) -> &'static str {
        match self {
            VerdictCode::EbitdaNegative => {
                "Emergency intervention: the business model is not viable at current costs. \
                 Restructure payroll or fixed costs immediately."
            }
            VerdictCode::CashCycleInsolvency => {
                "Insolvent despite profitability: cash is trapped in receivables and stock \
                 for more than 60 days."
            }
            VerdictCode::RealEstateRisk => {
                "Real-estate risk: rent above 15% of sales puts the business at the mercy of \
                 its premises."
            }
            VerdictCode::Healthy => "Healthy and scalable: the business can grow on its current model.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::metrics::compute_default;
    use crate::statements::FinancialInputs;

    fn base() -> FinancialInputs {
        FinancialInputs {
            revenue: dec!(50_000),
            cogs: dec!(30_000),
            operating_expenses: dec!(15_000),
            rent: Some(dec!(3_000)),
            accounts_receivable: dec!(5_000),
            inventory: dec!(5_000),
            accounts_payable: dec!(5_000),
            ..Default::default()
        }
    }

    #[test]
    fn test_healthy() {
        assert_eq!(verdict(&compute_default(&base())), VerdictCode::Healthy);
    }

    #[test]
    fn test_ebitda_dominates_cash_cycle() {
        let mut inputs = base();
        inputs.operating_expenses = dec!(25_000);
        inputs.inventory = dec!(200_000);
        let m = compute_default(&inputs);
        assert!(m.ebitda < Decimal::ZERO);
        assert!(m.cash_conversion_cycle > dec!(60));
        assert_eq!(verdict(&m), VerdictCode::EbitdaNegative);
    }

    #[test]
    fn test_cash_cycle_before_rent() {
        let mut inputs = base();
        inputs.inventory = dec!(200_000);
        inputs.rent = Some(dec!(10_000));
        assert_eq!(
            verdict(&compute_default(&inputs)),
            VerdictCode::CashCycleInsolvency
        );
    }

    #[test]
    fn test_rent_risk() {
        let mut inputs = base();
        inputs.rent = Some(dec!(8_000));
        let v = explain(&compute_default(&inputs));
        assert_eq!(v.code, VerdictCode::RealEstateRisk);
        assert!(v.message.starts_with("Real-estate risk"));
    }

    #[test]
    fn test_rent_not_itemised_never_triggers() {
        let mut inputs = base();
        inputs.rent = None;
        assert_eq!(verdict(&compute_default(&inputs)), VerdictCode::Healthy);
    }
}
