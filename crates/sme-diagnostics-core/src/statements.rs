use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DiagnosticsError;
use crate::types::{Money, Multiple};
use crate::DiagnosticsResult;

/// Profit-and-loss figures plus a balance-sheet snapshot for one period.
///
/// Every amount is expected to be non-negative. `compute` does not check
/// this; [`FinancialInputs::validate`] does, and the enveloped operations
/// call it before computing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialInputs {
    /// Sales for the period
    pub revenue: Money,
    /// Cost of goods sold (treated as the variable cost base)
    pub cogs: Money,
    /// Total operating expenses, rent and payroll included
    pub operating_expenses: Money,
    /// Rent share of operating expenses, if itemised
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<Money>,
    /// Payroll share of operating expenses, if itemised
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payroll: Option<Money>,
    pub depreciation: Money,
    pub interest_expense: Money,
    pub income_tax: Money,
    pub cash: Money,
    pub accounts_receivable: Money,
    pub inventory: Money,
    pub accounts_payable: Money,
    /// Bank debt, counted as a current liability for the acid test
    pub bank_debt: Money,
    #[serde(default)]
    pub other_current_liabilities: Money,
}

impl FinancialInputs {
    /// Current liabilities used by the acid test.
    pub fn current_liabilities(&self) -> Money {
        self.accounts_payable
            .saturating_add(self.bank_debt)
            .saturating_add(self.other_current_liabilities)
    }

    /// Reject negative amounts, naming the first offending field.
    pub fn validate(&self) -> DiagnosticsResult<()> {
        let fields = [
            ("revenue", Some(self.revenue)),
            ("cogs", Some(self.cogs)),
            ("operating_expenses", Some(self.operating_expenses)),
            ("rent", self.rent),
            ("payroll", self.payroll),
            ("depreciation", Some(self.depreciation)),
            ("interest_expense", Some(self.interest_expense)),
            ("income_tax", Some(self.income_tax)),
            ("cash", Some(self.cash)),
            ("accounts_receivable", Some(self.accounts_receivable)),
            ("inventory", Some(self.inventory)),
            ("accounts_payable", Some(self.accounts_payable)),
            ("bank_debt", Some(self.bank_debt)),
            ("other_current_liabilities", Some(self.other_current_liabilities)),
        ];
        for (field, value) in fields {
            if let Some(v) = value {
                if v < Decimal::ZERO {
                    return Err(DiagnosticsError::InvalidInput {
                        field: field.into(),
                        reason: "Amounts cannot be negative.".into(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Non-fatal inconsistencies worth reporting alongside a result.
    pub fn consistency_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let itemised = self
            .rent
            .unwrap_or_default()
            .saturating_add(self.payroll.unwrap_or_default());
        if itemised > self.operating_expenses {
            warnings.push(format!(
                "Rent plus payroll ({}) exceeds total operating expenses ({}).",
                itemised, self.operating_expenses
            ));
        }
        if self.revenue <= Decimal::ZERO {
            warnings.push(
                "Revenue is zero or negative; revenue-based margins and ratios set to 0.".into(),
            );
        }
        if self.cogs.is_zero() && !(self.inventory.is_zero() && self.accounts_payable.is_zero()) {
            warnings.push("COGS is zero; inventory and payable days set to 0.".into());
        }
        warnings
    }
}

/// Engine-wide assumptions, declared once instead of being scattered
/// through the calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Days covered by one set of inputs (30 for monthly figures)
    pub period_days: u32,
    /// Periods per year, used to annualise EBITDA
    pub periods_per_year: u32,
    /// Annual EBITDA multiple applied in valuation
    pub valuation_multiple: Multiple,
    /// First-vs-last change below which a trend is "Stable"
    /// (percent for growth, days for the cash cycle)
    pub trend_threshold: Decimal,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            period_days: 30,
            periods_per_year: 12,
            valuation_multiple: dec!(3),
            trend_threshold: dec!(5),
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> DiagnosticsResult<()> {
        if self.period_days == 0 {
            return Err(DiagnosticsError::InvalidInput {
                field: "period_days".into(),
                reason: "Period must cover at least one day.".into(),
            });
        }
        if self.periods_per_year == 0 {
            return Err(DiagnosticsError::InvalidInput {
                field: "periods_per_year".into(),
                reason: "At least one period per year is required.".into(),
            });
        }
        if self.valuation_multiple < Decimal::ZERO {
            return Err(DiagnosticsError::InvalidInput {
                field: "valuation_multiple".into(),
                reason: "Valuation multiple cannot be negative.".into(),
            });
        }
        if self.trend_threshold < Decimal::ZERO {
            return Err(DiagnosticsError::InvalidInput {
                field: "trend_threshold".into(),
                reason: "Trend threshold cannot be negative.".into(),
            });
        }
        Ok(())
    }
}
