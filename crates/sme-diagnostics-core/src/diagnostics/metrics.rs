use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::breakeven;
use crate::statements::{EngineSettings, FinancialInputs};
use crate::types::{pct_of, safe_div, Days, Money, Percent, Ratio};

// ---------------------------------------------------------------------------
// Derived metrics
// ---------------------------------------------------------------------------

/// Everything the engine derives from one [`FinancialInputs`] record.
///
/// Ratios with a denominator are zero when that denominator is zero (or,
/// for revenue-based margins, not positive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Revenue - COGS
    pub gross_profit: Money,
    /// Gross profit - operating expenses
    pub ebitda: Money,
    /// EBITDA - depreciation
    pub ebit: Money,
    /// EBIT - interest - income tax
    pub net_income: Money,

    pub gross_margin_pct: Percent,
    pub ebitda_margin_pct: Percent,
    pub ebit_margin_pct: Percent,
    pub net_margin_pct: Percent,
    /// Rent / revenue; absent when rent was not itemised
    pub rent_ratio_pct: Option<Percent>,
    /// Payroll / gross profit; absent when payroll was not itemised
    pub payroll_ratio_pct: Option<Percent>,

    /// Operating expenses + interest
    pub fixed_costs: Money,
    /// (Revenue - COGS) / revenue
    pub contribution_margin_ratio: Ratio,
    /// Fixed costs / contribution margin ratio
    pub break_even_sales: Money,
    /// (Revenue - break-even) / revenue
    pub margin_of_safety_pct: Percent,
    /// Sales still missing to reach break-even (never negative)
    pub break_even_shortfall: Money,

    /// Receivables / revenue x period days
    pub dso: Days,
    /// Inventory / COGS x period days
    pub dio: Days,
    /// Payables / COGS x period days
    pub dpo: Days,
    /// DSO + DIO - DPO
    pub cash_conversion_cycle: Days,
    /// Days of the cycle the owner finances (never negative)
    pub financing_gap_days: Days,

    pub current_liabilities: Money,
    /// (Cash + receivables) / current liabilities
    pub acid_test_ratio: Ratio,
    /// EBITDA / interest expense
    pub interest_coverage: Ratio,

    /// EBITDA annualised
    pub annualized_ebitda: Money,
    /// Annualised EBITDA x multiple; zero when EBITDA is not positive
    pub valuation: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive every metric from one set of inputs. Pure and deterministic;
/// inputs are not validated.
pub fn compute(inputs: &FinancialInputs, settings: &EngineSettings) -> DerivedMetrics {
    let revenue = inputs.revenue;

    // -- P&L cascade ---------------------------------------------------------
    let gross_profit = revenue.saturating_sub(inputs.cogs);
    let ebitda = gross_profit.saturating_sub(inputs.operating_expenses);
    let ebit = ebitda.saturating_sub(inputs.depreciation);
    let net_income = ebit
        .saturating_sub(inputs.interest_expense)
        .saturating_sub(inputs.income_tax);

    let gross_margin_pct = pct_of(gross_profit, revenue);
    let ebitda_margin_pct = pct_of(ebitda, revenue);
    let ebit_margin_pct = pct_of(ebit, revenue);
    let net_margin_pct = pct_of(net_income, revenue);

    let rent_ratio_pct = inputs.rent.map(|rent| pct_of(rent, revenue));
    let payroll_ratio_pct = inputs.payroll.map(|payroll| pct_of(payroll, gross_profit));

    // -- Survival line -------------------------------------------------------
    let fixed_costs = inputs.operating_expenses.saturating_add(inputs.interest_expense);
    let contribution_margin_ratio = breakeven::contribution_margin_ratio(revenue, inputs.cogs);
    let break_even_sales = breakeven::break_even_sales(fixed_costs, contribution_margin_ratio);
    let margin_of_safety_pct = breakeven::margin_of_safety_pct(revenue, break_even_sales);
    let break_even_shortfall = break_even_sales.saturating_sub(revenue).max(Decimal::ZERO);

    // -- Cash cycle ----------------------------------------------------------
    let period_days = Decimal::from(settings.period_days);
    let dso = days_outstanding(inputs.accounts_receivable, revenue, period_days);
    let dio = days_outstanding(inputs.inventory, inputs.cogs, period_days);
    let dpo = days_outstanding(inputs.accounts_payable, inputs.cogs, period_days);
    let cash_conversion_cycle = dso.saturating_add(dio).saturating_sub(dpo);
    let financing_gap_days = cash_conversion_cycle.max(Decimal::ZERO);

    // -- Liquidity and coverage ----------------------------------------------
    let current_liabilities = inputs.current_liabilities();
    let acid_test_ratio = safe_div(
        inputs.cash.saturating_add(inputs.accounts_receivable),
        current_liabilities,
    );
    let interest_coverage = safe_div(ebitda, inputs.interest_expense);

    // -- Valuation -----------------------------------------------------------
    let annualized_ebitda = ebitda.saturating_mul(Decimal::from(settings.periods_per_year));
    let valuation = if ebitda > Decimal::ZERO {
        annualized_ebitda.saturating_mul(settings.valuation_multiple)
    } else {
        Decimal::ZERO
    };

    DerivedMetrics {
        gross_profit,
        ebitda,
        ebit,
        net_income,
        gross_margin_pct,
        ebitda_margin_pct,
        ebit_margin_pct,
        net_margin_pct,
        rent_ratio_pct,
        payroll_ratio_pct,
        fixed_costs,
        contribution_margin_ratio,
        break_even_sales,
        margin_of_safety_pct,
        break_even_shortfall,
        dso,
        dio,
        dpo,
        cash_conversion_cycle,
        financing_gap_days,
        current_liabilities,
        acid_test_ratio,
        interest_coverage,
        annualized_ebitda,
        valuation,
    }
}

/// [`compute`] with the default monthly settings.
pub fn compute_default(inputs: &FinancialInputs) -> DerivedMetrics {
    compute(inputs, &EngineSettings::default())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// balance / flow x days; zero unless the flow is positive.
/// `balance x days / flow`; zero when the flow is not positive or the
/// result leaves the decimal range.
fn days_outstanding(balance: Money, flow: Money, period_days: Decimal) -> Days {
    if flow <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    balance
        .checked_mul(period_days)
        .and_then(|n| n.checked_div(flow))
        .unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
