//! Survival-line arithmetic: contribution margin, break-even and target sales.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DiagnosticsError;
use crate::types::{pct_of, safe_div, Money, Percent, Ratio};
use crate::DiagnosticsResult;

/// (Revenue - variable costs) / revenue; zero when revenue is not positive.
pub fn contribution_margin_ratio(revenue: Money, variable_costs: Money) -> Ratio {
    if revenue <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        safe_div(revenue.saturating_sub(variable_costs), revenue)
    }
}

/// Sales at which the contribution margin exactly covers fixed costs.
/// Zero when the ratio is not positive (break-even unreachable).
pub fn break_even_sales(fixed_costs: Money, cm_ratio: Ratio) -> Money {
    required_sales(fixed_costs, Decimal::ZERO, cm_ratio)
}

/// Sales needed to cover fixed costs and still earn `target_profit`.
pub fn required_sales(fixed_costs: Money, target_profit: Money, cm_ratio: Ratio) -> Money {
    if cm_ratio <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        safe_div(fixed_costs.saturating_add(target_profit), cm_ratio)
    }
}

/// How far revenue can fall before reaching break-even, as % of revenue.
pub fn margin_of_safety_pct(revenue: Money, break_even: Money) -> Percent {
    pct_of(revenue.saturating_sub(break_even), revenue)
}

// ---------------------------------------------------------------------------
// Enveloped target-sales calculation
// ---------------------------------------------------------------------------

/// Input for a target-sales calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSalesInput {
    pub fixed_costs: Money,
    /// Contribution margin ratio (0.40 = 40%)
    pub contribution_margin_ratio: Ratio,
    #[serde(default)]
    pub target_profit: Money,
    /// Current sales, for the shortfall and margin of safety
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_sales: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSalesOutput {
    pub break_even_sales: Money,
    pub required_sales: Money,
    /// Required sales - current sales (never negative)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_of_safety_pct: Option<Percent>,
    /// False when the contribution margin ratio leaves nothing to cover fixed costs
    pub reachable: bool,
}

/// Break-even and target sales with the same zero-guard as [`required_sales`].
pub fn target_sales(input: &TargetSalesInput) -> DiagnosticsResult<TargetSalesOutput> {
    if input.fixed_costs < Decimal::ZERO {
        return Err(DiagnosticsError::InvalidInput {
            field: "fixed_costs".into(),
            reason: "Fixed costs cannot be negative.".into(),
        });
    }
    if input.contribution_margin_ratio > Decimal::ONE {
        return Err(DiagnosticsError::InvalidInput {
            field: "contribution_margin_ratio".into(),
            reason: "Contribution margin ratio is a fraction of sales and cannot exceed 1.".into(),
        });
    }

    let m = input.contribution_margin_ratio;
    let break_even = break_even_sales(input.fixed_costs, m);
    let required = required_sales(input.fixed_costs, input.target_profit, m);

    Ok(TargetSalesOutput {
        break_even_sales: break_even,
        required_sales: required,
        shortfall: input
            .current_sales
            .map(|sales| required.saturating_sub(sales).max(Decimal::ZERO)),
        margin_of_safety_pct: input
            .current_sales
            .map(|sales| margin_of_safety_pct(sales, break_even)),
        reachable: m > Decimal::ZERO,
    })
}
