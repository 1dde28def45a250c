use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::DiagnosticsError;
use crate::types::{pct_of, safe_div, with_metadata, ComputationOutput, Money, Percent};
use crate::DiagnosticsResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Bottom-up cost-plus pricing for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPricingInput {
    /// Materials consumed by one unit
    pub material_cost: Money,
    /// Wage per hour of the person making the unit
    pub hourly_wage: Money,
    /// Minutes of labour per unit
    pub minutes_per_unit: Decimal,
    /// Fixed costs of the period to absorb across production
    pub period_fixed_costs: Money,
    /// Units the business can produce in a month
    pub monthly_capacity_units: Decimal,
    /// Desired profit margin on the selling price, in %
    pub margin_pct: Percent,
    /// Platform or marketplace commission on the selling price, in %
    #[serde(default)]
    pub commission_pct: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPricingOutput {
    /// hourly_wage / 60 x minutes_per_unit
    pub labor_cost: Money,
    /// period_fixed_costs / monthly_capacity_units
    pub fixed_cost_absorption: Money,
    /// material + labour + fixed absorption
    pub unit_cost: Money,
    /// unit_cost / (1 - (margin + commission) / 100)
    pub price: Money,
    /// price x commission
    pub commission_amount: Money,
    /// price x margin
    pub profit_per_unit: Money,
    /// (price - unit_cost) / unit_cost x 100
    pub markup_over_cost_pct: Percent,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price one unit so that margin and commission are both carried by the
/// selling price.
///
/// Fails with [`DiagnosticsError::ImpossibleMargin`] when margin plus
/// commission reaches 100%, since no finite price satisfies it.
pub fn price_unit(input: &UnitPricingInput) -> DiagnosticsResult<UnitPricingOutput> {
    validate(input)?;

    let labor_cost = (input.hourly_wage / dec!(60))
        .checked_mul(input.minutes_per_unit)
        .ok_or_else(|| out_of_range("labor cost"))?;
    let fixed_cost_absorption = safe_div(input.period_fixed_costs, input.monthly_capacity_units);
    let unit_cost = input
        .material_cost
        .checked_add(labor_cost)
        .and_then(|c| c.checked_add(fixed_cost_absorption))
        .ok_or_else(|| out_of_range("unit cost"))?;

    let price = cost_plus_price(unit_cost, input.margin_pct, input.commission_pct)?;

    // Shares of the price are at most the price itself, so these cannot overflow.
    Ok(UnitPricingOutput {
        labor_cost,
        fixed_cost_absorption,
        unit_cost,
        price,
        commission_amount: price * (input.commission_pct / Decimal::ONE_HUNDRED),
        profit_per_unit: price * (input.margin_pct / Decimal::ONE_HUNDRED),
        markup_over_cost_pct: pct_of(price - unit_cost, unit_cost),
    })
}

/// `unit_cost / (1 - (margin_pct + commission_pct) / 100)`.
///
/// A margin just below 100% can push the price past the decimal range; that
/// is reported as [`DiagnosticsError::PriceOutOfRange`].
pub fn cost_plus_price(
    unit_cost: Money,
    margin_pct: Percent,
    commission_pct: Percent,
) -> DiagnosticsResult<Money> {
    let retained = Decimal::ONE - margin_pct.saturating_add(commission_pct) / Decimal::ONE_HUNDRED;
    if retained <= Decimal::ZERO {
        tracing::warn!(
            margin_pct = %margin_pct,
            commission_pct = %commission_pct,
            "pricing rejected: margin plus commission reaches 100%"
        );
        return Err(DiagnosticsError::ImpossibleMargin {
            margin_pct,
            commission_pct,
        });
    }
    unit_cost.checked_div(retained).ok_or_else(|| {
        tracing::warn!(
            unit_cost = %unit_cost,
            retained = %retained,
            "pricing rejected: price exceeds the decimal range"
        );
        out_of_range("price")
    })
}

/// [`price_unit`] wrapped in the standard output envelope.
pub fn analyze_unit_pricing(
    input: &UnitPricingInput,
) -> DiagnosticsResult<ComputationOutput<UnitPricingOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = price_unit(input)?;

    if input.monthly_capacity_units.is_zero() && !input.period_fixed_costs.is_zero() {
        warnings.push("Monthly capacity is zero; fixed costs are not absorbed (set to 0).".into());
    }
    if input.margin_pct.saturating_add(input.commission_pct) > dec!(80) {
        warnings.push(
            "Margin plus commission above 80% makes the price very sensitive to cost changes."
                .into(),
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Bottom-up cost-plus pricing (margin and commission on selling price)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn out_of_range(quantity: &str) -> DiagnosticsError {
    DiagnosticsError::PriceOutOfRange {
        quantity: quantity.into(),
    }
}

fn validate(input: &UnitPricingInput) -> DiagnosticsResult<()> {
    let non_negative = [
        ("material_cost", input.material_cost),
        ("hourly_wage", input.hourly_wage),
        ("minutes_per_unit", input.minutes_per_unit),
        ("period_fixed_costs", input.period_fixed_costs),
        ("monthly_capacity_units", input.monthly_capacity_units),
        ("margin_pct", input.margin_pct),
        ("commission_pct", input.commission_pct),
    ];
    for (field, value) in non_negative {
        if value < Decimal::ZERO {
            return Err(DiagnosticsError::InvalidInput {
                field: field.into(),
                reason: "Cannot be negative.".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
