use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::DiagnosticsError;
use crate::statements::EngineSettings;
use crate::types::{with_metadata, ComputationOutput, Money, Multiple};
use crate::DiagnosticsResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Input for an EBITDA-multiple valuation of a small business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationInput {
    /// EBITDA of one period
    pub period_ebitda: Money,
    /// Periods per year used to annualise; the engine default when omitted
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
    /// Multiple of annual EBITDA a buyer would pay; the engine default when omitted
    #[serde(default = "default_multiple")]
    pub multiple: Multiple,
    /// Owner-occupied premises, if the owner does not pay rent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_premises: Option<OwnedPremises>,
    #[serde(default)]
    pub bank_debt: Money,
}

/// Premises the owner uses without paying market rent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedPremises {
    /// Rent the business would pay per period at market rates
    pub virtual_rent: Money,
    /// Market value of the property
    pub real_estate_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationOutput {
    pub annualized_ebitda: Money,
    /// Annual EBITDA x multiple; zero when EBITDA is not positive
    pub enterprise_value: Money,
    /// Enterprise value after charging market rent for owned premises
    pub operating_value: Money,
    /// Market value of owned premises (zero when rented)
    pub real_estate_value: Money,
    pub bank_debt: Money,
    /// Operating value + real estate - bank debt
    pub net_worth: Money,
}

fn default_periods_per_year() -> u32 {
    EngineSettings::default().periods_per_year
}

fn default_multiple() -> Multiple {
    EngineSettings::default().valuation_multiple
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// `annualized_ebitda x multiple`, or zero when EBITDA is not positive.
pub fn enterprise_value(period_ebitda: Money, periods_per_year: u32, multiple: Multiple) -> Money {
    if period_ebitda <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        period_ebitda
            .saturating_mul(Decimal::from(periods_per_year))
            .saturating_mul(multiple)
    }
}

/// Value the business, optionally separating owned premises from the
/// operation and netting off bank debt.
pub fn value_business(
    input: &ValuationInput,
) -> DiagnosticsResult<ComputationOutput<ValuationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;

    let periods = Decimal::from(input.periods_per_year);
    let annualized_ebitda = input.period_ebitda.saturating_mul(periods);
    let ev = enterprise_value(input.period_ebitda, input.periods_per_year, input.multiple);

    if input.period_ebitda <= Decimal::ZERO {
        warnings.push("EBITDA is not positive; the operation carries no multiple value.".into());
    }

    let (operating_value, real_estate_value) = match &input.owned_premises {
        Some(premises) => {
            // The operation is worth less once it pays the rent it currently avoids.
            let adjusted_ebitda = input.period_ebitda.saturating_sub(premises.virtual_rent);
            let operating =
                enterprise_value(adjusted_ebitda, input.periods_per_year, input.multiple);
            if adjusted_ebitda <= Decimal::ZERO && input.period_ebitda > Decimal::ZERO {
                warnings.push(
                    "EBITDA only covers costs because the premises are rent-free; \
                     the operation alone has no multiple value."
                        .into(),
                );
            }
            (operating, premises.real_estate_value)
        }
        None => (ev, Decimal::ZERO),
    };

    let net_worth = operating_value
        .saturating_add(real_estate_value)
        .saturating_sub(input.bank_debt);
    if net_worth < Decimal::ZERO {
        warnings.push("Bank debt exceeds the value of the business and its property.".into());
    }

    let output = ValuationOutput {
        annualized_ebitda,
        enterprise_value: ev,
        operating_value,
        real_estate_value,
        bank_debt: input.bank_debt,
        net_worth,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "EBITDA multiple valuation with owned-premises adjustment",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate(input: &ValuationInput) -> DiagnosticsResult<()> {
    if input.periods_per_year == 0 {
        return Err(DiagnosticsError::InvalidInput {
            field: "periods_per_year".into(),
            reason: "At least one period per year is required.".into(),
        });
    }
    if input.multiple < Decimal::ZERO || input.multiple > dec!(50) {
        return Err(DiagnosticsError::InvalidInput {
            field: "multiple".into(),
            reason: "Multiple must be between 0 and 50.".into(),
        });
    }
    if input.bank_debt < Decimal::ZERO {
        return Err(DiagnosticsError::InvalidInput {
            field: "bank_debt".into(),
            reason: "Bank debt cannot be negative.".into(),
        });
    }
    if let Some(p) = &input.owned_premises {
        if p.virtual_rent < Decimal::ZERO || p.real_estate_value < Decimal::ZERO {
            return Err(DiagnosticsError::InvalidInput {
                field: "owned_premises".into(),
                reason: "Virtual rent and property value cannot be negative.".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
