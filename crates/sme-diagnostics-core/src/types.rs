use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentages expressed on a 0-100 scale (12.5 = 12.5%).
pub type Percent = Decimal;

/// Plain ratios (0.35 contribution margin, 1.2x acid test).
pub type Ratio = Decimal;

/// Valuation multiples (e.g., 3x annual EBITDA)
pub type Multiple = Decimal;

/// Day counts (DSO, DIO, DPO, CCC)
pub type Days = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Division that yields zero instead of failing when the denominator is zero
/// or the quotient leaves the decimal range.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// `numerator / denominator × 100`, zero unless the denominator is positive.
pub fn pct_of(numerator: Decimal, denominator: Decimal) -> Percent {
    if denominator <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        numerator
            .checked_div(denominator)
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_safe_div_zero_denominator() {
        assert_eq!(safe_div(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(dec!(10), dec!(4)), dec!(2.5));
    }

    #[test]
    fn test_pct_of_non_positive_denominator() {
        assert_eq!(pct_of(dec!(5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(pct_of(dec!(5), dec!(-10)), Decimal::ZERO);
        assert_eq!(pct_of(dec!(5), dec!(50)), dec!(10));
    }

    #[test]
    fn test_overflowing_quotients_fall_back_to_zero() {
        let tiny = Decimal::new(1, 19);
        assert_eq!(safe_div(Decimal::MAX, tiny), Decimal::ZERO);
        assert_eq!(pct_of(dec!(10_000_000_000), tiny), Decimal::ZERO);
        // quotient fits, x100 does not
        assert_eq!(pct_of(Decimal::MAX, Decimal::ONE), Decimal::ZERO);
    }
}
