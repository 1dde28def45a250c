use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::diagnostics::metrics::{self, DerivedMetrics};
use crate::diagnostics::verdict::{self, VerdictCode};
use crate::error::DiagnosticsError;
use crate::statements::{EngineSettings, FinancialInputs};
use crate::types::{safe_div, with_metadata, ComputationOutput, Days, Money, Percent};
use crate::DiagnosticsResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// One period of a multi-period table, e.g. a month of the year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledPeriod {
    /// Period label, e.g. "2024-01"
    pub period: String,
    #[serde(flatten)]
    pub financials: FinancialInputs,
}

/// Input for trend analysis across periods (chronological order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendInput {
    pub company_name: String,
    pub periods: Vec<LabelledPeriod>,
    #[serde(default)]
    pub settings: EngineSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Improving,
    Deteriorating,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodResult {
    pub period: String,
    pub metrics: DerivedMetrics,
    pub verdict: VerdictCode,
}

/// First-vs-last period comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendChanges {
    /// (last - first) / |first| revenue, in %
    pub revenue_growth_pct: Percent,
    /// (last - first) / |first| EBITDA, in %
    pub ebitda_growth_pct: Percent,
    /// Change in EBITDA margin, in percentage points
    pub ebitda_margin_change_pp: Percent,
    /// Change in cash conversion cycle, in days
    pub ccc_change_days: Days,
    pub revenue_trend: TrendDirection,
    pub ebitda_trend: TrendDirection,
    /// Lower is better
    pub ccc_trend: TrendDirection,
}

/// Simple means across all periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAverages {
    pub revenue: Money,
    pub ebitda: Money,
    pub ebitda_margin_pct: Percent,
    pub cash_conversion_cycle: Days,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendOutput {
    pub company_name: String,
    pub period_results: Vec<PeriodResult>,
    pub changes: TrendChanges,
    pub averages: PeriodAverages,
    /// Periods with negative EBITDA
    pub loss_making_periods: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute every period independently and compare the first with the last.
pub fn analyze_trend(input: &TrendInput) -> DiagnosticsResult<ComputationOutput<TrendOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.periods.is_empty() {
        return Err(DiagnosticsError::InsufficientData(
            "At least one period is required for trend analysis.".into(),
        ));
    }
    input.settings.validate()?;
    for p in &input.periods {
        p.financials.validate().map_err(|e| match e {
            DiagnosticsError::InvalidInput { field, reason } => DiagnosticsError::InvalidInput {
                field,
                reason: format!("{} (period '{}')", reason, p.period),
            },
            other => other,
        })?;
    }
    if input.periods.len() == 1 {
        warnings.push("Only one period supplied; all trends are Stable.".into());
    }

    let period_results: Vec<PeriodResult> = input
        .periods
        .iter()
        .map(|p| {
            let m = metrics::compute(&p.financials, &input.settings);
            PeriodResult {
                period: p.period.clone(),
                verdict: verdict::verdict(&m),
                metrics: m,
            }
        })
        .collect();

    let (first_in, last_in) = (&input.periods[0], &input.periods[input.periods.len() - 1]);
    let (first, last) = (
        &period_results[0].metrics,
        &period_results[period_results.len() - 1].metrics,
    );
    if first.ebitda.is_zero() && !last.ebitda.is_zero() {
        warnings.push("First-period EBITDA is zero; EBITDA growth set to 0.".into());
    }

    let changes = compare(
        first_in.financials.revenue,
        last_in.financials.revenue,
        first,
        last,
        input.settings.trend_threshold,
    );
    let averages = average(&input.periods, &period_results);

    let loss_making_periods: Vec<String> = period_results
        .iter()
        .filter(|r| r.metrics.ebitda < Decimal::ZERO)
        .map(|r| r.period.clone())
        .collect();

    tracing::debug!(
        company = %input.company_name,
        periods = period_results.len(),
        ebitda_growth_pct = %changes.ebitda_growth_pct,
        "trend computed"
    );

    let output = TrendOutput {
        company_name: input.company_name.clone(),
        period_results,
        changes,
        averages,
        loss_making_periods,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Multi-period trend (first vs last period, simple averages)",
        &serde_json::json!({
            "periods": input.periods.len(),
            "period_days": input.settings.period_days,
            "trend_threshold": input.settings.trend_threshold.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Growth from `first` to `last` in %, measured against |first|.
/// Zero when `first` is zero or the change leaves the decimal range.
pub fn growth_pct(first: Decimal, last: Decimal) -> Percent {
    last.checked_sub(first)
        .and_then(|change| change.checked_div(first.abs()))
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn compare(
    first_revenue: Money,
    last_revenue: Money,
    first: &DerivedMetrics,
    last: &DerivedMetrics,
    threshold: Decimal,
) -> TrendChanges {
    let revenue_growth_pct = growth_pct(first_revenue, last_revenue);
    let ebitda_growth_pct = growth_pct(first.ebitda, last.ebitda);
    let ccc_change_days = last
        .cash_conversion_cycle
        .saturating_sub(first.cash_conversion_cycle);

    TrendChanges {
        revenue_growth_pct,
        ebitda_growth_pct,
        ebitda_margin_change_pp: last.ebitda_margin_pct.saturating_sub(first.ebitda_margin_pct),
        ccc_change_days,
        revenue_trend: higher_is_better(revenue_growth_pct, threshold),
        ebitda_trend: higher_is_better(ebitda_growth_pct, threshold),
        ccc_trend: higher_is_better(-ccc_change_days, threshold),
    }
}

fn higher_is_better(change: Decimal, threshold: Decimal) -> TrendDirection {
    if change > threshold {
        TrendDirection::Improving
    } else if change < -threshold {
        TrendDirection::Deteriorating
    } else {
        TrendDirection::Stable
    }
}

fn average(periods: &[LabelledPeriod], results: &[PeriodResult]) -> PeriodAverages {
    let n = Decimal::from(results.len());

    PeriodAverages {
        revenue: mean(periods.iter().map(|p| p.financials.revenue), n),
        ebitda: mean(results.iter().map(|r| r.metrics.ebitda), n),
        ebitda_margin_pct: mean(results.iter().map(|r| r.metrics.ebitda_margin_pct), n),
        cash_conversion_cycle: mean(results.iter().map(|r| r.metrics.cash_conversion_cycle), n),
    }
}

/// Saturating sum over `n`.
fn mean(values: impl Iterator<Item = Decimal>, n: Decimal) -> Decimal {
    safe_div(values.fold(Decimal::ZERO, Decimal::saturating_add), n)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
