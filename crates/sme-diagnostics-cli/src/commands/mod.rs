pub mod breakeven;
pub mod classify;
pub mod diagnose;
pub mod pricing;
pub mod trend;
pub mod valuation;
