pub mod breakeven;
pub mod classification;
pub mod metrics;
pub mod report;
pub mod verdict;
