pub mod error;
pub mod statements;
pub mod types;

#[cfg(feature = "diagnostics")]
pub mod diagnostics;

#[cfg(feature = "pricing")]
pub mod pricing;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "trend")]
pub mod trend;

pub use error::DiagnosticsError;
pub use statements::{EngineSettings, FinancialInputs};
pub use types::*;

/// Standard result type for all diagnostics operations
pub type DiagnosticsResult<T> = Result<T, DiagnosticsError>;
