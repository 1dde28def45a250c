use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagnosticsError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    /// Margin plus commission leaves nothing to cover the unit cost.
    #[error(
        "Cannot price: margin {margin_pct}% plus commission {commission_pct}% must stay below 100%"
    )]
    ImpossibleMargin {
        margin_pct: Decimal,
        commission_pct: Decimal,
    },

    /// A valid pricing request whose result does not fit in a decimal.
    #[error("Cannot price: {quantity} exceeds the representable range")]
    PriceOutOfRange { quantity: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Import error: required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("Import error: row {row}, column '{column}': cannot read '{value}' as an amount")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Import error: {0}")]
    Import(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DiagnosticsError {
    fn from(e: serde_json::Error) -> Self {
        DiagnosticsError::SerializationError(e.to_string())
    }
}

#[cfg(feature = "trend")]
impl From<csv::Error> for DiagnosticsError {
    fn from(e: csv::Error) -> Self {
        DiagnosticsError::Import(e.to_string())
    }
}
