//! Strict CSV import of a monthly table: one header row, one row per period.
//!
//! Required columns are never defaulted. A missing column or an unreadable
//! amount stops the import with an error naming the column.

use rust_decimal::Decimal;
use std::io::Read;
use std::str::FromStr;

use super::periods::LabelledPeriod;
use crate::error::DiagnosticsError;
use crate::statements::FinancialInputs;
use crate::DiagnosticsResult;

/// Columns every row must provide, in no particular order.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "period",
    "revenue",
    "cogs",
    "operating_expenses",
    "depreciation",
    "interest_expense",
    "income_tax",
    "cash",
    "accounts_receivable",
    "inventory",
    "accounts_payable",
    "bank_debt",
];

/// Columns that may be absent or left blank.
pub const OPTIONAL_COLUMNS: [&str; 3] = ["rent", "payroll", "other_current_liabilities"];

/// Months expected in a yearly upload.
pub const EXPECTED_PERIODS: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedTable {
    pub periods: Vec<LabelledPeriod>,
    pub warnings: Vec<String>,
}

/// Parse a CSV table from any reader.
pub fn read_periods<R: Read>(reader: R) -> DiagnosticsResult<ImportedTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut periods = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        periods.push(columns.parse_row(row, &record)?);
    }

    if periods.is_empty() {
        return Err(DiagnosticsError::InsufficientData(
            "The table has a header but no data rows.".into(),
        ));
    }

    let mut warnings = Vec::new();
    if periods.len() != EXPECTED_PERIODS {
        warnings.push(format!(
            "Expected {} monthly rows, found {}.",
            EXPECTED_PERIODS,
            periods.len()
        ));
    }
    tracing::debug!(rows = periods.len(), "periods imported");

    Ok(ImportedTable { periods, warnings })
}

/// Parse a CSV table held in memory.
pub fn parse_periods(text: &str) -> DiagnosticsResult<ImportedTable> {
    read_periods(text.as_bytes())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

struct ColumnIndex {
    required: [usize; 12],
    optional: [Option<usize>; 3],
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> DiagnosticsResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let mut required = [0usize; 12];
        for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = find(name).ok_or_else(|| DiagnosticsError::MissingColumn {
                column: name.to_string(),
            })?;
        }
        let mut optional = [None; 3];
        for (slot, name) in optional.iter_mut().zip(OPTIONAL_COLUMNS) {
            *slot = find(name);
        }
        Ok(Self { required, optional })
    }

    fn parse_row(&self, row: usize, record: &csv::StringRecord) -> DiagnosticsResult<LabelledPeriod> {
        let period = record.get(self.required[0]).unwrap_or_default().to_string();
        if period.is_empty() {
            return Err(DiagnosticsError::InvalidCell {
                row,
                column: "period".into(),
                value: period,
            });
        }

        let amount = |k: usize| -> DiagnosticsResult<Decimal> {
            let raw = record.get(self.required[k]).unwrap_or_default();
            parse_amount(raw).ok_or_else(|| DiagnosticsError::InvalidCell {
                row,
                column: REQUIRED_COLUMNS[k].to_string(),
                value: raw.to_string(),
            })
        };
        let optional = |k: usize| -> DiagnosticsResult<Option<Decimal>> {
            let Some(idx) = self.optional[k] else {
                return Ok(None);
            };
            let raw = record.get(idx).unwrap_or_default();
            if raw.is_empty() {
                return Ok(None);
            }
            parse_amount(raw)
                .map(Some)
                .ok_or_else(|| DiagnosticsError::InvalidCell {
                    row,
                    column: OPTIONAL_COLUMNS[k].to_string(),
                    value: raw.to_string(),
                })
        };

        let financials = FinancialInputs {
            revenue: amount(1)?,
            cogs: amount(2)?,
            operating_expenses: amount(3)?,
            depreciation: amount(4)?,
            interest_expense: amount(5)?,
            income_tax: amount(6)?,
            cash: amount(7)?,
            accounts_receivable: amount(8)?,
            inventory: amount(9)?,
            accounts_payable: amount(10)?,
            bank_debt: amount(11)?,
            rent: optional(0)?,
            payroll: optional(1)?,
            other_current_liabilities: optional(2)?.unwrap_or_default(),
        };

        Ok(LabelledPeriod { period, financials })
    }
}

/// Accepts plain decimals, with an optional leading `$` and `_` separators.
fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != '_')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "period,revenue,cogs,operating_expenses,depreciation,interest_expense,\
income_tax,cash,accounts_receivable,inventory,accounts_payable,bank_debt";

    fn table(rows: &[&str]) -> String {
        let mut s = HEADER.to_string();
        for r in rows {
            s.push('\n');
            s.push_str(r);
        }
        s
    }

    #[test]
    fn test_parse_two_rows() {
        let csv = table(&[
            "2024-01,50000,30000,15000,1500,500,900,8000,15000,20000,10000,12000",
            "2024-02,52000,31000,15000,1500,500,950,9000,14000,19000,11000,11500",
        ]);
        let imported = parse_periods(&csv).unwrap();
        assert_eq!(imported.periods.len(), 2);
        let first = &imported.periods[0];
        assert_eq!(first.period, "2024-01");
        assert_eq!(first.financials.revenue, dec!(50000));
        assert_eq!(first.financials.bank_debt, dec!(12000));
        assert_eq!(first.financials.rent, None);
        assert_eq!(imported.warnings.len(), 1, "two rows is not a full year");
    }

    #[test]
    fn test_full_year_has_no_warning() {
        let rows: Vec<String> = (1..=12)
            .map(|m| format!("2024-{:02},1000,600,300,10,5,9,100,150,200,100,50", m))
            .collect();
        let refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        let imported = parse_periods(&table(&refs)).unwrap();
        assert_eq!(imported.periods.len(), 12);
        assert!(imported.warnings.is_empty());
    }

    #[test]
    fn test_missing_column_is_named() {
        let csv = "period,revenue,cogs\n2024-01,100,50";
        match parse_periods(csv) {
            Err(DiagnosticsError::MissingColumn { column }) => {
                assert_eq!(column, "operating_expenses")
            }
            other => panic!("Expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_required_cell_is_not_defaulted() {
        let csv = table(&["2024-01,50000,,15000,1500,500,900,8000,15000,20000,10000,12000"]);
        match parse_periods(&csv) {
            Err(DiagnosticsError::InvalidCell { row, column, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "cogs");
            }
            other => panic!("Expected InvalidCell, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_cell() {
        let csv = table(&["2024-01,lots,30000,15000,1500,500,900,8000,15000,20000,10000,12000"]);
        assert!(matches!(
            parse_periods(&csv),
            Err(DiagnosticsError::InvalidCell { .. })
        ));
    }

    #[test]
    fn test_optional_columns_and_header_case() {
        let csv = "Period,Revenue,COGS,Operating_Expenses,Depreciation,Interest_Expense,\
Income_Tax,Cash,Accounts_Receivable,Inventory,Accounts_Payable,Bank_Debt,Rent,Payroll\n\
2024-01,$50000,30000,15000,1500,500,900,8000,15000,20000,10000,12000,4000,\n";
        let imported = parse_periods(csv).unwrap();
        let f = &imported.periods[0].financials;
        assert_eq!(f.revenue, dec!(50000));
        assert_eq!(f.rent, Some(dec!(4000)));
        assert_eq!(f.payroll, None);
    }

    #[test]
    fn test_header_only_is_insufficient() {
        assert!(matches!(
            parse_periods(HEADER),
            Err(DiagnosticsError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        let csv = table(&["2024-01,50000,30000"]);
        assert!(matches!(parse_periods(&csv), Err(DiagnosticsError::Import(_))));
    }
}
