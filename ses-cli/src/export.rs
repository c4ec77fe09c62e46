//! CSV export of the rendered case table.

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::render::CaseTable;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One CSV line. Case lines carry every column; the trailing totals line
/// leaves the per-case columns empty.
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    id: Option<i64>,
    name: &'a str,
    sales: Option<u64>,
    cost: Option<u64>,
    duration: Option<u32>,
    period_sales: u64,
    period_profit: u64,
    tax: &'static str,
}

/// Writes `table` as CSV with a header, one line per case and a final
/// `TOTAL` line. Amounts are plain integers so spreadsheets can sum them.
///
/// Returns the number of case lines written.
pub fn write_csv<W: Write>(
    table: &CaseTable,
    writer: W,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let tax = table.tax_label();

    for row in &table.rows {
        csv_writer.serialize(ExportRecord {
            id: Some(row.case.id),
            name: &row.case.name,
            sales: Some(row.figures.adjusted_sales),
            cost: Some(row.figures.adjusted_cost),
            duration: Some(row.case.duration),
            period_sales: row.figures.period_sales,
            period_profit: row.figures.period_profit,
            tax,
        })?;
    }

    csv_writer.serialize(ExportRecord {
        id: None,
        name: "TOTAL",
        sales: None,
        cost: None,
        duration: None,
        period_sales: table.totals.sales,
        period_profit: table.totals.profit,
        tax,
    })?;

    csv_writer.flush()?;
    Ok(table.rows.len())
}
