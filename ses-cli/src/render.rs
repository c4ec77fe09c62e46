//! Plain-text rendering of the case table and totals.

use std::fmt;

use ses_core::format::format_yen;
use ses_core::{Case, CaseRow, Snapshot, Totals, compute_row, compute_totals};

/// One rendered line: the stored case next to its derived figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub case: Case,
    pub figures: CaseRow,
}

/// Everything a front end shows for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseTable {
    pub tax_included: bool,
    pub rows: Vec<RenderedRow>,
    pub totals: Totals,
}

impl CaseTable {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let rows = snapshot
            .cases
            .iter()
            .map(|case| RenderedRow {
                case: case.clone(),
                figures: compute_row(case, snapshot.tax_included),
            })
            .collect();

        Self {
            tax_included: snapshot.tax_included,
            rows,
            totals: compute_totals(&snapshot.cases, snapshot.tax_included),
        }
    }

    pub fn tax_label(&self) -> &'static str {
        tax_label(self.tax_included)
    }
}

pub fn tax_label(tax_included: bool) -> &'static str {
    if tax_included { "tax incl." } else { "tax excl." }
}

/// The headline figures, e.g. `sales ¥5,400,000  profit ¥1,800,000 (tax excl.)`.
pub struct TotalsLine<'a>(pub &'a Totals, pub bool);

impl fmt::Display for TotalsLine<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "sales {}  profit {} ({})",
            format_yen(self.0.sales),
            format_yen(self.0.profit),
            tax_label(self.1)
        )
    }
}

const HEADERS: [&str; 7] = ["ID", "NAME", "SALES", "COST", "MONTHS", "PERIOD SALES", "PERIOD PROFIT"];

impl fmt::Display for CaseTable {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let cells: Vec<[String; 7]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.case.id.to_string(),
                    row.case.name.clone(),
                    format_yen(row.figures.adjusted_sales),
                    format_yen(row.figures.adjusted_cost),
                    row.case.duration.to_string(),
                    format_yen(row.figures.period_sales),
                    format_yen(row.figures.period_profit),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for line in &cells {
            for (width, cell) in widths.iter_mut().zip(line) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_line(f, &HEADERS.map(str::to_string), &widths)?;
        if cells.is_empty() {
            writeln!(f, "(no cases)")?;
        }
        for line in &cells {
            write_line(f, line, &widths)?;
        }
        write!(f, "{}", TotalsLine(&self.totals, self.tax_included))
    }
}

/// Name is left-aligned, everything else right-aligned.
fn write_line(
    f: &mut fmt::Formatter<'_>,
    cells: &[String; 7],
    widths: &[usize; 7],
) -> fmt::Result {
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            f.write_str("  ")?;
        }
        let pad = width.saturating_sub(cell.chars().count());
        if i == 1 {
            write!(f, "{cell}{}", " ".repeat(pad))?;
        } else {
            write!(f, "{}{cell}", " ".repeat(pad))?;
        }
    }
    writeln!(f)
}
