//! Aggregate figures over a whole case list.

use crate::Case;
use crate::calculations::row::compute_row;

/// Period totals across every case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub sales: u64,
    pub profit: u64,
}

/// Sums period sales and period profit over `cases`.
///
/// Profit is accumulated from each row's floored monthly profit, so the
/// totals always equal the sum of the rows a caller renders. A loss-making
/// case adds its sales but nothing to profit.
pub fn compute_totals(
    cases: &[Case],
    tax_included: bool,
) -> Totals {
    cases
        .iter()
        .map(|case| compute_row(case, tax_included))
        .fold(Totals::default(), |acc, row| Totals {
            sales: acc.sales.saturating_add(row.period_sales),
            profit: acc.profit.saturating_add(row.period_profit),
        })
}
