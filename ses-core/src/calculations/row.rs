//! Per-case figures.
//!
//! | Figure           | Derivation                                   |
//! |------------------|----------------------------------------------|
//! | `adjusted_sales` | `sales`, or `floor(sales * 1.1)` with tax    |
//! | `adjusted_cost`  | `cost`, or `floor(cost * 1.1)` with tax      |
//! | `monthly_profit` | `max(0, adjusted_sales - adjusted_cost)`     |
//! | `period_sales`   | `adjusted_sales * duration`                  |
//! | `period_profit`  | `monthly_profit * duration`                  |

use crate::Case;
use crate::calculations::common::{apply_tax, over_period};

/// Derived figures for a single case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseRow {
    pub id: i64,
    pub adjusted_sales: u64,
    pub adjusted_cost: u64,
    /// Never negative: a loss-making case earns zero profit.
    pub monthly_profit: u64,
    pub period_sales: u64,
    pub period_profit: u64,
}

/// Derives the displayed figures for one case.
///
/// # Examples
///
/// ```
/// use ses_core::{Case, compute_row};
///
/// let row = compute_row(&Case::sample(), false);
///
/// assert_eq!(row.monthly_profit, 300_000);
/// assert_eq!(row.period_sales, 5_400_000);
/// assert_eq!(row.period_profit, 1_800_000);
/// ```
pub fn compute_row(
    case: &Case,
    tax_included: bool,
) -> CaseRow {
    let adjusted_sales = apply_tax(case.sales, tax_included);
    let adjusted_cost = apply_tax(case.cost, tax_included);
    let monthly_profit = adjusted_sales.saturating_sub(adjusted_cost);

    CaseRow {
        id: case.id,
        adjusted_sales,
        adjusted_cost,
        monthly_profit,
        period_sales: over_period(adjusted_sales, case.duration),
        period_profit: over_period(monthly_profit, case.duration),
    }
}
