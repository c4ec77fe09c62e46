//! Sales and profit calculations for a list of cases.
//!
//! Everything in here is a pure function of a case list and the tax mode.
//! Callers re-derive figures whenever they need fresh output.

pub mod common;
pub mod row;
pub mod totals;

pub use common::{TAX_RATE, apply_tax};
pub use row::{CaseRow, compute_row};
pub use totals::{Totals, compute_totals};
