//! Shared helpers for the case calculations.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Consumption tax multiplier applied in tax-inclusive mode (10 %).
pub const TAX_RATE: Decimal = Decimal::from_parts(11, 0, 0, false, 1);

/// Applies the consumption tax to a unit price.
///
/// In tax-inclusive mode the amount is multiplied by [`TAX_RATE`] and floored
/// to whole yen. Otherwise it is returned unchanged.
///
/// The multiplication is exact, so `floor(900000 * 1.1)` is always `990000`.
///
/// # Examples
///
/// ```
/// use ses_core::calculations::common::apply_tax;
///
/// assert_eq!(apply_tax(900_000, true), 990_000);
/// assert_eq!(apply_tax(12_345, true), 13_579);
/// assert_eq!(apply_tax(12_345, false), 12_345);
/// ```
pub fn apply_tax(
    amount: u64,
    tax_included: bool,
) -> u64 {
    if !tax_included {
        return amount;
    }

    (Decimal::from(amount) * TAX_RATE)
        .floor()
        .to_u64()
        .unwrap_or(u64::MAX)
}

/// Multiplies a monthly figure by a duration in months, saturating on overflow.
pub fn over_period(
    monthly: u64,
    duration: u32,
) -> u64 {
    monthly.saturating_mul(u64::from(duration))
}
