//! Coercion of raw user input into the non-negative integers stored on a case.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// Error returned when a string cannot be read as a number at all.
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseAmountError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Trims whitespace and removes `,` thousands separators.
fn normalize_amount_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a non-negative whole amount.
///
/// Handles comma as thousands separator (e.g. `"1,234"`) and scientific
/// notation (`"1e5"`). Empty or whitespace-only input is treated as 0.
/// Negative values clamp to 0, fractions are truncated toward zero and
/// values past `u64::MAX` saturate.
pub fn parse_amount(s: &str) -> Result<u64, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Ok(0);
    }

    let parsed = normalized
        .parse::<Decimal>()
        .or_else(|e| Decimal::from_scientific(&normalized).map_err(|_| e));

    match parsed {
        Ok(value) => Ok(clamp_amount(value)),
        // Out of Decimal's range or precision, but still a number.
        Err(source) => out_of_range_amount(&normalized).ok_or_else(|| ParseAmountError {
            input: s.to_string(),
            source,
        }),
    }
}

/// Like [`parse_amount`], but unparseable input becomes 0 (with a warning)
/// so the non-negative invariant holds for every write.
pub fn coerce_amount(s: &str) -> u64 {
    parse_amount(s).unwrap_or_else(|e| {
        tracing::warn!(input = %s, "treating unparseable amount as 0: {}", e);
        0
    })
}

/// [`coerce_amount`] narrowed to a month count.
pub fn coerce_months(s: &str) -> u32 {
    u32::try_from(coerce_amount(s)).unwrap_or(u32::MAX)
}

fn clamp_amount(value: Decimal) -> u64 {
    if value.is_sign_negative() {
        return 0;
    }
    value.trunc().to_u64().unwrap_or(u64::MAX)
}

/// Reads plain or scientific notation that `Decimal` cannot hold. Float
/// casts saturate, so huge magnitudes land on 0 or `u64::MAX`.
fn out_of_range_amount(normalized: &str) -> Option<u64> {
    let numeric = normalized
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !numeric {
        return None;
    }

    let value = normalized.parse::<f64>().ok()?;
    if value.is_nan() || value <= 0.0 {
        return Some(0);
    }
    Some(value as u64)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_amount_accepts_plain_integers() {
        assert_eq!(parse_amount("900000").unwrap(), 900_000);
        assert_eq!(parse_amount("0").unwrap(), 0);
    }

    #[test]
    fn parse_amount_accepts_comma_thousands_separator() {
        assert_eq!(parse_amount("1,234").unwrap(), 1_234);
        assert_eq!(parse_amount("1,234,567").unwrap(), 1_234_567);
    }

    #[test]
    fn parse_amount_trims_whitespace() {
        assert_eq!(parse_amount("  600000  ").unwrap(), 600_000);
    }

    #[test]
    fn parse_amount_empty_treated_as_zero() {
        assert_eq!(parse_amount("").unwrap(), 0);
        assert_eq!(parse_amount("   ").unwrap(), 0);
    }

    #[test]
    fn parse_amount_clamps_negative_to_zero() {
        assert_eq!(parse_amount("-5").unwrap(), 0);
        assert_eq!(parse_amount("-10000.5").unwrap(), 0);
    }

    #[test]
    fn parse_amount_truncates_fractions() {
        assert_eq!(parse_amount("12.9").unwrap(), 12);
        assert_eq!(parse_amount("0.5").unwrap(), 0);
    }

    #[test]
    fn parse_amount_accepts_scientific_notation() {
        assert_eq!(parse_amount("1e5").unwrap(), 100_000);
    }

    #[test]
    fn parse_amount_saturates_above_u64() {
        assert_eq!(parse_amount("100000000000000000000").unwrap(), u64::MAX);
    }

    #[test]
    fn parse_amount_saturates_past_decimal_range() {
        assert_eq!(parse_amount("99999999999999999999999999999999999").unwrap(), u64::MAX);
        assert_eq!(parse_amount("1e30").unwrap(), u64::MAX);
        assert_eq!(parse_amount("1e400").unwrap(), u64::MAX);
        assert_eq!(parse_amount("-1e30").unwrap(), 0);
        assert_eq!(parse_amount("1e-40").unwrap(), 0);
    }

    #[test]
    fn coerce_amount_never_shrinks_huge_input_to_zero() {
        assert_eq!(coerce_amount("99999999999999999999999999999999999"), u64::MAX);
        assert_eq!(coerce_amount("1e30"), u64::MAX);
    }

    #[test]
    fn parse_amount_invalid_returns_error() {
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("12abc").is_err());
    }

    #[test]
    fn coerce_amount_turns_garbage_into_zero() {
        assert_eq!(coerce_amount("abc"), 0);
        assert_eq!(coerce_amount("-3"), 0);
        assert_eq!(coerce_amount("42"), 42);
    }

    #[test]
    fn coerce_months_saturates_at_u32() {
        assert_eq!(coerce_months("6"), 6);
        assert_eq!(coerce_months("99999999999"), u32::MAX);
    }
}
