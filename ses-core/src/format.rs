//! Display formatting for yen amounts.

/// Groups the digits of `value` in threes with `,` (ja-JP style).
///
/// ```
/// use ses_core::format::group_digits;
///
/// assert_eq!(group_digits(5_400_000), "5,400,000");
/// assert_eq!(group_digits(999), "999");
/// ```
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Formats an amount as `¥1,234,567`.
pub fn format_yen(value: u64) -> String {
    format!("¥{}", group_digits(value))
}
