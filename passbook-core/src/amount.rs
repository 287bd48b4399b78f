//! Monetary amounts as printed on Indian bank statements (`1,00,000.00`).

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse an amount cell or token. Grouping commas are ignored; blanks and
/// garbage yield `None`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Parse a spreadsheet amount cell, where blank means zero.
pub fn parse_cell_amount(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_null_like(trimmed) {
        return Ok(Decimal::ZERO);
    }
    parse_amount(trimmed).ok_or_else(|| trimmed.to_string())
}

/// Two decimal places, no grouping.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Cell values spreadsheet readers use for "nothing here".
pub fn is_null_like(raw: &str) -> bool {
    let s = raw.trim();
    s.is_empty()
        || s.eq_ignore_ascii_case("nan")
        || s.eq_ignore_ascii_case("nat")
        || s.eq_ignore_ascii_case("none")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_indian_grouping() {
        assert_eq!(parse_amount("1,00,000.00"), Some(dec!(100000.00)));
        assert_eq!(parse_amount("12,345.67"), Some(dec!(12345.67)));
        assert_eq!(parse_amount(" 100.00 "), Some(dec!(100.00)));
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(","), None);
    }

    #[test]
    fn test_cell_amount_blank_is_zero() {
        assert_eq!(parse_cell_amount("  "), Ok(Decimal::ZERO));
        assert_eq!(parse_cell_amount("NaN"), Ok(Decimal::ZERO));
        assert_eq!(parse_cell_amount("3,070.00"), Ok(dec!(3070.00)));
        assert_eq!(parse_cell_amount("7e2"), Ok(dec!(700)));
        assert_eq!(parse_cell_amount("n/a"), Err("n/a".to_string()));
    }

    #[test]
    fn test_format_two_places() {
        assert_eq!(format_amount(dec!(50000)), "50000.00");
        assert_eq!(format_amount(dec!(12.5)), "12.50");
        assert_eq!(format_amount(dec!(-3.456)), "-3.46");
    }
}
