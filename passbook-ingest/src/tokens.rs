//! Lexical tokens of one statement line: the leading `DD/MM/YY` date and the
//! decimal amounts.
//!
//! ```text
//! 01/04/23  NEFT CR-SBIN0000583-MRS RASHMI  0000312345678901  01/04/23   5,000.00   1,05,000.00
//! ^^^^^^^^ date                                                          ^^^^^^^^   ^^^^^^^^^^^ amounts
//! ```

use chrono::NaiveDate;
use passbook_core::{parse_amount, parse_statement_date};
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::IngestError;

/// Leading date token. `date` is `None` when the digits do not form a real
/// calendar date (e.g. `31/02/23`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateToken<'a> {
    pub raw: &'a str,
    /// Byte offset just past the token and its trailing whitespace
    pub end: usize,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountToken<'a> {
    pub raw: &'a str,
    pub start: usize,
    pub end: usize,
    pub value: Option<Decimal>,
}

/// Tokens found on one (trimmed) line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTokens<'a> {
    pub line: &'a str,
    pub date: Option<DateToken<'a>>,
    pub amounts: Vec<AmountToken<'a>>,
}

impl<'a> LineTokens<'a> {
    /// Text after the leading date token. The whole line when there is no
    /// date token or when it is not a calendar date.
    pub fn body(&self) -> &'a str {
        match &self.date {
            Some(d) if d.date.is_some() => &self.line[d.end..],
            _ => self.line,
        }
    }

    /// Amount tokens that parsed to a number, left to right.
    pub fn usable_amounts(&self) -> Vec<&AmountToken<'a>> {
        self.amounts.iter().filter(|a| a.value.is_some()).collect()
    }
}

/// Compiled date/amount patterns. Build once per source and reuse.
#[derive(Debug, Clone)]
pub struct TokenExtractor {
    date_re: Regex,
    amount_re: Regex,
}

impl TokenExtractor {
    pub fn new() -> Result<Self, IngestError> {
        Ok(Self {
            date_re: Regex::new(r"^(?P<date>\d{2}/\d{2}/\d{2})\s+")?,
            amount_re: Regex::new(r"\d[\d,]*\.\d{2}")?,
        })
    }

    /// Tokenize one line. Surrounding whitespace is ignored.
    pub fn extract<'a>(&self, line: &'a str) -> LineTokens<'a> {
        let line = line.trim();

        let date = self.date_re.captures(line).and_then(|caps| {
            let whole = caps.get(0)?;
            let raw = caps.name("date")?.as_str();
            Some(DateToken {
                raw,
                end: whole.end(),
                date: parse_statement_date(raw),
            })
        });

        let amounts = self
            .amount_re
            .find_iter(line)
            .map(|m| AmountToken {
                raw: m.as_str(),
                start: m.start(),
                end: m.end(),
                value: parse_amount(m.as_str()),
            })
            .collect();

        LineTokens {
            line,
            date,
            amounts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_date_and_amounts() {
        let ex = TokenExtractor::new().unwrap();
        let t = ex.extract("  01/04/23 SALARY TRANSFER TO STAFF 50,000.00 1,00,000.00  ");
        let date = t.date.as_ref().unwrap();
        assert_eq!(date.raw, "01/04/23");
        assert_eq!(date.date, NaiveDate::from_ymd_opt(2023, 4, 1));
        assert_eq!(t.body(), "SALARY TRANSFER TO STAFF 50,000.00 1,00,000.00");

        let values: Vec<_> = t.amounts.iter().map(|a| a.value.unwrap()).collect();
        assert_eq!(values, vec![dec!(50000.00), dec!(100000.00)]);
    }

    #[test]
    fn test_date_must_lead_and_be_followed_by_space() {
        let ex = TokenExtractor::new().unwrap();
        assert!(ex.extract("Opening 01/04/23 balance").date.is_none());
        assert!(ex.extract("01/04/23").date.is_none());
        assert!(ex.extract("01/04/2023 X").date.is_none());
    }

    #[test]
    fn test_impossible_date_is_lexed_but_unparsed() {
        let ex = TokenExtractor::new().unwrap();
        let t = ex.extract("31/02/23 TYPO 10.00 20.00");
        let date = t.date.as_ref().unwrap();
        assert_eq!(date.raw, "31/02/23");
        assert!(date.date.is_none());
        assert_eq!(t.body(), "31/02/23 TYPO 10.00 20.00");
    }

    #[test]
    fn test_amount_needs_two_decimals() {
        let ex = TokenExtractor::new().unwrap();
        let t = ex.extract("REF 12345 AMT 12.5 OK 7.25");
        let raws: Vec<_> = t.amounts.iter().map(|a| a.raw).collect();
        assert_eq!(raws, vec!["7.25"]);
    }

    #[test]
    fn test_no_tokens() {
        let ex = TokenExtractor::new().unwrap();
        let t = ex.extract("UPI-JOHN DOE-johndoe@bank");
        assert!(t.date.is_none());
        assert!(t.amounts.is_empty());
        assert_eq!(t.body(), "UPI-JOHN DOE-johndoe@bank");
    }
}
