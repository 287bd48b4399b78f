//! Line classification: is this line a header, the start of a new
//! transaction, or the wrapped tail of the previous one?

use chrono::NaiveDate;

use crate::tokens::{LineTokens, TokenExtractor};

const BOILERPLATE: [&str; 3] = ["Statement of account", "Account Branch", "Page No"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Header,
    NewTransaction {
        date: NaiveDate,
        tokens: LineTokens<'a>,
    },
    Continuation {
        tokens: LineTokens<'a>,
        /// Set when the line led with a date-shaped token that is not a real date
        bad_date: Option<&'a str>,
    },
}

impl LineKind<'_> {
    /// A continuation with two or more amounts restates the open
    /// transaction's amounts.
    pub fn supplies_amounts(&self) -> bool {
        match self {
            LineKind::Continuation { tokens, .. } => tokens.usable_amounts().len() >= 2,
            _ => false,
        }
    }
}

/// Column header or page boilerplate repeated on every statement page.
pub fn is_header_line(line: &str) -> bool {
    if line.contains("Date")
        && line.contains("Narration")
        && (line.contains("Withdrawal") || line.contains("Closing"))
    {
        return true;
    }
    BOILERPLATE.iter().any(|marker| line.contains(marker))
}

pub fn classify_line<'a>(extractor: &TokenExtractor, line: &'a str) -> LineKind<'a> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if is_header_line(trimmed) {
        return LineKind::Header;
    }

    let tokens = extractor.extract(trimmed);
    match tokens.date.as_ref().map(|d| (d.raw, d.date)) {
        Some((_, Some(date))) => LineKind::NewTransaction { date, tokens },
        Some((raw, None)) => LineKind::Continuation {
            tokens,
            bad_date: Some(raw),
        },
        None => LineKind::Continuation {
            tokens,
            bad_date: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(line: &str) -> LineKind<'_> {
        let ex = TokenExtractor::new().unwrap();
        classify_line(&ex, line)
    }

    #[test]
    fn test_headers() {
        assert_eq!(
            kind("Date Narration Chq./Ref.No. Value Dt Withdrawal Amt. Deposit Amt. Closing Balance"),
            LineKind::Header
        );
        assert_eq!(kind("Date Narration Closing Balance"), LineKind::Header);
        assert_eq!(kind("Statement of account"), LineKind::Header);
        assert_eq!(kind("HDFC BANK LTD Page No .: 2"), LineKind::Header);
        assert_eq!(kind("Account Branch : SECTOR 14"), LineKind::Header);
    }

    #[test]
    fn test_date_without_withdrawal_or_closing_is_not_header() {
        assert!(!is_header_line("Date Narration"));
    }

    #[test]
    fn test_blank() {
        assert_eq!(kind("   "), LineKind::Blank);
    }

    #[test]
    fn test_new_transaction() {
        match kind("05/04/23 UPI-ABC-abc@ok 100.00 900.00") {
            LineKind::NewTransaction { date, tokens } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2023, 4, 5).unwrap());
                assert_eq!(tokens.amounts.len(), 2);
            }
            other => panic!("expected new transaction, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_date_falls_through_to_continuation() {
        match kind("31/02/23 GARBLED 100.00 900.00") {
            LineKind::Continuation { bad_date, .. } => assert_eq!(bad_date, Some("31/02/23")),
            other => panic!("expected continuation, got {other:?}"),
        }
    }

    #[test]
    fn test_continuation_supplying_amounts() {
        assert!(kind("MILK PAYMENT 0000123 100.00 900.00").supplies_amounts());
        assert!(!kind("MILK PAYMENT 900.00").supplies_amounts());
        assert!(!kind("MILK PAYMENT").supplies_amounts());
    }
}
