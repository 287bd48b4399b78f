//! HDFC savings-account statement parser (PDF text layer)
//!
//! Expected extracted text:
//!   Date      Narration                         Chq./Ref.No.      Value Dt  Withdrawal Amt.  Deposit Amt.  Closing Balance
//!   01/04/23  UPI-RAMESH KUMAR-ramesh@okaxis    0000309112345678  01/04/23           300.00                    9,700.00
//!             -FEED BILL
//!
//! Column positions do not survive text extraction, so amounts are read by
//! their order on the line (see [`crate::reconstruct`]).

use tracing::{debug, info};

use crate::error::IngestError;
use crate::reconstruct::{finalize_drafts, Reconstruction, Reconstructor};
use crate::types::{ImportReport, SourceKind};

/// Parse the full extracted text of a statement. Form feeds (page breaks)
/// count as line breaks.
pub fn parse_statement_text(text: &str, origin: &str) -> Result<ImportReport, IngestError> {
    parse_statement_lines(text.split(['\n', '\x0c']), origin)
}

/// Parse statement lines in page order.
pub fn parse_statement_lines<I, S>(lines: I, origin: &str) -> Result<ImportReport, IngestError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut reconstructor = Reconstructor::new()?;
    for line in lines {
        reconstructor.push_line(line.as_ref());
    }

    let Reconstruction {
        drafts,
        mut warnings,
    } = reconstructor.finish();
    debug!(origin, drafts = drafts.len(), "text reconstruction closed");

    let transactions = finalize_drafts(drafts, &mut warnings);
    info!(
        origin,
        transactions = transactions.len(),
        warnings = warnings.len(),
        "parsed statement text"
    );

    let mut report = ImportReport::new(SourceKind::Text);
    report.transactions = transactions;
    report.warnings = warnings;
    report.require_records(origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_statement_text_basic() {
        let text = "\
HDFC BANK Ltd.                                   Page No .: 1
Statement of account
Date Narration Chq./Ref.No. Value Dt Withdrawal Amt. Deposit Amt. Closing Balance
01/04/23 SALARY TRANSFER TO STAFF 50,000.00 1,00,000.00
02/04/23 UPI-ABC-abc@ok 2,500.00 1,02,500.00
\x0cPage No .: 2
03/04/23 UPI-SHYAM-shyam@ybl 400.00 1,02,100.00
";
        let report = parse_statement_text(text, "april.pdf").unwrap();
        assert_eq!(report.kind, SourceKind::Text);
        assert_eq!(report.transactions.len(), 3);
        assert_eq!(report.transactions[0].withdrawal, dec!(50000.00));
        assert_eq!(report.transactions[1].deposit, dec!(2500.00));
        assert_eq!(report.transactions[1].withdrawal, Decimal::ZERO);
        assert_eq!(report.transactions[2].withdrawal, dec!(400.00));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_text_is_no_transactions() {
        let err = parse_statement_text("Statement of account\n\n", "locked.pdf").unwrap_err();
        assert!(matches!(err, IngestError::NoTransactionsFound { ref origin } if origin == "locked.pdf"));
        assert!(!err.is_recoverable());
    }
}
