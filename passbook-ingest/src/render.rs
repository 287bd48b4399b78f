//! Render records back into statement text lines, in the layout the text
//! parser reads.
//!
//! The reference column is always printed, zero-filled when the record has
//! none, so the last narration word is never read back as a reference.

use passbook_core::{format_amount, format_statement_date, Transaction};

use crate::reconstruct::NO_REFERENCE;

/// `DD/MM/YY narration ref valueDD/MM/YY deposit withdrawal balance`
pub fn render_statement_line(txn: &Transaction) -> String {
    let mut parts = vec![format_statement_date(txn.date)];
    if !txn.narration.is_empty() {
        parts.push(txn.narration.clone());
    }
    parts.push(txn.reference.clone().unwrap_or_else(|| NO_REFERENCE.to_string()));
    parts.push(format_statement_date(txn.effective_value_date()));
    parts.push(format_amount(txn.deposit));
    parts.push(format_amount(txn.withdrawal));
    parts.push(format_amount(txn.closing_balance));
    parts.join(" ")
}

/// A header line followed by one line per record.
pub fn render_statement(txns: &[Transaction]) -> String {
    let mut out =
        String::from("Date Narration Chq./Ref.No. Value Dt Withdrawal Amt. Deposit Amt. Closing Balance\n");
    for txn in txns {
        out.push_str(&render_statement_line(txn));
        out.push('\n');
    }
    out
}
