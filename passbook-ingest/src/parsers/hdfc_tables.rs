//! HDFC statement parser (PDF table extraction)
//!
//! Table extractors split the statement into one table per page, repeat the
//! header at the top of most pages and sometimes emit the same row twice
//! across a page boundary. All tables share one column mapping: the first
//! header row found anywhere, or the fixed seven-column layout when the
//! extractor dropped the header.

use tracing::{debug, info};

use crate::columns::ColumnMap;
use crate::error::IngestError;
use crate::tabular::{finalize_tabular, RowAssembler};
use crate::types::{ImportReport, SourceKind};

/// Rows of one extracted table, cells as text.
pub type Table = Vec<Vec<String>>;

fn find_header(tables: &[Table]) -> Option<ColumnMap> {
    tables
        .iter()
        .flatten()
        .find_map(|row| ColumnMap::resolve(&row[..]).ok())
}

pub fn parse_statement_tables(tables: &[Table], origin: &str) -> Result<ImportReport, IngestError> {
    let map = find_header(tables).unwrap_or_else(|| {
        debug!(origin, "no header row in any table, assuming the statement layout");
        ColumnMap::statement_layout()
    });

    // One assembler across tables so a row wrapped over a page break still
    // merges into the transaction above it.
    let mut assembler = RowAssembler::new(&map);
    for (i, row) in tables.iter().flatten().enumerate() {
        assembler.push_row(i + 1, &row[..]);
    }
    let mut reconstruction = assembler.finish();

    let drafts = std::mem::take(&mut reconstruction.drafts);
    let mut warnings = reconstruction.warnings;
    let (transactions, duplicates_removed) = finalize_tabular(drafts, &mut warnings);
    info!(
        origin,
        tables = tables.len(),
        transactions = transactions.len(),
        duplicates_removed,
        "parsed statement tables"
    );

    let mut report = ImportReport::new(SourceKind::Tables);
    report.transactions = transactions;
    report.warnings = warnings;
    report.duplicates_removed = duplicates_removed;
    report.require_records(origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn table(rows: &[&[&str]]) -> Table {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    const HEADER: &[&str] = &[
        "Date",
        "Narration",
        "Chq./Ref.No.",
        "Value Dt",
        "Withdrawal Amt.",
        "Deposit Amt.",
        "Closing Balance",
    ];

    #[test]
    fn test_tables_with_header_and_page_duplicate() {
        let tables = vec![
            table(&[
                HEADER,
                &["01/04/23", "UPI-RAM-ram@ok", "0000309112345678", "01/04/23", "", "500.00", "1,500.00"],
                &["02/04/23", "RENT APRIL", "", "02/04/23", "1,000.00", "", "500.00"],
            ]),
            table(&[
                HEADER,
                &["02/04/23", "RENT APRIL", "", "02/04/23", "1,000.00", "", "500.00"],
                &["03/04/23", "CASH DEP", "", "03/04/23", "", "200.00", "700.00"],
            ]),
        ];
        let report = parse_statement_tables(&tables, "april.pdf").unwrap();
        assert_eq!(report.kind, SourceKind::Tables);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.transactions.len(), 3);
        assert_eq!(report.transactions[0].reference.as_deref(), Some("0000309112345678"));
        assert_eq!(report.transactions[1].withdrawal, dec!(1000.00));
        assert_eq!(report.transactions[2].closing_balance, dec!(700.00));
    }

    #[test]
    fn test_positional_layout_and_short_rows() {
        let tables = vec![table(&[
            &["01/04/23", "Payment to", "", "", "250.00", "", "750.00"],
            &["", "XYZ corp"],
        ])];
        let report = parse_statement_tables(&tables, "x.pdf").unwrap();
        assert_eq!(report.transactions.len(), 1);
        assert_eq!(report.transactions[0].narration, "Payment toXYZ corp");
    }

    #[test]
    fn test_row_wrapped_over_table_boundary() {
        let tables = vec![
            table(&[HEADER, &["05/04/23", "NEFT CR-SBIN0000583-MRS", "", "", "", "5,000.00", "5,700.00"]]),
            table(&[&["", " RASHMI SAXENA", "", "", "", "", ""]]),
        ];
        let report = parse_statement_tables(&tables, "x.pdf").unwrap();
        assert_eq!(report.transactions[0].narration, "NEFT CR-SBIN0000583-MRSRASHMI SAXENA");
    }

    #[test]
    fn test_no_rows() {
        let err = parse_statement_tables(&[table(&[HEADER])], "empty.pdf").unwrap_err();
        assert!(matches!(err, IngestError::NoTransactionsFound { .. }));
    }
}
