//! Spreadsheet statement parser (one workbook, many sheets)
//!
//! The first usable sheet must open with a header row. Later sheets may
//! carry their own header; if they don't, they borrow the first sheet's
//! mapping provided they have the same number of columns.

use tracing::{debug, info, warn};

use crate::columns::ColumnMap;
use crate::error::{IngestError, SchemaIssue};
use crate::reconstruct::Draft;
use crate::tabular::{assemble_rows, finalize_tabular};
use crate::types::{ImportReport, SourceKind};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_blank(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .all(|cell| cell.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }
}

/// Mapping established by the first usable sheet.
struct FirstHeader {
    map: ColumnMap,
    width: usize,
}

/// Pick the mapping and data rows for one sheet, or say why it can't be read.
fn sheet_layout<'s>(
    sheet: &'s Sheet,
    first: Option<&FirstHeader>,
) -> Result<(ColumnMap, &'s [Vec<String>]), SchemaIssue> {
    let Some(header) = sheet.rows.first() else {
        return Err(SchemaIssue::NoHeader);
    };

    match (ColumnMap::resolve(&header[..]), first) {
        (Ok(map), _) => Ok((map, &sheet.rows[1..])),
        (Err(issue), None) => Err(issue),
        (Err(_), Some(first)) => {
            let found = sheet.width();
            if found != first.width {
                return Err(SchemaIssue::ColumnCount {
                    expected: first.width,
                    found,
                });
            }
            Ok((first.map.clone(), &sheet.rows[..]))
        }
    }
}

pub fn parse_workbook(workbook: &Workbook, origin: &str) -> Result<ImportReport, IngestError> {
    let mut report = ImportReport::new(SourceKind::Sheets);
    report.sheets_total = workbook.sheets.len();

    let mut first: Option<FirstHeader> = None;
    let mut drafts: Vec<Draft> = Vec::new();

    for sheet in &workbook.sheets {
        if sheet.is_blank() {
            debug!(origin, sheet = %sheet.name, "skipping empty sheet");
            continue;
        }

        let (map, rows) = match sheet_layout(sheet, first.as_ref()) {
            Ok(layout) => layout,
            Err(issue) => {
                warn!(origin, sheet = %sheet.name, %issue, "skipping sheet");
                report.warnings.push(IngestError::UnresolvableSchema {
                    sheet: sheet.name.clone(),
                    issue,
                });
                continue;
            }
        };
        if first.is_none() {
            first = Some(FirstHeader {
                map: map.clone(),
                width: sheet.width(),
            });
        }

        let reconstruction = assemble_rows(&map, rows);
        debug!(
            origin,
            sheet = %sheet.name,
            rows = reconstruction.drafts.len(),
            "sheet assembled"
        );
        if !reconstruction.drafts.is_empty() {
            report.sheets_loaded += 1;
        }
        drafts.extend(reconstruction.drafts);
        report.warnings.extend(reconstruction.warnings);
    }

    let (transactions, duplicates_removed) = finalize_tabular(drafts, &mut report.warnings);
    info!(
        origin,
        sheets_total = report.sheets_total,
        sheets_loaded = report.sheets_loaded,
        transactions = transactions.len(),
        "parsed workbook"
    );

    report.transactions = transactions;
    report.duplicates_removed = duplicates_removed;
    report.require_records(origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sheet(name: &str, rows: &[&[&str]]) -> Sheet {
        Sheet::new(
            name,
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
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
    fn test_second_sheet_borrows_header() {
        let wb = Workbook::new(vec![
            sheet(
                "Sheet1",
                &[HEADER, &["05/04/2023", "UPI-B-b@ok", "", "", "", "20.00", "120.00"]],
            ),
            sheet("Sheet2", &[&["2023-04-01", "UPI-A-a@ok", "", "", "", "100.00", "100.00"]]),
        ]);
        let report = parse_workbook(&wb, "book.xlsx").unwrap();
        assert_eq!(report.sheets_total, 2);
        assert_eq!(report.sheets_loaded, 2);
        assert_eq!(report.transactions.len(), 2);
        // merged across sheets and sorted
        assert_eq!(report.transactions[0].date, NaiveDate::from_ymd_opt(2023, 4, 1).unwrap());
        assert_eq!(report.transactions[1].deposit, dec!(20.00));
    }

    #[test]
    fn test_mismatched_width_skips_sheet() {
        let wb = Workbook::new(vec![
            sheet("Sheet1", &[HEADER, &["01/04/23", "A", "", "", "", "1.00", "1.00"]]),
            sheet("Notes", &[&["generated on", "01/05/23"]]),
        ]);
        let report = parse_workbook(&wb, "book.xlsx").unwrap();
        assert_eq!(report.sheets_loaded, 1);
        assert!(report.warnings.iter().any(|w| matches!(
            w,
            IngestError::UnresolvableSchema { sheet, issue: SchemaIssue::ColumnCount { expected: 7, found: 2 } }
                if sheet == "Notes"
        )));
    }

    #[test]
    fn test_first_sheet_without_header() {
        let wb = Workbook::new(vec![sheet(
            "Sheet1",
            &[&["01/04/23", "A", "", "", "", "1.00", "1.00"]],
        )]);
        let err = parse_workbook(&wb, "book.xlsx").unwrap_err();
        assert!(matches!(err, IngestError::NoTransactionsFound { .. }));
    }

    #[test]
    fn test_own_header_with_other_column_order() {
        let wb = Workbook::new(vec![
            sheet("Sheet1", &[HEADER, &["01/04/23", "A", "", "", "", "1.00", "1.00"]]),
            sheet(
                "Sheet2",
                &[
                    &["Closing Balance", "Deposit Amt.", "Withdrawal Amt.", "Narration", "Date"],
                    &["3.00", "2.00", "", "B", "02/04/23"],
                ],
            ),
        ]);
        let report = parse_workbook(&wb, "book.xlsx").unwrap();
        assert_eq!(report.transactions.len(), 2);
        assert_eq!(report.transactions[1].narration, "B");
        assert_eq!(report.transactions[1].closing_balance, dec!(3.00));
    }

    #[test]
    fn test_blank_sheets_are_not_loaded() {
        let wb = Workbook::new(vec![
            sheet("Empty", &[]),
            sheet("Sheet1", &[HEADER, &["01/04/23", "A", "", "", "", "1.00", "1.00"]]),
        ]);
        let report = parse_workbook(&wb, "book.xlsx").unwrap();
        assert_eq!(report.sheets_total, 2);
        assert_eq!(report.sheets_loaded, 1);
    }
}
