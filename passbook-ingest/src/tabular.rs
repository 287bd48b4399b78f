//! Row assembly for tabular sources (PDF tables and spreadsheet sheets).
//!
//! A row with an empty date cell belongs to the row above it: its narration
//! is glued on with no separator. Cells are only typed once a transaction is
//! complete, since typing an empty date would throw the row away.

use passbook_core::{
    is_null_like, parse_cell_amount, parse_cell_date, CanonicalField, Transaction,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::columns::ColumnMap;
use crate::error::{IngestError, LineIssue};
use crate::reconstruct::{collapse_whitespace, AmountLayout, Draft, Reconstruction};

#[derive(Debug, Clone, Default)]
struct OpenRow {
    line: usize,
    date: String,
    narration: String,
    reference: String,
    value_date: String,
    withdrawal: String,
    deposit: String,
    balance: String,
}

pub(crate) struct RowAssembler<'m> {
    map: &'m ColumnMap,
    open: Option<OpenRow>,
    drafts: Vec<Draft>,
    warnings: Vec<IngestError>,
}

impl<'m> RowAssembler<'m> {
    pub(crate) fn new(map: &'m ColumnMap) -> Self {
        Self {
            map,
            open: None,
            drafts: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn push_row<S: AsRef<str>>(&mut self, line: usize, row: &[S]) {
        if row.iter().all(|c| c.as_ref().trim().is_empty()) {
            return;
        }
        // Page breaks repeat the column header inside the table body.
        if ColumnMap::resolve(row).is_ok() {
            debug!(line, "skipping repeated header row");
            return;
        }

        let date = self.map.cell(row, CanonicalField::Date);
        let narration = self.map.cell(row, CanonicalField::Narration);

        if is_null_like(date) {
            match self.open.as_mut() {
                Some(open) => {
                    if !is_null_like(narration) {
                        open.narration.push_str(narration);
                    }
                }
                None => {
                    debug!(line, "continuation row with nothing to continue");
                    self.warnings.push(IngestError::malformed(
                        line,
                        LineIssue::OrphanContinuation,
                        narration,
                    ));
                }
            }
            return;
        }

        self.close();
        let map = self.map;
        let cell = |field| map.cell(row, field).to_string();
        self.open = Some(OpenRow {
            line,
            date: date.to_string(),
            narration: if is_null_like(narration) {
                String::new()
            } else {
                narration.to_string()
            },
            reference: cell(CanonicalField::Reference),
            value_date: cell(CanonicalField::ValueDate),
            withdrawal: cell(CanonicalField::Withdrawal),
            deposit: cell(CanonicalField::Deposit),
            balance: cell(CanonicalField::Balance),
        });
    }

    fn close(&mut self) {
        let Some(row) = self.open.take() else {
            return;
        };

        let Some(date) = parse_cell_date(&row.date) else {
            debug!(line = row.line, date = %row.date, "unparseable date cell");
            self.warnings.push(IngestError::malformed(
                row.line,
                LineIssue::UnparseableCell(CanonicalField::Date),
                row.date,
            ));
            return;
        };

        let withdrawal = self.amount(row.line, CanonicalField::Withdrawal, &row.withdrawal);
        let deposit = self.amount(row.line, CanonicalField::Deposit, &row.deposit);
        let balance = self.amount(row.line, CanonicalField::Balance, &row.balance);

        let reference = Some(row.reference.trim())
            .filter(|r| !is_null_like(r))
            .map(str::to_string);

        self.drafts.push(Draft {
            line: row.line,
            date,
            narration: collapse_whitespace(&row.narration),
            reference,
            value_date: parse_cell_date(&row.value_date),
            amounts: AmountLayout::Columns {
                withdrawal,
                deposit,
                balance,
            },
        });
    }

    fn amount(&mut self, line: usize, field: CanonicalField, raw: &str) -> Decimal {
        match parse_cell_amount(raw) {
            Ok(value) => value,
            Err(text) => {
                debug!(line, %field, "unparseable amount cell");
                self.warnings
                    .push(IngestError::malformed(line, LineIssue::UnparseableCell(field), text));
                Decimal::ZERO
            }
        }
    }

    pub(crate) fn finish(mut self) -> Reconstruction {
        self.close();
        Reconstruction {
            drafts: self.drafts,
            warnings: self.warnings,
        }
    }
}

/// Merge, type, dedupe, sort.
pub(crate) fn assemble_rows<S: AsRef<str>>(map: &ColumnMap, rows: &[Vec<S>]) -> Reconstruction {
    let mut assembler = RowAssembler::new(map);
    for (i, row) in rows.iter().enumerate() {
        assembler.push_row(i + 1, &row[..]);
    }
    assembler.finish()
}

/// Records for a set of drafts coming from a tabular source.
pub(crate) fn finalize_tabular(
    drafts: Vec<Draft>,
    warnings: &mut Vec<IngestError>,
) -> (Vec<Transaction>, usize) {
    let (drafts, removed) = crate::reconstruct::dedupe_drafts(drafts);
    (crate::reconstruct::finalize_drafts(drafts, warnings), removed)
}
