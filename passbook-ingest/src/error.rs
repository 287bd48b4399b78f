//! Ingestion failures.
//!
//! `MalformedLine` and `UnresolvableSchema` are recovered where they happen and
//! collected on the [`ImportReport`](crate::ImportReport); only
//! `NoTransactionsFound` (and a broken token pattern) ever reach the caller as
//! an `Err`.

use passbook_core::CanonicalField;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum IngestError {
    #[error("line {line}: {issue}: {text:?}")]
    MalformedLine {
        line: usize,
        issue: LineIssue,
        text: String,
    },

    #[error("sheet {sheet:?} skipped: {issue}")]
    UnresolvableSchema { sheet: String, issue: SchemaIssue },

    #[error("no transactions found in {origin} (wrong password or unsupported layout?)")]
    NoTransactionsFound { origin: String },

    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Why a single line or row could not be used as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LineIssue {
    #[error("leading date is not a calendar date")]
    InvalidDate,
    #[error("amount token does not parse")]
    UnparseableAmount,
    #[error("continuation with no open transaction")]
    OrphanContinuation,
    #[error("transaction carries no amount")]
    NoAmount,
    #[error("unparseable {0} cell")]
    UnparseableCell(CanonicalField),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaIssue {
    #[error("missing mandatory columns {0:?}")]
    MissingColumns(Vec<CanonicalField>),
    #[error("no header row and no earlier sheet to borrow one from")]
    NoHeader,
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },
}

impl IngestError {
    pub(crate) fn malformed(line: usize, issue: LineIssue, text: impl Into<String>) -> Self {
        IngestError::MalformedLine {
            line,
            issue,
            text: text.into(),
        }
    }

    /// Recoverable errors only annotate a report; the rest abort the source.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            IngestError::MalformedLine { .. } | IngestError::UnresolvableSchema { .. }
        )
    }
}
