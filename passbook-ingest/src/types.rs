use std::fmt;
use std::str::FromStr;

use passbook_core::Transaction;
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Shape of the extracted statement content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Plain text lines from a PDF text layer
    Text,
    /// Table rows extracted from a PDF
    Tables,
    /// Sheets of a spreadsheet workbook
    Sheets,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceKind::Text => "text",
            SourceKind::Tables => "tables",
            SourceKind::Sheets => "sheets",
        })
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pdf" => Ok(SourceKind::Text),
            "tables" | "table" => Ok(SourceKind::Tables),
            "sheets" | "xlsx" | "xls" => Ok(SourceKind::Sheets),
            other => Err(format!("unknown source kind '{other}' (expected text, tables or sheets)")),
        }
    }
}

/// Normalized output of one ingested source.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub kind: SourceKind,
    /// Sorted by date; equal dates keep source order
    pub transactions: Vec<Transaction>,
    /// Lines, rows and sheets that were skipped or partially recovered
    pub warnings: Vec<IngestError>,
    pub duplicates_removed: usize,
    pub sheets_total: usize,
    pub sheets_loaded: usize,
}

impl ImportReport {
    pub(crate) fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            transactions: Vec::new(),
            warnings: Vec::new(),
            duplicates_removed: 0,
            sheets_total: 0,
            sheets_loaded: 0,
        }
    }

    /// `Err(NoTransactionsFound)` when nothing survived.
    pub(crate) fn require_records(self, origin: &str) -> Result<Self, IngestError> {
        if self.transactions.is_empty() {
            return Err(IngestError::NoTransactionsFound {
                origin: origin.to_string(),
            });
        }
        Ok(self)
    }
}
