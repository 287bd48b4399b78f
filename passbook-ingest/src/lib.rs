//! passbook-ingest: statement ingestion (PDF text, PDF tables, spreadsheets)
//! into canonical transaction records.

pub mod classify;
pub mod columns;
pub mod error;
pub mod parsers;
pub mod reconstruct;
pub mod render;
pub mod tokens;
pub mod types;

mod tabular;

pub use columns::ColumnMap;
pub use error::{IngestError, LineIssue, SchemaIssue};
pub use parsers::hdfc_tables::{parse_statement_tables, Table};
pub use parsers::hdfc_text::{parse_statement_lines, parse_statement_text};
pub use parsers::spreadsheet::{parse_workbook, Sheet, Workbook};
pub use render::{render_statement, render_statement_line};
pub use types::{ImportReport, SourceKind};
