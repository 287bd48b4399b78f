//! passbook-core: canonical bank-transaction schema shared by the ingest,
//! finance and CLI crates.

pub mod amount;
pub mod date;
pub mod record;

pub use amount::{format_amount, is_null_like, parse_amount, parse_cell_amount};
pub use date::{format_statement_date, parse_cell_date, parse_statement_date, resolve_century};
pub use record::{CanonicalField, Transaction};
