//! passbook-finance: counterparty and cost-head classification, summary
//! metrics, and statement exporters.

pub mod classifier;
pub mod cost_heads;
pub mod counterparty;
pub mod export;
pub mod summary;

pub use classifier::{ClassifiedTransaction, Classifier};
pub use cost_heads::{CostHead, CostHeadTable, ExpenseFilter, DEFAULT_EXCLUDED_PREFIX, OTHER};
pub use counterparty::{counterparty_id, identify, Counterparty, Rail};
pub use export::{
    export_to_dir, render_ofx, write_csv, write_json, write_ofx, write_xlsx, ExportFormat, OfxOptions,
    XLSX_SHEET,
};
pub use summary::{
    search, summarize, top_expenses, top_incomes, SearchResult, SearchScope, Summary,
    DEFAULT_REPEAT_THRESHOLD,
};
