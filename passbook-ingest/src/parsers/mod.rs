pub mod hdfc_tables;
pub mod hdfc_text;
pub mod spreadsheet;
