//! Statement date handling.
//!
//! Statements print `DD/MM/YY`. chrono maps `%y` values 69..=99 into the
//! 1900s; statement years are always 20xx, so those are pushed forward a
//! century.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Move a date before 2000 into the 2000s.
pub fn resolve_century(date: NaiveDate) -> Option<NaiveDate> {
    if date.year() < 2000 {
        date.with_year(date.year() + 100)
    } else {
        Some(date)
    }
}

/// Parse a strict `DD/MM/YY` token.
pub fn parse_statement_date(token: &str) -> Option<NaiveDate> {
    let token = token.trim();
    if token.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(token, "%d/%m/%y")
        .ok()
        .and_then(resolve_century)
}

/// Parse a date cell from a table or spreadsheet export.
///
/// Accepts `DD/MM/YY`, `DD-MM-YY`, `DD/MM/YYYY`, ISO dates and the
/// `YYYY-MM-DD HH:MM:SS` strings spreadsheet readers emit for date cells.
pub fn parse_cell_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in ["%d/%m/%y", "%d-%m-%y"] {
        if s.len() == 8 {
            if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                return resolve_century(d);
            }
        }
    }

    for fmt in ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// `DD/MM/YY`, the statement's own short form.
pub fn format_statement_date(date: NaiveDate) -> String {
    date.format("%d/%m/%y").to_string()
}
