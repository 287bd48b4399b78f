//! Reading extracted statement content from disk.
//!
//! PDF decryption and extraction happen upstream; these files hold what the
//! extractor produced:
//!   text   - the statement's text layer, pages separated by form feeds
//!   tables - CSV rows of the extracted tables, a blank line between tables
//!   sheets - Excel/ODS workbooks, or one CSV file per worksheet of a single
//!            workbook

use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use passbook_core::Transaction;
use passbook_ingest::{
    parse_statement_tables, parse_statement_text, parse_workbook, ImportReport, IngestError, Sheet,
    SourceKind, Table, Workbook,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn csv_rows(text: &str, origin: &Path) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.with_context(|| format!("reading CSV rows from {}", origin.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Tables are separated by blank lines outside quoted cells.
pub fn read_tables(path: &Path) -> Result<Vec<Table>> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut tables = Vec::new();
    let mut chunk = String::new();
    let mut in_quotes = false;
    for line in text.lines() {
        if line.trim().is_empty() && !in_quotes {
            if !chunk.is_empty() {
                tables.push(csv_rows(&chunk, path)?);
                chunk.clear();
            }
            continue;
        }
        chunk.push_str(line);
        chunk.push('\n');
        in_quotes ^= line.matches('"').count() % 2 == 1;
    }
    if !chunk.is_empty() {
        tables.push(csv_rows(&chunk, path)?);
    }
    Ok(tables)
}

const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsb", "ods"];

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

/// Excel date serials count days from 1899-12-30.
fn serial_to_text(serial: f64) -> String {
    let stamp = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.and_hms_opt(0, 0, 0))
        .and_then(|epoch| {
            epoch.checked_add_signed(Duration::seconds((serial * 86_400.0).round() as i64))
        });
    match stamp {
        Some(stamp) => stamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => serial.to_string(),
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(n) => n.to_string(),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => serial_to_text(dt.as_f64()),
    }
}

/// Every worksheet of an Excel/ODS file, cells rendered as text.
pub fn read_workbook(path: &Path) -> Result<Workbook> {
    let mut book = open_workbook_auto(path)
        .map_err(|e| anyhow!("open workbook {}: {e}", path.display()))?;

    let mut sheets = Vec::new();
    for name in book.sheet_names().to_vec() {
        let range = book
            .worksheet_range(&name)
            .map_err(|e| anyhow!("read sheet '{name}' of {}: {e}", path.display()))?;
        // ranges start at the first used cell; keep column positions
        let lead = range.start().map_or(0, |(_, col)| col as usize);
        let rows = range
            .rows()
            .map(|row| {
                std::iter::repeat_n(String::new(), lead)
                    .chain(row.iter().map(cell_text))
                    .collect()
            })
            .collect();
        sheets.push(Sheet::new(name, rows));
    }
    Ok(Workbook::new(sheets))
}

pub fn read_sheet(path: &Path) -> Result<Sheet> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Sheet::new(name, csv_rows(&text, path)?))
}

fn no_transactions_hint(origin: &str) {
    eprintln!(
        "No transactions found in {origin}. If the statement PDF is password-protected, \
         check the password used for extraction; otherwise the layout is not supported."
    );
}

fn log_report(origin: &str, report: &ImportReport) {
    for warning in &report.warnings {
        warn!(origin, "{warning}");
    }
    info!(
        origin,
        kind = %report.kind,
        transactions = report.transactions.len(),
        warnings = report.warnings.len(),
        duplicates_removed = report.duplicates_removed,
        "source loaded"
    );
    if report.kind == SourceKind::Sheets {
        info!(
            origin,
            "loaded {} of {} sheet(s)",
            report.sheets_loaded,
            report.sheets_total
        );
    }
}

/// `Ok(None)` when the source yielded nothing; the hint has been printed.
fn accept(origin: &str, result: Result<ImportReport, IngestError>) -> Result<Option<Vec<Transaction>>> {
    match result {
        Ok(report) => {
            log_report(origin, &report);
            Ok(Some(report.transactions))
        }
        Err(IngestError::NoTransactionsFound { origin }) => {
            no_transactions_hint(&origin);
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("ingesting {origin}")),
    }
}

/// Reconstruct every input and merge the records in date order.
pub fn load_transactions(kind: SourceKind, files: &[PathBuf]) -> Result<Vec<Transaction>> {
    let mut all: Vec<Transaction> = Vec::new();

    match kind {
        SourceKind::Text => {
            for path in files {
                let origin = path.display().to_string();
                let text = fs::read_to_string(path).with_context(|| format!("read {origin}"))?;
                all.extend(accept(&origin, parse_statement_text(&text, &origin))?.unwrap_or_default());
            }
        }
        SourceKind::Tables => {
            for path in files {
                let origin = path.display().to_string();
                let tables = read_tables(path)?;
                all.extend(accept(&origin, parse_statement_tables(&tables, &origin))?.unwrap_or_default());
            }
        }
        SourceKind::Sheets => {
            let (books, sheet_files): (Vec<&PathBuf>, Vec<&PathBuf>) =
                files.iter().partition(|p| is_workbook(p));
            for path in books {
                let origin = path.display().to_string();
                let workbook = read_workbook(path)?;
                all.extend(accept(&origin, parse_workbook(&workbook, &origin))?.unwrap_or_default());
            }
            if !sheet_files.is_empty() {
                let sheets = sheet_files
                    .into_iter()
                    .map(PathBuf::as_path)
                    .map(read_sheet)
                    .collect::<Result<Vec<_>>>()?;
                let origin = "workbook";
                all.extend(accept(origin, parse_workbook(&Workbook::new(sheets), origin))?.unwrap_or_default());
            }
        }
    }

    if all.is_empty() {
        bail!("no transactions found in any input");
    }
    all.sort_by_key(|t| t.date);
    Ok(all)
}
