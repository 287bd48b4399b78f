//! Statement exporters: CSV and XLSX in the bank's own column layout, JSON,
//! and an OFX 2.0 (SGML-style) bank statement for accounting tools.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use passbook_core::{format_amount, CanonicalField, Transaction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Longest `NAME` most OFX consumers accept.
const OFX_NAME_MAX: usize = 255;

/// Worksheet written by [`write_xlsx`].
pub const XLSX_SHEET: &str = "Statement";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
    Ofx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Csv,
        ExportFormat::Xlsx,
        ExportFormat::Json,
        ExportFormat::Ofx,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Json => "json",
            ExportFormat::Ofx => "ofx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "json" => Ok(ExportFormat::Json),
            "ofx" => Ok(ExportFormat::Ofx),
            other => Err(format!(
                "unknown export format '{other}' (expected csv, xlsx, json or ofx)"
            )),
        }
    }
}

/// Account details stamped into the OFX header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfxOptions {
    pub bank_id: String,
    pub account_id: String,
    pub currency: String,
    pub generated_at: NaiveDateTime,
}

fn two_dp(amount: Decimal) -> Decimal {
    let mut amount = amount.round_dp(2);
    amount.rescale(2);
    amount
}

fn long_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn write_csv<W: Write>(txns: &[Transaction], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(CanonicalField::ALL.iter().map(|f| f.heading()))?;
    for t in txns {
        wtr.write_record([
            long_date(t.date),
            t.narration.clone(),
            t.reference.clone().unwrap_or_default(),
            long_date(t.effective_value_date()),
            format_amount(t.withdrawal),
            format_amount(t.deposit),
            format_amount(t.closing_balance),
        ])?;
    }
    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

fn xlsx_amount(amount: Decimal) -> f64 {
    amount.round_dp(2).to_f64().unwrap_or_default()
}

/// One worksheet in the CSV column layout. Dates stay `DD/MM/YYYY` text;
/// amounts are numeric cells shown with two decimals.
pub fn write_xlsx<W: Write>(txns: &[Transaction], mut out: W) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet().set_name(XLSX_SHEET)?;
    for (col, field) in CanonicalField::ALL.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, field.heading(), &header)?;
    }
    for (idx, t) in txns.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, long_date(t.date))?;
        sheet.write_string(row, 1, t.narration.as_str())?;
        sheet.write_string(row, 2, t.reference.as_deref().unwrap_or_default())?;
        sheet.write_string(row, 3, long_date(t.effective_value_date()))?;
        sheet.write_number_with_format(row, 4, xlsx_amount(t.withdrawal), &money)?;
        sheet.write_number_with_format(row, 5, xlsx_amount(t.deposit), &money)?;
        sheet.write_number_with_format(row, 6, xlsx_amount(t.closing_balance), &money)?;
    }
    sheet.set_column_width(1, 60.0)?;

    let bytes = workbook.save_to_buffer().context("building XLSX workbook")?;
    out.write_all(&bytes).context("writing XLSX output")?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct JsonRecord<'a> {
    date: NaiveDate,
    narration: &'a str,
    reference: Option<&'a str>,
    value_date: NaiveDate,
    withdrawal: Decimal,
    deposit: Decimal,
    closing_balance: Decimal,
}

pub fn write_json<W: Write>(txns: &[Transaction], out: W) -> Result<()> {
    let rows: Vec<JsonRecord<'_>> = txns
        .iter()
        .map(|t| JsonRecord {
            date: t.date,
            narration: &t.narration,
            reference: t.reference.as_deref(),
            value_date: t.effective_value_date(),
            withdrawal: two_dp(t.withdrawal),
            deposit: two_dp(t.deposit),
            closing_balance: two_dp(t.closing_balance),
        })
        .collect();
    serde_json::to_writer_pretty(out, &rows).context("writing JSON output")?;
    Ok(())
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn render_ofx(txns: &[Transaction], opts: &OfxOptions) -> String {
    let account_id = if opts.account_id.trim().is_empty() {
        "Account"
    } else {
        opts.account_id.trim()
    };

    let mut lines: Vec<String> = [
        "OFXHEADER:100",
        "DATA:OFXSGML",
        "VERSION:200",
        "SECURITY:NONE",
        "ENCODING:UTF-8",
        "CHARSET:ISO-8859-1",
        "COMPRESSION:NONE",
        "OLDFILEUID:NONE",
        "NEWFILEUID:NONE",
        "",
        "<OFX>",
        "  <SIGNONMSGSRSV1>",
        "    <SONRS>",
        "      <STATUS><CODE>0</CODE><SEVERITY>INFO</SEVERITY></STATUS>",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    lines.push(format!(
        "      <DTSERVER>{}</DTSERVER>",
        opts.generated_at.format("%Y%m%d%H%M%S")
    ));
    lines.extend(
        [
            "      <LANGUAGE>ENG</LANGUAGE>",
            "    </SONRS>",
            "  </SIGNONMSGSRSV1>",
            "  <BANKMSGSRSV1>",
            "    <STMTTRNRS>",
            "      <TRNUID>1</TRNUID>",
            "      <STATUS><CODE>0</CODE><SEVERITY>INFO</SEVERITY></STATUS>",
            "      <STMTRS>",
        ]
        .map(String::from),
    );
    lines.push(format!("        <CURDEF>{}</CURDEF>", opts.currency));
    lines.push("        <BANKACCTFROM>".to_string());
    lines.push(format!("          <BANKID>{}</BANKID>", opts.bank_id));
    lines.push(format!("          <ACCTID>{account_id}</ACCTID>"));
    lines.push("          <ACCTTYPE>CHECKING</ACCTTYPE>".to_string());
    lines.push("        </BANKACCTFROM>".to_string());
    lines.push("        <BANKTRANLIST>".to_string());

    for (idx, t) in txns.iter().enumerate() {
        let (kind, amount) = if t.is_debit() {
            ("DEBIT", -t.withdrawal)
        } else {
            ("CREDIT", t.deposit)
        };
        if amount.is_zero() {
            continue;
        }
        let posted = t.date.format("%Y%m%d").to_string();
        let name: String = t.narration.chars().take(OFX_NAME_MAX).collect();

        lines.push("          <STMTTRN>".to_string());
        lines.push(format!("            <TRNTYPE>{kind}</TRNTYPE>"));
        lines.push(format!("            <DTPOSTED>{posted}</DTPOSTED>"));
        lines.push(format!("            <TRNAMT>{}</TRNAMT>", format_amount(amount)));
        lines.push(format!("            <FITID>{posted}{idx:06}</FITID>"));
        lines.push(format!("            <NAME>{}</NAME>", xml_escape(&name)));
        lines.push("          </STMTTRN>".to_string());
    }

    lines.extend(
        [
            "        </BANKTRANLIST>",
            "      </STMTRS>",
            "    </STMTTRNRS>",
            "  </BANKMSGSRSV1>",
            "</OFX>",
        ]
        .map(String::from),
    );
    lines.join("\n")
}

pub fn write_ofx<W: Write>(txns: &[Transaction], opts: &OfxOptions, mut out: W) -> Result<()> {
    out.write_all(render_ofx(txns, opts).as_bytes())
        .context("writing OFX output")?;
    Ok(())
}

/// Write `<dir>/<base_name>.<ext>` for each format. Returns the paths written.
pub fn export_to_dir(
    txns: &[Transaction],
    dir: &Path,
    base_name: &str,
    formats: &[ExportFormat],
    ofx: &OfxOptions,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let path = dir.join(format!("{base_name}.{}", format.extension()));
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let out = BufWriter::new(file);
        let result = match format {
            ExportFormat::Csv => write_csv(txns, out),
            ExportFormat::Xlsx => write_xlsx(txns, out),
            ExportFormat::Json => write_json(txns, out),
            ExportFormat::Ofx => write_ofx(txns, ofx, out),
        };
        result.with_context(|| format!("exporting {}", path.display()))?;
        info!(path = %path.display(), records = txns.len(), "exported");
        written.push(path);
    }
    Ok(written)
}
