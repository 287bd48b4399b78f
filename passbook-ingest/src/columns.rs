//! Header normalization for tabular sources.
//!
//! Bank exports rename their columns freely ("Withdrawal Amt.", "Withdrawn
//! Amt", "Debit"). Headings are compared with case and whitespace removed,
//! by equality first and then by containment in either direction.

use std::collections::BTreeMap;

use passbook_core::CanonicalField;

use crate::error::SchemaIssue;

/// Alias lists in resolution order. `Reference` and `ValueDate` resolve before
/// `Date` so "Value Dt" is never taken as the transaction date.
const ALIASES: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::Reference,
        &["Chq./Ref.No.", "Chq./Ref.No", "Chq/Ref.No.", "Ref No"],
    ),
    (
        CanonicalField::ValueDate,
        &["Value Dt", "Value Dt.", "Value Date"],
    ),
    (CanonicalField::Date, &["Date"]),
    (
        CanonicalField::Narration,
        &["Narration", "Description", "Particulars"],
    ),
    (
        CanonicalField::Withdrawal,
        &[
            "Withdrawal Amt.",
            "Withdrawal Amt",
            "Withdrawn Amt.",
            "Withdrawn Amt",
            "Withdrawal",
            "Debit",
        ],
    ),
    (
        CanonicalField::Deposit,
        &["Deposit Amt.", "Deposit Amt", "Deposit", "Credit"],
    ),
    (
        CanonicalField::Balance,
        &["Closing Balance", "Closing Bal", "Balance"],
    ),
];

fn normalize_heading(heading: &str) -> String {
    heading
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical field → column index for one header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: BTreeMap<CanonicalField, usize>,
    width: usize,
}

impl ColumnMap {
    /// Resolve a header row. Fails when date, withdrawal or deposit cannot be
    /// found.
    pub fn resolve<S: AsRef<str>>(header: &[S]) -> Result<Self, SchemaIssue> {
        let normalized: Vec<String> = header.iter().map(|h| normalize_heading(h.as_ref())).collect();
        let mut claimed = vec![false; normalized.len()];
        let mut indices = BTreeMap::new();

        for (field, aliases) in ALIASES {
            let keys: Vec<String> = aliases.iter().map(|a| normalize_heading(a)).collect();
            let open = |i: usize| !claimed[i] && !normalized[i].is_empty();

            let exact = keys
                .iter()
                .find_map(|k| (0..normalized.len()).find(|&i| open(i) && normalized[i] == *k));
            let found = exact.or_else(|| {
                keys.iter().find_map(|k| {
                    (0..normalized.len()).find(|&i| {
                        open(i) && (normalized[i].contains(k.as_str()) || k.contains(normalized[i].as_str()))
                    })
                })
            });

            if let Some(i) = found {
                claimed[i] = true;
                indices.insert(*field, i);
            }
        }

        let missing: Vec<CanonicalField> = CanonicalField::ALL
            .into_iter()
            .filter(|f| f.is_mandatory() && !indices.contains_key(f))
            .collect();
        if !missing.is_empty() {
            return Err(SchemaIssue::MissingColumns(missing));
        }

        Ok(Self {
            indices,
            width: header.len(),
        })
    }

    /// The fixed seven-column statement layout:
    /// Date | Narration | Chq./Ref.No. | Value Dt | Withdrawal | Deposit | Closing Balance
    pub fn statement_layout() -> Self {
        let indices = CanonicalField::ALL
            .into_iter()
            .enumerate()
            .map(|(i, f)| (f, i))
            .collect();
        Self { indices, width: 7 }
    }

    pub fn index(&self, field: CanonicalField) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    /// Number of columns in the header this map was built from.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Trimmed cell for `field`; empty when the column is unmapped or the row
    /// is short.
    pub fn cell<'r, S: AsRef<str>>(&self, row: &'r [S], field: CanonicalField) -> &'r str {
        self.index(field)
            .and_then(|i| row.get(i))
            .map(|c| c.as_ref().trim())
            .unwrap_or("")
    }
}
