//! Keyword cost heads for outgoing payments.
//!
//! The table is ordered: the first head with any keyword inside the
//! lowercased narration wins, so a narration mentioning both a salary and
//! the rent goes to whichever head is listed first. Matching is plain
//! substring, so "fee" also matches "coffee".

use passbook_core::Transaction;
use serde::{Deserialize, Serialize};

/// Label for withdrawals no head claims.
pub const OTHER: &str = "Other";

/// Narration prefix of transfers to the owner's own account.
pub const DEFAULT_EXCLUDED_PREFIX: &str = "NEFT DR-CNRB0002374";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostHead {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CostHead {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Any keyword (lowercased) occurs in `lowered`.
    fn matches(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| !kw.is_empty() && lowered.contains(&kw.to_lowercase()))
    }
}

/// Ordered cost-head table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostHeadTable {
    heads: Vec<CostHead>,
}

impl CostHeadTable {
    pub fn new(heads: Vec<CostHead>) -> Self {
        Self { heads }
    }

    pub fn heads(&self) -> &[CostHead] {
        &self.heads
    }

    /// Head names in table order, followed by [`OTHER`].
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.heads
            .iter()
            .map(|h| h.name.as_str())
            .chain(std::iter::once(OTHER))
    }

    /// First head whose keywords occur in the narration, else [`OTHER`].
    pub fn assign(&self, narration: &str) -> &str {
        let lowered = narration.to_lowercase();
        self.heads
            .iter()
            .find(|h| h.matches(&lowered))
            .map(|h| h.name.as_str())
            .unwrap_or(OTHER)
    }
}

impl Default for CostHeadTable {
    fn default() -> Self {
        Self::new(vec![
            CostHead::new(
                "Salary",
                &[
                    "salary", "advanc", "salar", "bisheshar", "radheshyam", "shiv ram", "sanjay",
                    "harsh", "pyare", "somwati", "surinder", "sikander", "amit", "bimal", "mayank",
                    "sheetla", "prahlad", "CNRB0000103",
                ],
            ),
            CostHead::new(
                "Feed",
                &[
                    "feed", "tudi", "ganna", "rakesh", "seed", "atta", "mineral", "chokar",
                    "HARDEEPSINGH",
                ],
            ),
            CostHead::new("Rent", &["rent"]),
            CostHead::new(
                "Fuel and Transportation",
                &[
                    "gas", "refill", "petrol", "cylinder", "auto", "service", "transport",
                    "filling", "fuel", "bike",
                ],
            ),
            CostHead::new("Expansion (cow, fridge)", &["cow", "refrig", "crockery"]),
            CostHead::new("Marketing", &["print", "adver"]),
            CostHead::new("Loan, CC", &["loan", "credit"]),
            CostHead::new(
                "Miscellaneous",
                &[
                    "ration", "fee", "medical", "ghee", "fees", "netflix", "amazon", "blinkit",
                    "swiggy", "airtel", "jio", "vikram", "ROOPBASANT",
                ],
            ),
        ])
    }
}

/// Decides which withdrawals are real expenses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseFilter {
    excluded_prefixes: Vec<String>,
}

impl ExpenseFilter {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded_prefixes: prefixes
                .into_iter()
                .map(|p| p.as_ref().trim().to_uppercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Narration starts with one of the excluded prefixes (case-insensitive).
    pub fn is_internal_transfer(&self, narration: &str) -> bool {
        let n = narration.trim().to_uppercase();
        self.excluded_prefixes.iter().any(|p| n.starts_with(p.as_str()))
    }

    pub fn is_expense(&self, txn: &Transaction) -> bool {
        txn.is_debit() && !self.is_internal_transfer(&txn.narration)
    }
}

impl Default for ExpenseFilter {
    fn default() -> Self {
        Self::new([DEFAULT_EXCLUDED_PREFIX])
    }
}
