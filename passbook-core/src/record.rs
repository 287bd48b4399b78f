//! Canonical transaction record produced by every statement source

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One reconstructed bank transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction date (two-digit years already resolved to 20xx)
    pub date: NaiveDate,
    /// Free-text description, whitespace-collapsed for text sources
    pub narration: String,
    /// Cheque / reference number, passed through untouched
    pub reference: Option<String>,
    /// Value date as stated by the source
    pub value_date: Option<NaiveDate>,
    /// Debit amount, zero when this is not a debit
    pub withdrawal: Decimal,
    /// Credit amount, zero when this is not a credit
    pub deposit: Decimal,
    /// Running balance as printed on the statement
    pub closing_balance: Decimal,
}

impl Transaction {
    /// Create a record with no reference and the value date equal to `date`.
    pub fn new(
        date: NaiveDate,
        narration: impl Into<String>,
        withdrawal: Decimal,
        deposit: Decimal,
        closing_balance: Decimal,
    ) -> Self {
        Self {
            date,
            narration: narration.into(),
            reference: None,
            value_date: Some(date),
            withdrawal,
            deposit,
            closing_balance,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_value_date(mut self, value_date: Option<NaiveDate>) -> Self {
        self.value_date = value_date;
        self
    }

    /// Returns true if money left the account
    pub fn is_debit(&self) -> bool {
        self.withdrawal > Decimal::ZERO
    }

    /// Returns true if money entered the account
    pub fn is_credit(&self) -> bool {
        self.deposit > Decimal::ZERO
    }

    /// Records with neither a debit nor a credit carry no transaction amount.
    pub fn has_amount(&self) -> bool {
        !self.withdrawal.is_zero() || !self.deposit.is_zero()
    }

    /// Deposit minus withdrawal.
    pub fn net_amount(&self) -> Decimal {
        self.deposit - self.withdrawal
    }

    /// Value date, falling back to the transaction date.
    pub fn effective_value_date(&self) -> NaiveDate {
        self.value_date.unwrap_or(self.date)
    }
}

/// Fields of the canonical schema, in statement column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Date,
    Narration,
    Reference,
    ValueDate,
    Withdrawal,
    Deposit,
    Balance,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 7] = [
        CanonicalField::Date,
        CanonicalField::Narration,
        CanonicalField::Reference,
        CanonicalField::ValueDate,
        CanonicalField::Withdrawal,
        CanonicalField::Deposit,
        CanonicalField::Balance,
    ];

    /// Column heading used by the bank's own exports.
    pub fn heading(&self) -> &'static str {
        match self {
            CanonicalField::Date => "Date",
            CanonicalField::Narration => "Narration",
            CanonicalField::Reference => "Chq./Ref.No.",
            CanonicalField::ValueDate => "Value Dt",
            CanonicalField::Withdrawal => "Withdrawal Amt.",
            CanonicalField::Deposit => "Deposit Amt.",
            CanonicalField::Balance => "Closing Balance",
        }
    }

    pub fn is_mandatory(&self) -> bool {
        matches!(
            self,
            CanonicalField::Date | CanonicalField::Withdrawal | CanonicalField::Deposit
        )
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CanonicalField::Date => "date",
            CanonicalField::Narration => "narration",
            CanonicalField::Reference => "reference",
            CanonicalField::ValueDate => "value_date",
            CanonicalField::Withdrawal => "withdrawal",
            CanonicalField::Deposit => "deposit",
            CanonicalField::Balance => "balance",
        };
        f.write_str(name)
    }
}
