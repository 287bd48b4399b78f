//! Attach counterparty and cost head to reconstructed records.

use passbook_core::Transaction;
use serde::Serialize;

use crate::cost_heads::{CostHeadTable, ExpenseFilter};
use crate::counterparty::{identify, Counterparty};

/// A record with its semantic labels. The record itself is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedTransaction {
    pub record: Transaction,
    /// Payer, for deposits on a recognised rail
    pub counterparty: Option<Counterparty>,
    /// Cost head, for withdrawals that are expenses
    pub cost_head: Option<String>,
    /// Withdrawal to the owner's own account
    pub internal_transfer: bool,
}

impl ClassifiedTransaction {
    pub fn is_income(&self) -> bool {
        self.record.is_credit()
    }

    pub fn is_expense(&self) -> bool {
        self.record.is_debit() && !self.internal_transfer
    }
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    cost_heads: CostHeadTable,
    filter: ExpenseFilter,
}

impl Classifier {
    pub fn new(cost_heads: CostHeadTable, filter: ExpenseFilter) -> Self {
        Self { cost_heads, filter }
    }

    pub fn cost_heads(&self) -> &CostHeadTable {
        &self.cost_heads
    }

    pub fn classify(&self, txn: &Transaction) -> ClassifiedTransaction {
        let internal_transfer = txn.is_debit() && self.filter.is_internal_transfer(&txn.narration);
        let cost_head = (txn.is_debit() && !internal_transfer)
            .then(|| self.cost_heads.assign(&txn.narration).to_string());

        ClassifiedTransaction {
            record: txn.clone(),
            counterparty: identify(txn),
            cost_head,
            internal_transfer,
        }
    }

    /// Classify a whole sequence, preserving order.
    pub fn classify_all(&self, txns: &[Transaction]) -> Vec<ClassifiedTransaction> {
        txns.iter().map(|t| self.classify(t)).collect()
    }
}
