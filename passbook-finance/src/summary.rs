//! Aggregates over a classified sequence: income, expense, monthly figures,
//! cost-head totals, customer statistics and keyword search.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::classifier::ClassifiedTransaction;
use crate::cost_heads::CostHeadTable;
use crate::counterparty::Counterparty;

/// Customers with more credits than this are counted as repeat customers.
pub const DEFAULT_REPEAT_THRESHOLD: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyFigures {
    /// `YYYY-MM`
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostHeadTotal {
    pub name: String,
    pub transactions: usize,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterpartyTotal {
    pub counterparty: Counterparty,
    pub transactions: usize,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerStats {
    pub unique: usize,
    pub repeat: usize,
    pub repeat_pct: Decimal,
    /// Largest total first
    pub totals: Vec<CounterpartyTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub profit: Decimal,
    pub margin_pct: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
    pub cash_income: Decimal,
    pub digital_income: Decimal,
    pub monthly: Vec<MonthlyFigures>,
    /// Table order, `Other` last; heads with no expenses are left out
    pub cost_heads: Vec<CostHeadTotal>,
    pub customers: CustomerStats,
}

fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole > Decimal::ZERO {
        part * Decimal::ONE_HUNDRED / whole
    } else {
        Decimal::ZERO
    }
}

/// Cash deposits are made at the branch; everything else arrived digitally.
pub fn is_cash_deposit(narration: &str) -> bool {
    let n = narration.trim().to_uppercase();
    n.starts_with("CASHDEPOSIT") || n.starts_with("CASH DEPOSIT")
}

pub fn summarize(
    txns: &[ClassifiedTransaction],
    cost_heads: &CostHeadTable,
    repeat_threshold: usize,
) -> Summary {
    let incomes: Vec<&ClassifiedTransaction> = txns.iter().filter(|t| t.is_income()).collect();
    let expenses: Vec<&ClassifiedTransaction> = txns.iter().filter(|t| t.is_expense()).collect();

    let total_income: Decimal = incomes.iter().map(|t| t.record.deposit).sum();
    let total_expense: Decimal = expenses.iter().map(|t| t.record.withdrawal).sum();
    let profit = total_income - total_expense;

    let cash_income: Decimal = incomes
        .iter()
        .filter(|t| is_cash_deposit(&t.record.narration))
        .map(|t| t.record.deposit)
        .sum();

    Summary {
        total_income,
        total_expense,
        profit,
        margin_pct: percent(profit, total_income),
        income_count: incomes.len(),
        expense_count: expenses.len(),
        cash_income,
        digital_income: total_income - cash_income,
        monthly: monthly_figures(&incomes, &expenses),
        cost_heads: cost_head_totals(&expenses, cost_heads),
        customers: customer_stats(&incomes, repeat_threshold),
    }
}

fn monthly_figures(
    incomes: &[&ClassifiedTransaction],
    expenses: &[&ClassifiedTransaction],
) -> Vec<MonthlyFigures> {
    let mut months: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for t in incomes {
        let month = t.record.date.format("%Y-%m").to_string();
        months.entry(month).or_default().0 += t.record.deposit;
    }
    for t in expenses {
        let month = t.record.date.format("%Y-%m").to_string();
        months.entry(month).or_default().1 += t.record.withdrawal;
    }
    months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyFigures {
            month,
            income,
            expense,
        })
        .collect()
}

fn cost_head_totals(expenses: &[&ClassifiedTransaction], table: &CostHeadTable) -> Vec<CostHeadTotal> {
    let mut totals: HashMap<&str, (usize, Decimal)> = HashMap::new();
    for t in expenses {
        let head = t.cost_head.as_deref().unwrap_or(crate::cost_heads::OTHER);
        let entry = totals.entry(head).or_default();
        entry.0 += 1;
        entry.1 += t.record.withdrawal;
    }
    table
        .names()
        .filter_map(|name| {
            totals.get(name).map(|(transactions, total)| CostHeadTotal {
                name: name.to_string(),
                transactions: *transactions,
                total: *total,
            })
        })
        .collect()
}

fn customer_stats(incomes: &[&ClassifiedTransaction], repeat_threshold: usize) -> CustomerStats {
    let mut by_counterparty: HashMap<&Counterparty, (usize, Decimal)> = HashMap::new();
    for t in incomes {
        if let Some(cp) = &t.counterparty {
            let entry = by_counterparty.entry(cp).or_default();
            entry.0 += 1;
            entry.1 += t.record.deposit;
        }
    }

    let mut totals: Vec<CounterpartyTotal> = by_counterparty
        .into_iter()
        .map(|(cp, (transactions, total))| CounterpartyTotal {
            counterparty: cp.clone(),
            transactions,
            total,
        })
        .collect();
    totals.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.counterparty.cmp(&b.counterparty))
    });

    let unique = totals.len();
    let repeat = totals
        .iter()
        .filter(|t| t.transactions > repeat_threshold)
        .count();

    CustomerStats {
        unique,
        repeat,
        repeat_pct: percent(Decimal::from(repeat), Decimal::from(unique)),
        totals,
    }
}

/// The `n` largest expenses, largest first. Ties keep sequence order.
pub fn top_expenses(txns: &[ClassifiedTransaction], n: usize) -> Vec<&ClassifiedTransaction> {
    let mut out: Vec<&ClassifiedTransaction> = txns.iter().filter(|t| t.is_expense()).collect();
    out.sort_by(|a, b| b.record.withdrawal.cmp(&a.record.withdrawal));
    out.truncate(n);
    out
}

/// The `n` largest deposits, largest first. Ties keep sequence order.
pub fn top_incomes(txns: &[ClassifiedTransaction], n: usize) -> Vec<&ClassifiedTransaction> {
    let mut out: Vec<&ClassifiedTransaction> = txns.iter().filter(|t| t.is_income()).collect();
    out.sort_by(|a, b| b.record.deposit.cmp(&a.record.deposit));
    out.truncate(n);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Income,
    Expense,
}

#[derive(Debug, Clone)]
pub struct SearchResult<'a> {
    pub total: Decimal,
    pub matches: Vec<&'a ClassifiedTransaction>,
}

/// Case-insensitive substring search over deposit or expense narrations.
pub fn search<'a>(txns: &'a [ClassifiedTransaction], keyword: &str, scope: SearchScope) -> SearchResult<'a> {
    let needle = keyword.trim().to_lowercase();
    let amount = |t: &ClassifiedTransaction| match scope {
        SearchScope::Income => t.record.deposit,
        SearchScope::Expense => t.record.withdrawal,
    };

    let matches: Vec<&ClassifiedTransaction> = txns
        .iter()
        .filter(|t| match scope {
            SearchScope::Income => t.is_income(),
            SearchScope::Expense => t.is_expense(),
        })
        .filter(|t| !needle.is_empty() && t.record.narration.to_lowercase().contains(&needle))
        .collect();

    SearchResult {
        total: matches.iter().map(|t| amount(*t)).sum(),
        matches,
    }
}
