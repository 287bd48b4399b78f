//! Transaction reconstruction.
//!
//! Lines arrive in statement order. A date-led line opens a pending
//! transaction; wrapped lines extend it; the next date-led line (or end of
//! input) closes it. Closed drafts are then finalized as a whole: sorted by
//! date, back-filled from the running balance, and stripped of records that
//! carry no amount.

use std::collections::HashSet;

use chrono::NaiveDate;
use passbook_core::{parse_statement_date, Transaction};
use rust_decimal::Decimal;
use tracing::debug;

use crate::classify::{classify_line, LineKind};
use crate::error::{IngestError, LineIssue};
use crate::tokens::{AmountToken, LineTokens, TokenExtractor};

/// Narration prefix length used by the duplicate-row check.
pub const DEDUPE_NARRATION_CHARS: usize = 80;

/// What the statement prints in the `Chq./Ref.No.` column when a row has no
/// reference.
pub const NO_REFERENCE: &str = "0000000000000000";

/// What is known about a draft's amounts so far.
///
/// The running balance is always the rightmost amount on a line; the
/// statement's two amount columns sit to its left as deposit then withdrawal
/// reading right to left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountLayout {
    /// No amount seen yet
    Pending,
    /// One amount: taken as the balance
    BalanceOnly { balance: Decimal },
    /// Two amounts: direction unknown until the balance delta is checked
    Single { amount: Decimal, balance: Decimal },
    /// Three or more amounts, or explicit table columns
    Columns {
        withdrawal: Decimal,
        deposit: Decimal,
        balance: Decimal,
    },
}

impl AmountLayout {
    /// Resolve from the parsed amounts of one line, left to right.
    pub fn from_values(values: &[Decimal]) -> Self {
        match values {
            [] => AmountLayout::Pending,
            [balance] => AmountLayout::BalanceOnly { balance: *balance },
            [amount, balance] => AmountLayout::Single {
                amount: *amount,
                balance: *balance,
            },
            [.., deposit, withdrawal, balance] => AmountLayout::Columns {
                withdrawal: *withdrawal,
                deposit: *deposit,
                balance: *balance,
            },
        }
    }

    pub fn balance(&self) -> Option<Decimal> {
        match self {
            AmountLayout::Pending => None,
            AmountLayout::BalanceOnly { balance }
            | AmountLayout::Single { balance, .. }
            | AmountLayout::Columns { balance, .. } => Some(*balance),
        }
    }

    /// Number of rightmost tokens this layout consumes.
    fn tokens_used(count: usize) -> usize {
        count.min(3)
    }
}

/// A transaction still open to amendment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// 1-based source line (or row) that opened the draft
    pub line: usize,
    pub date: NaiveDate,
    pub narration: String,
    pub reference: Option<String>,
    pub value_date: Option<NaiveDate>,
    pub amounts: AmountLayout,
}

impl Draft {
    fn append_narration(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.narration.is_empty() {
            self.narration.push(' ');
        }
        self.narration.push_str(text);
    }

    /// Apply the narration/reference/value-date/amount content of a line
    /// that carries amounts.
    fn absorb(&mut self, parts: LineParts) {
        self.append_narration(&parts.narration);
        if parts.reference.is_some() {
            self.reference = parts.reference;
        }
        if parts.value_date.is_some() {
            self.value_date = parts.value_date;
        }
        self.amounts = parts.amounts;
    }
}

#[derive(Debug)]
enum State {
    Idle,
    Open(Draft),
}

/// Line-by-line state machine over one statement source.
#[derive(Debug)]
pub struct Reconstructor {
    extractor: TokenExtractor,
    state: State,
    line_no: usize,
    drafts: Vec<Draft>,
    warnings: Vec<IngestError>,
}

/// Drafts closed by a reconstruction run plus everything recovered along the way.
#[derive(Debug, Default)]
pub struct Reconstruction {
    pub drafts: Vec<Draft>,
    pub warnings: Vec<IngestError>,
}

impl Reconstructor {
    pub fn new() -> Result<Self, IngestError> {
        Ok(Self {
            extractor: TokenExtractor::new()?,
            state: State::Idle,
            line_no: 0,
            drafts: Vec::new(),
            warnings: Vec::new(),
        })
    }

    pub fn push_line(&mut self, line: &str) {
        self.line_no += 1;
        let line_no = self.line_no;

        match classify_line(&self.extractor, line) {
            LineKind::Blank | LineKind::Header => {}
            LineKind::NewTransaction { date, tokens } => {
                self.close();
                let parts = self.split_line(line_no, &tokens);
                let mut draft = Draft {
                    line: line_no,
                    date,
                    narration: String::new(),
                    reference: None,
                    value_date: None,
                    amounts: AmountLayout::Pending,
                };
                draft.absorb(parts);
                self.state = State::Open(draft);
            }
            kind @ LineKind::Continuation { .. } => {
                let supplies_amounts = kind.supplies_amounts();
                let LineKind::Continuation { tokens, bad_date } = kind else {
                    return;
                };
                if bad_date.is_some() {
                    debug!(line = line_no, "date-shaped token is not a calendar date");
                    self.warnings
                        .push(IngestError::malformed(line_no, LineIssue::InvalidDate, tokens.line));
                }

                let parts = supplies_amounts.then(|| self.split_line(line_no, &tokens));
                match &mut self.state {
                    State::Open(draft) => match parts {
                        Some(parts) => draft.absorb(parts),
                        None => draft.append_narration(tokens.line),
                    },
                    State::Idle => {
                        debug!(line = line_no, "continuation outside any transaction");
                        self.warnings.push(IngestError::malformed(
                            line_no,
                            LineIssue::OrphanContinuation,
                            tokens.line,
                        ));
                    }
                }
            }
        }
    }

    /// Close the open draft, if any.
    fn close(&mut self) {
        if let State::Open(draft) = std::mem::replace(&mut self.state, State::Idle) {
            self.drafts.push(draft);
        }
    }

    fn split_line(&mut self, line_no: usize, tokens: &LineTokens<'_>) -> LineParts {
        for bad in tokens.amounts.iter().filter(|a| a.value.is_none()) {
            self.warnings
                .push(IngestError::malformed(line_no, LineIssue::UnparseableAmount, bad.raw));
        }
        split_line_parts(tokens)
    }

    pub fn finish(mut self) -> Reconstruction {
        self.close();
        Reconstruction {
            drafts: self.drafts,
            warnings: self.warnings,
        }
    }
}

/// Narration, trailing reference/value-date columns and amounts of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LineParts {
    narration: String,
    reference: Option<String>,
    value_date: Option<NaiveDate>,
    amounts: AmountLayout,
}

fn split_line_parts(tokens: &LineTokens<'_>) -> LineParts {
    let usable = tokens.usable_amounts();
    let used: &[&AmountToken<'_>] = &usable[usable.len() - AmountLayout::tokens_used(usable.len())..];
    let values: Vec<Decimal> = used.iter().filter_map(|a| a.value).collect();

    let residual = strip_amounts(tokens.body(), used);
    let (narration, reference, value_date) = split_trailing_columns(residual);

    LineParts {
        narration,
        reference,
        value_date,
        amounts: AmountLayout::from_values(&values),
    }
}

/// Truncate at the last occurrence of each used amount, rightmost first.
fn strip_amounts<'a>(body: &'a str, used: &[&AmountToken<'_>]) -> &'a str {
    let mut rest = body;
    for token in used.iter().rev() {
        if let Some(idx) = rest.rfind(token.raw) {
            rest = rest[..idx].trim_end();
        }
    }
    rest.trim()
}

/// Peel the statement's `Chq./Ref.No.` and `Value Dt` columns off the end of
/// the residual text. The reference is only recognised next to a value date;
/// an all-zero reference is the bank's filler for "none".
fn split_trailing_columns(residual: &str) -> (String, Option<String>, Option<NaiveDate>) {
    let mut words: Vec<&str> = residual.split_whitespace().collect();

    let value_date = words.last().and_then(|w| parse_statement_date(w));
    if value_date.is_none() {
        return (words.join(" "), None, None);
    }
    words.pop();

    let mut reference = None;
    if let Some(&last) = words.last() {
        if is_blank_reference(last) {
            words.pop();
        } else if words.len() > 1 && looks_like_reference(last) {
            reference = Some(last.to_string());
            words.pop();
        }
    }

    (words.join(" "), reference, value_date)
}

/// Cheque/UTR numbers: at least ten alphanumerics, at least six of them digits.
fn looks_like_reference(word: &str) -> bool {
    word.len() >= 10
        && word.chars().all(|c| c.is_ascii_alphanumeric())
        && word.chars().filter(|c| c.is_ascii_digit()).count() >= 6
}

fn is_blank_reference(word: &str) -> bool {
    looks_like_reference(word) && word.bytes().all(|b| b == b'0')
}

/// Collapse runs of whitespace to one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop rows whose `(date, narration prefix, balance)` repeats an earlier
/// row's. Table extractors emit the same visual row twice across page
/// boundaries.
pub fn dedupe_drafts(drafts: Vec<Draft>) -> (Vec<Draft>, usize) {
    let mut seen = HashSet::new();
    let mut removed = 0;
    let kept: Vec<Draft> = drafts
        .into_iter()
        .filter(|d| {
            let prefix: String = d.narration.chars().take(DEDUPE_NARRATION_CHARS).collect();
            let fresh = seen.insert((d.date, prefix, d.amounts.balance()));
            if !fresh {
                debug!(line = d.line, "dropping duplicate row");
                removed += 1;
            }
            fresh
        })
        .collect();
    (kept, removed)
}

/// Turn closed drafts into records.
///
/// Drafts that never saw a balance are dropped first. The rest are
/// stable-sorted by date, then two-amount drafts take their direction from the
/// change against the preceding balance. With no preceding balance the amount
/// is assumed to be a withdrawal. Records left with no withdrawal and no
/// deposit are dropped.
pub fn finalize_drafts(drafts: Vec<Draft>, warnings: &mut Vec<IngestError>) -> Vec<Transaction> {
    let mut drafts: Vec<Draft> = drafts
        .into_iter()
        .filter(|d| {
            if d.amounts.balance().is_some() {
                return true;
            }
            debug!(line = d.line, "no amounts on transaction");
            warnings.push(IngestError::malformed(d.line, LineIssue::NoAmount, d.narration.clone()));
            false
        })
        .collect();
    drafts.sort_by_key(|d| d.date);

    let mut out = Vec::with_capacity(drafts.len());
    let mut previous_balance: Option<Decimal> = None;

    for draft in drafts {
        let (withdrawal, deposit, balance) = match draft.amounts {
            AmountLayout::Pending => continue,
            AmountLayout::BalanceOnly { balance } => (Decimal::ZERO, Decimal::ZERO, balance),
            AmountLayout::Single { amount, balance } => match previous_balance {
                Some(prev) => {
                    let delta = balance - prev;
                    if delta < Decimal::ZERO {
                        (delta.abs(), Decimal::ZERO, balance)
                    } else {
                        (Decimal::ZERO, delta.abs(), balance)
                    }
                }
                None => (amount, Decimal::ZERO, balance),
            },
            AmountLayout::Columns {
                withdrawal,
                deposit,
                balance,
            } => (withdrawal, deposit, balance),
        };
        previous_balance = Some(balance);

        let record = Transaction {
            date: draft.date,
            narration: collapse_whitespace(&draft.narration),
            reference: draft.reference,
            value_date: draft.value_date.or(Some(draft.date)),
            withdrawal,
            deposit,
            closing_balance: balance,
        };

        if record.has_amount() {
            out.push(record);
        } else {
            debug!(line = draft.line, "dropping transaction with zero amounts");
            warnings.push(IngestError::malformed(draft.line, LineIssue::NoAmount, record.narration));
        }
    }

    out
}
