//! Counterparty identification for incoming payments.
//!
//! The payment rail is named by the narration prefix and each rail encodes
//! the payer differently:
//!
//!   UPI-SUBHASHCHANDERBALI-ljksdf@okhdfcbank          -> UPI-SUBHASHCHANDERBALI
//!   NEFT CR-SBIN0000583-MRS RASHMI SAXENA             -> NEFT CR-SBIN0000583
//!   IMPS-506016885554-REKHA MITTAL-SBIN-XXXX4686-...  -> REKHA MITTAL

use std::fmt;

use passbook_core::Transaction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rail {
    Upi,
    Neft,
    Imps,
}

impl Rail {
    const PREFIXES: [(&'static str, Rail); 3] =
        [("UPI", Rail::Upi), ("NEFT", Rail::Neft), ("IMPS", Rail::Imps)];

    /// Rail named by the narration's prefix (ASCII case-insensitive).
    pub fn detect(narration: &str) -> Option<Rail> {
        let n = narration.trim();
        Self::PREFIXES.into_iter().find_map(|(prefix, rail)| {
            n.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
                .then_some(rail)
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rail::Upi => "UPI",
            Rail::Neft => "NEFT",
            Rail::Imps => "IMPS",
        }
    }
}

impl fmt::Display for Rail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A payer. Two payments share a counterparty only when rail and id match
/// exactly (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Counterparty {
    pub rail: Rail,
    pub id: String,
}

impl fmt::Display for Counterparty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.rail)
    }
}

/// Payer identifier encoded in a narration, if its rail is recognised.
///
/// UPI and NEFT: everything before the second hyphen. IMPS: the text
/// between the second and third hyphen. When the hyphens are missing the
/// whole trimmed narration is the identifier.
pub fn counterparty_id(narration: &str) -> Option<Counterparty> {
    let n = narration.trim();
    let rail = Rail::detect(n)?;
    let hyphens: Vec<usize> = n.match_indices('-').map(|(i, _)| i).take(3).collect();

    let id = match rail {
        Rail::Upi | Rail::Neft => match hyphens.get(1) {
            Some(&second) => &n[..second],
            None => n,
        },
        Rail::Imps => match (hyphens.get(1), hyphens.get(2)) {
            (Some(&second), Some(&third)) => &n[second + 1..third],
            _ => n,
        },
    };

    Some(Counterparty {
        rail,
        id: id.to_string(),
    })
}

/// Counterparty of a deposit. Withdrawals have none.
pub fn identify(txn: &Transaction) -> Option<Counterparty> {
    if !txn.is_credit() {
        return None;
    }
    counterparty_id(&txn.narration)
}
