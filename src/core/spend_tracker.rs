//! Outgoing totals per account
//!
//! Transfers out and payments add to the source account's total. Totals are
//! never decremented; a merge sums the two totals into the survivor.

use crate::types::{Account, AccountId, Amount};
use std::cmp::Reverse;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SpendTracker {
    totals: HashMap<AccountId, Amount>,
}

impl SpendTracker {
    pub fn new() -> Self {
        SpendTracker {
            totals: HashMap::new(),
        }
    }

    /// Add an outgoing amount to `id`'s total
    ///
    /// Saturates instead of overflowing; the debit that produced the amount
    /// has already been applied.
    pub fn add(&mut self, id: &str, amount: Amount) {
        let total = self.totals.entry(id.to_string()).or_insert(0);
        *total = total.saturating_add(amount);
    }

    /// Outgoing total of `id` (zero if it never spent anything)
    pub fn total(&self, id: &str) -> Amount {
        self.totals.get(id).copied().unwrap_or(0)
    }

    /// Fold `merged`'s total into `survivor`'s
    pub fn absorb(&mut self, survivor: &str, merged: &str) {
        if let Some(amount) = self.totals.remove(merged) {
            self.add(survivor, amount);
        }
    }

    /// Drop any total left under `id`
    ///
    /// Used when a merged-away id is created again as a fresh account.
    pub fn reset(&mut self, id: &str) {
        self.totals.remove(id);
    }

    /// Rank `accounts` by outgoing total
    ///
    /// Highest total first, ties broken by ascending id. At most `n` entries,
    /// each rendered as `id(total)`.
    pub fn top<'a>(&self, accounts: impl IntoIterator<Item = &'a Account>, n: usize) -> Vec<String> {
        let mut ranked: Vec<(&str, Amount)> = accounts
            .into_iter()
            .map(|account| (account.id.as_str(), self.total(&account.id)))
            .collect();

        ranked.sort_by_key(|&(id, total)| (Reverse(total), id));

        ranked
            .into_iter()
            .take(n)
            .map(|(id, total)| format!("{}({})", id, total))
            .collect()
    }
}
