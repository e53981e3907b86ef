//! Per-account balance history
//!
//! Every balance-changing mutation appends a `(timestamp, balance)` sample to
//! the account's history. Point-in-time queries binary-search that history for
//! the latest sample at or before the requested time.
//!
//! # Ordering
//!
//! Samples are kept in non-decreasing timestamp order. Several samples may
//! share a timestamp; the one appended last is authoritative for queries at
//! that instant. Merging two histories re-sorts with a stable sort so this
//! stays true for same-timestamp samples coming from either side.

use crate::types::{AccountId, Amount, BalanceSample, Timestamp};
use std::collections::HashMap;

/// Ordered sequence of balance samples for one account
///
/// Also used as the immutable snapshot type stored by merge records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    samples: Vec<BalanceSample>,
}

impl History {
    /// A history with the single opening sample `(timestamp, 0)`
    pub fn opened_at(timestamp: Timestamp) -> Self {
        History {
            samples: vec![BalanceSample::new(timestamp, 0)],
        }
    }

    /// Append a sample; callers supply non-decreasing timestamps
    pub fn push(&mut self, sample: BalanceSample) {
        self.samples.push(sample);
    }

    /// Balance recorded by the latest sample with `timestamp <= time_at`
    ///
    /// Returns `None` if `time_at` precedes the first sample.
    pub fn balance_at(&self, time_at: Timestamp) -> Option<Amount> {
        let idx = self
            .samples
            .partition_point(|sample| sample.timestamp <= time_at);
        idx.checked_sub(1).map(|i| self.samples[i].balance)
    }

    /// Fold another history into this one, keeping timestamp order
    ///
    /// `sort_by_key` is stable, so same-timestamp samples keep their relative
    /// order: this history's samples first, then `other`'s.
    pub fn absorb(&mut self, other: History) {
        self.samples.extend(other.samples);
        self.samples.sort_by_key(|sample| sample.timestamp);
    }

    #[cfg(test)]
    pub(crate) fn samples(&self) -> &[BalanceSample] {
        &self.samples
    }
}

/// Balance histories of all accounts, keyed by account id
#[derive(Debug, Default)]
pub struct BalanceHistory {
    histories: HashMap<AccountId, History>,
}

impl BalanceHistory {
    pub fn new() -> Self {
        BalanceHistory {
            histories: HashMap::new(),
        }
    }

    /// Start a fresh history for a newly created account
    ///
    /// Replaces whatever history a previous holder of the same id left behind.
    pub fn start(&mut self, id: &str, timestamp: Timestamp) {
        self.histories
            .insert(id.to_string(), History::opened_at(timestamp));
    }

    /// Record the balance of `id` after a mutation at `timestamp`
    pub fn append(&mut self, id: &str, timestamp: Timestamp, balance: Amount) {
        self.histories
            .entry(id.to_string())
            .or_default()
            .push(BalanceSample::new(timestamp, balance));
    }

    /// Balance of `id` at or before `time_at`
    ///
    /// Returns `None` if the account has no history or `time_at` precedes it.
    #[cfg(test)]
    pub(crate) fn query(&self, id: &str, time_at: Timestamp) -> Option<Amount> {
        self.histories.get(id)?.balance_at(time_at)
    }

    /// Move the history of `source` into `target`
    ///
    /// `source` no longer has a history afterwards.
    pub fn merge(&mut self, target: &str, source: &str) {
        let Some(source_history) = self.histories.remove(source) else {
            return;
        };
        self.histories
            .entry(target.to_string())
            .or_default()
            .absorb(source_history);
    }

    /// Copy of the current history of `id` (empty if it has none)
    pub fn snapshot(&self, id: &str) -> History {
        self.histories.get(id).cloned().unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Option<&History> {
        self.histories.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn history(samples: &[(Timestamp, Amount)]) -> History {
        let mut history = History::default();
        for &(timestamp, balance) in samples {
            history.push(BalanceSample::new(timestamp, balance));
        }
        history
    }

    #[rstest]
    #[case::before_first(0, None)]
    #[case::exactly_first(1, Some(0))]
    #[case::between(3, Some(100))]
    #[case::exact_middle(5, Some(70))]
    #[case::after_last(1_000, Some(70))]
    fn test_balance_at(#[case] time_at: Timestamp, #[case] expected: Option<Amount>) {
        let history = history(&[(1, 0), (2, 100), (5, 70)]);
        assert_eq!(history.balance_at(time_at), expected);
    }

    #[test]
    fn test_balance_at_ties_prefer_last_inserted() {
        let history = history(&[(1, 0), (4, 10), (4, 30), (4, 20)]);
        assert_eq!(history.balance_at(4), Some(20));
        assert_eq!(history.balance_at(3), Some(0));
    }

    #[test]
    fn test_empty_history_has_no_balance() {
        assert_eq!(History::default().balance_at(10), None);
    }

    #[test]
    fn test_absorb_interleaves_stably() {
        let mut target = history(&[(1, 0), (3, 300), (5, 250)]);
        let source = history(&[(2, 0), (3, 100), (4, 90)]);

        target.absorb(source);

        let timestamps: Vec<Timestamp> =
            target.samples().iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![1, 2, 3, 3, 4, 5]);

        // Same-timestamp samples keep target-then-source order
        assert_eq!(target.samples()[2], BalanceSample::new(3, 300));
        assert_eq!(target.samples()[3], BalanceSample::new(3, 100));
    }

    #[test]
    fn test_start_append_and_query() {
        let mut histories = BalanceHistory::new();
        histories.start("a", 1);
        histories.append("a", 2, 100);
        histories.append("a", 3, 40);

        assert_eq!(histories.query("a", 0), None);
        assert_eq!(histories.query("a", 1), Some(0));
        assert_eq!(histories.query("a", 2), Some(100));
        assert_eq!(histories.query("a", 10), Some(40));
        assert_eq!(histories.query("missing", 10), None);
    }

    #[test]
    fn test_start_replaces_previous_history() {
        let mut histories = BalanceHistory::new();
        histories.start("a", 1);
        histories.append("a", 2, 100);

        histories.start("a", 10);

        assert_eq!(histories.query("a", 5), None);
        assert_eq!(histories.query("a", 10), Some(0));
        assert_eq!(histories.get("a").map(|h| h.samples().len()), Some(1));
    }

    #[test]
    fn test_merge_moves_source_into_target() {
        let mut histories = BalanceHistory::new();
        histories.start("a", 1);
        histories.start("b", 1);
        histories.append("a", 2, 300);
        histories.append("b", 2, 100);

        histories.merge("a", "b");

        assert!(histories.get("b").is_none());
        assert_eq!(histories.get("a").map(|h| h.samples().len()), Some(4));
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut histories = BalanceHistory::new();
        histories.start("a", 1);
        histories.append("a", 2, 50);

        let snapshot = histories.snapshot("a");
        histories.append("a", 3, 75);

        assert_eq!(snapshot.balance_at(3), Some(50));
        assert_eq!(histories.query("a", 3), Some(75));
        assert_eq!(histories.snapshot("missing"), History::default());
    }
}
