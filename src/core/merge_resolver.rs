//! Account merge bookkeeping
//!
//! When account B is merged into account A, B's id stops naming a live
//! account and becomes an alias of A. This module keeps:
//!
//! - the alias edges (`B -> A`), resolved like a union-find without ranks
//! - a [`MergeRecord`] per merged-away id with B's history frozen at the merge
//! - an [`AbsorbedMerge`] per survivor and merge with A's history just before
//!   the merge
//!
//! The snapshots exist because the survivor's live history interleaves the
//! samples of both sides. Samples from before a merge are only meaningful in
//! the snapshot of the account they belong to.
//!
//! # Point-in-time Lookup
//!
//! For an id and a query time `T`, the answering history is the snapshot of
//! the earliest merge that id absorbed after `T`. If there is none, it is the
//! id's final history: the live one, or the one frozen when the id itself was
//! merged away. See [`MergeResolver::history_for`].

use crate::core::account_directory::AccountDirectory;
use crate::core::balance_history::History;
use crate::types::{AccountId, Timestamp};
use std::collections::HashMap;

/// Frozen state of an id that was merged away
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRecord {
    /// Timestamp of the merge
    pub merged_at: Timestamp,

    /// This id's full history up to the merge
    pub history: History,
}

/// A merge as seen from the surviving account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsorbedMerge {
    pub merged_at: Timestamp,

    /// The survivor's own history just before the merge
    pub history: History,
}

/// Alias map and merge metadata
#[derive(Debug, Default)]
pub struct MergeResolver {
    /// Alias edges: merged-away id -> id it was merged into
    parents: HashMap<AccountId, AccountId>,

    /// Merge records of merged-away ids
    records: HashMap<AccountId, MergeRecord>,

    /// Merges absorbed by each survivor, in merge order
    absorbed: HashMap<AccountId, Vec<AbsorbedMerge>>,
}

impl MergeResolver {
    pub fn new() -> Self {
        MergeResolver {
            parents: HashMap::new(),
            records: HashMap::new(),
            absorbed: HashMap::new(),
        }
    }

    /// Follow alias edges from `id` to a fixed point without modifying them
    pub fn find<'a>(&'a self, id: &'a str) -> &'a str {
        let mut current = id;
        while let Some(parent) = self.parents.get(current) {
            current = parent;
        }
        current
    }

    /// Follow alias edges from `id` to a fixed point
    ///
    /// Returns `id` itself if it has no alias. Every id on the walked path is
    /// re-pointed directly at the result.
    pub fn resolve(&mut self, id: &str) -> AccountId {
        let root = self.find(id).to_string();

        let mut current = id.to_string();
        while let Some(parent) = self.parents.get(&current).cloned() {
            if parent == root {
                break;
            }
            self.parents.insert(current, root.clone());
            current = parent;
        }

        root
    }

    /// Whether `id` was merged away: not live, but aliased
    pub fn is_dangling(&self, id: &str, directory: &AccountDirectory) -> bool {
        !directory.exists(id) && self.parents.contains_key(id)
    }

    /// Record that `merged` was folded into `survivor` at `timestamp`
    ///
    /// # Arguments
    ///
    /// * `survivor_history` - The survivor's history before the merge
    /// * `merged_history` - The merged-away account's history before the merge
    pub fn merge(
        &mut self,
        timestamp: Timestamp,
        survivor: &str,
        merged: &str,
        survivor_history: History,
        merged_history: History,
    ) {
        self.parents
            .insert(merged.to_string(), survivor.to_string());
        self.records.insert(
            merged.to_string(),
            MergeRecord {
                merged_at: timestamp,
                history: merged_history,
            },
        );
        self.absorbed
            .entry(survivor.to_string())
            .or_default()
            .push(AbsorbedMerge {
                merged_at: timestamp,
                history: survivor_history,
            });
    }

    /// Drop all merge metadata of `id` so it can start over as a new account
    ///
    /// Ids that were aliased to `id` are re-pointed at `id`'s own target, so
    /// they keep resolving to the account that holds their funds rather than
    /// to the new account.
    pub fn forget(&mut self, id: &str) {
        let target = self.parents.remove(id);
        self.records.remove(id);
        self.absorbed.remove(id);

        if let Some(target) = target {
            for parent in self.parents.values_mut() {
                if parent == id {
                    *parent = target.clone();
                }
            }
        }
    }

    /// Merge record of `id`, if it is currently merged away
    pub fn merge_record(&self, id: &str) -> Option<&MergeRecord> {
        self.records.get(id)
    }

    /// Merges absorbed by `id`, oldest first
    pub fn absorbed_merges(&self, id: &str) -> &[AbsorbedMerge] {
        self.absorbed.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// History that answers a query for `id` at `time_at`
    ///
    /// Picks the snapshot of the earliest merge absorbed by `id` strictly
    /// after `time_at`, falling back to `current` (the id's live or frozen
    /// history) when every absorbed merge happened at or before `time_at`.
    pub fn history_for<'a>(
        &'a self,
        id: &str,
        time_at: Timestamp,
        current: &'a History,
    ) -> &'a History {
        let merges = self.absorbed_merges(id);
        let idx = merges.partition_point(|merge| merge.merged_at <= time_at);
        merges.get(idx).map_or(current, |merge| &merge.history)
    }
}
