//! Account-related types for the temporal ledger
//!
//! This module defines the live account record and the balance samples that
//! make up an account's history.

use super::operation::{AccountId, Amount, Timestamp};

/// Live account state
///
/// Represents an account that currently exists in the ledger. Accounts that
/// were merged away are no longer represented by this type; their id only
/// survives as an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// The account identifier
    pub id: AccountId,

    /// Timestamp of the `create_account` call that produced this account
    ///
    /// Balance queries for any earlier time report no balance.
    pub created_at: Timestamp,

    /// Current balance
    ///
    /// Unsigned, so the non-negative balance invariant holds by construction.
    pub balance: Amount,
}

impl Account {
    /// Create a new account with a zero balance
    ///
    /// # Arguments
    ///
    /// * `id` - The account identifier
    /// * `created_at` - The creation timestamp
    pub fn new(id: AccountId, created_at: Timestamp) -> Self {
        Account {
            id,
            created_at,
            balance: 0,
        }
    }
}

/// One recorded `(timestamp, balance)` observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSample {
    pub timestamp: Timestamp,
    /// Balance right after the mutation recorded at `timestamp`
    pub balance: Amount,
}

impl BalanceSample {
    pub fn new(timestamp: Timestamp, balance: Amount) -> Self {
        BalanceSample { timestamp, balance }
    }
}
