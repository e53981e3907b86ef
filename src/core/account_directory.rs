//! Account directory module
//!
//! This module provides the `AccountDirectory` struct which owns every live
//! account and is the single source of truth for account existence.
//!
//! The AccountDirectory is responsible for:
//! - Creating accounts with a zero balance
//! - Crediting and debiting balances with checked arithmetic
//! - Removing accounts that are merged away
//! - Providing sorted account listings for ranking

use crate::types::{Account, AccountId, Amount, LedgerError, Timestamp};
use std::collections::HashMap;

/// Manages all live accounts
///
/// Maintains an in-memory map of account ids to account records. Ids that
/// were merged away are absent from this map.
#[derive(Debug, Default)]
pub struct AccountDirectory {
    /// Map of account ids to live account records
    accounts: HashMap<AccountId, Account>,
}

impl AccountDirectory {
    /// Create a new AccountDirectory with no accounts
    pub fn new() -> Self {
        AccountDirectory {
            accounts: HashMap::new(),
        }
    }

    /// Register a new live account with a zero balance
    ///
    /// # Arguments
    ///
    /// * `id` - The account identifier
    /// * `timestamp` - The creation time
    ///
    /// # Errors
    ///
    /// Returns `AccountExists` if `id` currently names a live account.
    /// An id that was merged away is not live and can be created again.
    pub fn create(&mut self, id: &str, timestamp: Timestamp) -> Result<(), LedgerError> {
        if self.accounts.contains_key(id) {
            return Err(LedgerError::account_exists(id));
        }

        self.accounts
            .insert(id.to_string(), Account::new(id.to_string(), timestamp));
        Ok(())
    }

    /// Check whether `id` names a live account
    pub fn exists(&self, id: &str) -> bool {
        self.accounts.contains_key(id)
    }

    /// Get a live account
    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Current balance of a live account
    pub fn balance(&self, id: &str) -> Result<Amount, LedgerError> {
        self.get(id)
            .map(|account| account.balance)
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    /// Creation time of a live account
    pub fn created_at(&self, id: &str) -> Result<Timestamp, LedgerError> {
        self.get(id)
            .map(|account| account.created_at)
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    /// Credit funds to a live account
    ///
    /// # Returns
    ///
    /// The balance after the credit
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist
    /// - Adding the amount would overflow the balance
    pub fn credit(&mut self, id: &str, amount: Amount) -> Result<Amount, LedgerError> {
        let account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| LedgerError::account_not_found(id))?;

        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("credit", id))?;

        Ok(account.balance)
    }

    /// Debit funds from a live account
    ///
    /// # Returns
    ///
    /// The balance after the debit
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist
    /// - The amount exceeds the current balance (the balance is left unchanged)
    pub fn debit(&mut self, id: &str, amount: Amount) -> Result<Amount, LedgerError> {
        let account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| LedgerError::account_not_found(id))?;

        if account.balance < amount {
            return Err(LedgerError::insufficient_funds(id, account.balance, amount));
        }

        account.balance -= amount;
        Ok(account.balance)
    }

    /// Delete a live account record
    ///
    /// Only used when the account is merged into another one.
    pub fn remove(&mut self, id: &str) -> Result<Account, LedgerError> {
        self.accounts
            .remove(id)
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    /// Get all live accounts sorted by id
    pub fn get_all_accounts(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        accounts
    }

    /// Number of live accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
