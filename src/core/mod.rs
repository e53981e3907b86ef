//! Core business logic module
//!
//! This module contains the ledger and the components it orchestrates:
//! - `ledger` - Public operations and dispatch
//! - `account_directory` - Live accounts and their current balances
//! - `balance_history` - Time-ordered balance samples per account
//! - `cashback_scheduler` - Payments and their deferred cashback
//! - `merge_resolver` - Merge aliases and pre-merge history snapshots
//! - `spend_tracker` - Outgoing totals for ranking

pub mod account_directory;
pub mod balance_history;
pub mod cashback_scheduler;
pub mod ledger;
pub mod merge_resolver;
pub mod spend_tracker;

pub use account_directory::AccountDirectory;
pub use balance_history::{BalanceHistory, History};
pub use cashback_scheduler::CashbackScheduler;
pub use ledger::{cashback_for, Ledger, CASHBACK_DELAY, CASHBACK_PERCENT};
pub use merge_resolver::{AbsorbedMerge, MergeRecord, MergeResolver};
pub use spend_tracker::SpendTracker;
