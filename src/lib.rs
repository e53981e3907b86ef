//! Temporal Ledger Library
//! # Overview
//!
//! This library provides an in-memory banking ledger with point-in-time
//! balance queries, plus a streaming CSV replay tool built on top of it with
//! both a sync and an async processing strategy.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Operation, Payment, LedgerError, ...)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::ledger`] - Public operations and dispatch
//!   - [`core::account_directory`] - Live accounts and current balances
//!   - [`core::balance_history`] - Balance samples for point-in-time queries
//!   - [`core::cashback_scheduler`] - Payments and deferred cashback
//!   - [`core::merge_resolver`] - Merge aliases and pre-merge snapshots
//!   - [`core::spend_tracker`] - Outgoing totals for ranking
//! - [`io`] - CSV reading and outcome output
//! - [`strategy`] - Complete processing pipelines
//! - [`logging`] - tracing subscriber setup
//!
//! # Operations
//!
//! - **create_account**: Register an account with a zero balance
//! - **deposit**: Credit funds to an account
//! - **transfer**: Move funds between two accounts
//! - **pay**: Debit funds and schedule a 2% cashback 86,400,000 time units later
//! - **get_payment_status**: Whether a payment's cashback has been received
//! - **merge_accounts**: Fold one account into another
//! - **get_balance**: Balance of an account at a past time
//! - **top_spenders**: Accounts ranked by outgoing total
//!
//! # Example
//!
//! ```
//! use temporal_ledger::Ledger;
//!
//! let mut ledger = Ledger::new();
//! ledger.create_account(1, "a").unwrap();
//! ledger.deposit(2, "a", 100).unwrap();
//! assert_eq!(ledger.get_balance(3, "a", 2), Ok(100));
//! assert!(ledger.get_balance(3, "a", 0).is_err());
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use self::core::{Ledger, CASHBACK_DELAY, CASHBACK_PERCENT};
pub use io::write_outcomes_csv;
pub use types::{
    Account, AccountId, Amount, LedgerError, Operation, OperationOutcome, OperationOutput,
    OperationRecord, OperationType, PaymentId, PaymentStatus, Timestamp,
};
