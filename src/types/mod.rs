//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Live account records and balance samples
//! - `operation`: Identifiers, typed operations and their outcomes
//! - `payment`: Payments, payment ids and cashback status
//! - `error`: Error types for the ledger

pub mod account;
pub mod error;
pub mod operation;
pub mod payment;

pub use account::{Account, BalanceSample};
pub use error::LedgerError;
pub use operation::{
    AccountId, Amount, Operation, OperationOutcome, OperationOutput, OperationRecord,
    OperationType, Timestamp,
};
pub use payment::{Payment, PaymentId, PaymentSequence, PaymentStatus};
