//! Operation-related types for the temporal ledger
//!
//! This module defines the scalar identifiers used throughout the ledger, the
//! typed operations produced by the input layer, and the outcomes the ledger
//! reports back for each of them.

use super::error::LedgerError;
use super::payment::{PaymentId, PaymentStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier
///
/// Arbitrary caller-chosen string such as `"acc1"`.
pub type AccountId = String;

/// Logical time supplied by the caller
///
/// The unit is opaque to the ledger; cashback delays are expressed in the same unit.
pub type Timestamp = u64;

/// Integer monetary amount
pub type Amount = u64;

/// Operation types understood by the ledger
///
/// Each variant corresponds to one public ledger operation. The serde names
/// match the `type` column of the input CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Register a new account with a zero balance
    CreateAccount,

    /// Credit funds to an account
    Deposit,

    /// Move funds between two distinct accounts
    ///
    /// Counts toward the source account's outgoing total.
    Transfer,

    /// Rank accounts by outgoing total
    TopSpenders,

    /// Debit funds as a payment and schedule its cashback
    Pay,

    /// Report whether a payment's cashback has been received
    GetPaymentStatus,

    /// Fold one account into another
    MergeAccounts,

    /// Point-in-time balance query
    GetBalance,
}

impl OperationType {
    /// The lowercase name used in CSV input and output
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::CreateAccount => "create_account",
            OperationType::Deposit => "deposit",
            OperationType::Transfer => "transfer",
            OperationType::TopSpenders => "top_spenders",
            OperationType::Pay => "pay",
            OperationType::GetPaymentStatus => "get_payment_status",
            OperationType::MergeAccounts => "merge_accounts",
            OperationType::GetBalance => "get_balance",
        }
    }

    /// Whether the operation reports success as `true`/`false` rather than a value
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            OperationType::CreateAccount | OperationType::MergeAccounts
        )
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated operation with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateAccount {
        account: AccountId,
    },
    Deposit {
        account: AccountId,
        amount: Amount,
    },
    Transfer {
        source: AccountId,
        target: AccountId,
        amount: Amount,
    },
    TopSpenders {
        n: usize,
    },
    Pay {
        account: AccountId,
        amount: Amount,
    },
    GetPaymentStatus {
        account: AccountId,
        payment: String,
    },
    MergeAccounts {
        account_1: AccountId,
        account_2: AccountId,
    },
    GetBalance {
        account: AccountId,
        time_at: Timestamp,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationType {
        match self {
            Operation::CreateAccount { .. } => OperationType::CreateAccount,
            Operation::Deposit { .. } => OperationType::Deposit,
            Operation::Transfer { .. } => OperationType::Transfer,
            Operation::TopSpenders { .. } => OperationType::TopSpenders,
            Operation::Pay { .. } => OperationType::Pay,
            Operation::GetPaymentStatus { .. } => OperationType::GetPaymentStatus,
            Operation::MergeAccounts { .. } => OperationType::MergeAccounts,
            Operation::GetBalance { .. } => OperationType::GetBalance,
        }
    }
}

/// Input operation record
///
/// Represents a single operation as read from the input, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    /// Time at which the operation is executed
    pub timestamp: Timestamp,

    /// The operation and its arguments
    pub operation: Operation,
}

impl OperationRecord {
    pub fn new(timestamp: Timestamp, operation: Operation) -> Self {
        OperationRecord {
            timestamp,
            operation,
        }
    }
}

/// Successful result of a ledger operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutput {
    /// The operation succeeded and has no value to report
    Accepted,
    /// A balance (after a deposit/transfer, or at a queried time)
    Balance(Amount),
    /// The id assigned to a new payment
    Payment(PaymentId),
    /// The cashback status of a payment
    Status(PaymentStatus),
    /// Ranked `id(amount)` entries
    Ranking(Vec<String>),
}

impl fmt::Display for OperationOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationOutput::Accepted => f.write_str("true"),
            OperationOutput::Balance(amount) => write!(f, "{}", amount),
            OperationOutput::Payment(payment) => write!(f, "{}", payment),
            OperationOutput::Status(status) => write!(f, "{}", status),
            OperationOutput::Ranking(entries) => f.write_str(&entries.join(", ")),
        }
    }
}

/// Outcome of processing one operation record
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome {
    pub timestamp: Timestamp,
    pub kind: OperationType,
    pub result: Result<OperationOutput, LedgerError>,
}

impl OperationOutcome {
    /// Render the result as a single output field
    ///
    /// Boolean operations render failures as `false`; value operations render
    /// failures as an empty field.
    pub fn render(&self) -> String {
        match &self.result {
            Ok(output) => output.to_string(),
            Err(_) if self.kind.is_boolean() => "false".to_string(),
            Err(_) => String::new(),
        }
    }
}
