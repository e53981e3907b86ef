//! Error types for the temporal ledger
//!
//! This module defines all error types that can occur while reading operations
//! and applying them to the ledger.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Malformed CSV, unknown operation types, missing fields
//! - **Ledger Errors**: Unknown or merged accounts, insufficient funds, unknown payments
//! - **Arithmetic Errors**: Overflow in balance or schedule calculations

use super::operation::{Amount, Timestamp};
use thiserror::Error;

/// Main error type for the ledger
///
/// Every expected failure of a ledger operation is reported through this
/// enum; none of them panic. At the outer boundary a failed operation is
/// rendered as `false` or an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped
    /// and processing continues with the next record.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Unknown operation type encountered in the input
    #[error("Invalid operation type '{op_type}' at timestamp {timestamp}")]
    InvalidOperationType { op_type: String, timestamp: Timestamp },

    /// A field required by the operation is missing or empty
    #[error("{op_type} at timestamp {timestamp} requires a '{field}' value")]
    MissingField {
        op_type: String,
        field: String,
        timestamp: Timestamp,
    },

    /// A field is present but cannot be parsed
    #[error("Invalid {field} '{value}' at timestamp {timestamp}")]
    InvalidField {
        field: String,
        value: String,
        timestamp: Timestamp,
    },

    /// `create_account` for an id that names a live account
    #[error("Account {account} already exists")]
    AccountExists { account: String },

    /// The id never named an account, or names nothing live
    #[error("Account {account} not found")]
    AccountNotFound { account: String },

    /// The id was merged into another account
    ///
    /// Distinguishes "existed, then merged" from "never existed".
    #[error("Account {account} was merged into another account")]
    AccountMerged { account: String },

    /// Transfer whose source and target resolve to the same account
    #[error("Cannot transfer from account {account} to itself")]
    SelfTransfer { account: String },

    /// Debit larger than the current balance
    #[error("Insufficient funds for account {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        account: String,
        available: Amount,
        requested: Amount,
    },

    /// The payment id is unknown or is not owned by the account
    #[error("Payment {payment} not found for account {account}")]
    PaymentNotFound { account: String, payment: String },

    /// Merge whose two ids resolve to the same account
    #[error("Cannot merge account {account} into itself")]
    SelfMerge { account: String },

    /// The account did not exist at the queried time
    #[error("Account {account} has no balance at time {time_at}")]
    NoBalanceAt { account: String, time_at: Timestamp },

    /// Arithmetic overflow would occur
    ///
    /// The operation is rejected to maintain account integrity.
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow { operation: String, account: String },

    /// A record arrived with a timestamp lower than one already processed
    #[error("Timestamp {timestamp} precedes last processed timestamp {last}")]
    TimestampRegression { timestamp: Timestamp, last: Timestamp },

    /// The async runtime or one of its tasks failed
    #[error("Runtime error: {message}")]
    Runtime { message: String },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    pub fn account_exists(account: &str) -> Self {
        LedgerError::AccountExists {
            account: account.to_string(),
        }
    }

    pub fn account_not_found(account: &str) -> Self {
        LedgerError::AccountNotFound {
            account: account.to_string(),
        }
    }

    pub fn account_merged(account: &str) -> Self {
        LedgerError::AccountMerged {
            account: account.to_string(),
        }
    }

    pub fn self_transfer(account: &str) -> Self {
        LedgerError::SelfTransfer {
            account: account.to_string(),
        }
    }

    pub fn insufficient_funds(account: &str, available: Amount, requested: Amount) -> Self {
        LedgerError::InsufficientFunds {
            account: account.to_string(),
            available,
            requested,
        }
    }

    pub fn payment_not_found(account: &str, payment: &str) -> Self {
        LedgerError::PaymentNotFound {
            account: account.to_string(),
            payment: payment.to_string(),
        }
    }

    pub fn self_merge(account: &str) -> Self {
        LedgerError::SelfMerge {
            account: account.to_string(),
        }
    }

    pub fn no_balance_at(account: &str, time_at: Timestamp) -> Self {
        LedgerError::NoBalanceAt {
            account: account.to_string(),
            time_at,
        }
    }

    pub fn arithmetic_overflow(operation: &str, account: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account: account.to_string(),
        }
    }

    pub fn timestamp_regression(timestamp: Timestamp, last: Timestamp) -> Self {
        LedgerError::TimestampRegression { timestamp, last }
    }

    pub fn invalid_operation_type(op_type: &str, timestamp: Timestamp) -> Self {
        LedgerError::InvalidOperationType {
            op_type: op_type.to_string(),
            timestamp,
        }
    }

    pub fn missing_field(op_type: &str, field: &str, timestamp: Timestamp) -> Self {
        LedgerError::MissingField {
            op_type: op_type.to_string(),
            field: field.to_string(),
            timestamp,
        }
    }

    pub fn invalid_field(field: &str, value: &str, timestamp: Timestamp) -> Self {
        LedgerError::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
            timestamp,
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        LedgerError::Runtime {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::file_not_found(
        LedgerError::FileNotFound { path: "ops.csv".to_string() },
        "File not found: ops.csv"
    )]
    #[case::io_error(
        LedgerError::IoError { message: "Permission denied".to_string() },
        "I/O error: Permission denied"
    )]
    #[case::parse_error_with_line(
        LedgerError::ParseError { line: Some(42), message: "Invalid field".to_string() },
        "CSV parse error at line 42: Invalid field"
    )]
    #[case::parse_error_without_line(
        LedgerError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    #[case::invalid_operation_type(
        LedgerError::invalid_operation_type("withdraw", 7),
        "Invalid operation type 'withdraw' at timestamp 7"
    )]
    #[case::missing_field(
        LedgerError::missing_field("deposit", "value", 3),
        "deposit at timestamp 3 requires a 'value' value"
    )]
    #[case::insufficient_funds(
        LedgerError::insufficient_funds("a", 50, 100),
        "Insufficient funds for account a: available 50, requested 100"
    )]
    #[case::account_merged(
        LedgerError::account_merged("b"),
        "Account b was merged into another account"
    )]
    #[case::payment_not_found(
        LedgerError::payment_not_found("a", "payment9"),
        "Payment payment9 not found for account a"
    )]
    #[case::no_balance_at(
        LedgerError::no_balance_at("a", 0),
        "Account a has no balance at time 0"
    )]
    #[case::timestamp_regression(
        LedgerError::timestamp_regression(4, 9),
        "Timestamp 4 precedes last processed timestamp 9"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::account_exists(
        LedgerError::account_exists("a"),
        LedgerError::AccountExists { account: "a".to_string() }
    )]
    #[case::self_transfer(
        LedgerError::self_transfer("a"),
        LedgerError::SelfTransfer { account: "a".to_string() }
    )]
    #[case::self_merge(
        LedgerError::self_merge("a"),
        LedgerError::SelfMerge { account: "a".to_string() }
    )]
    #[case::arithmetic_overflow(
        LedgerError::arithmetic_overflow("deposit", "a"),
        LedgerError::ArithmeticOverflow { operation: "deposit".to_string(), account: "a".to_string() }
    )]
    fn test_helper_functions(#[case] result: LedgerError, #[case] expected: LedgerError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
