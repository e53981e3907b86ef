//! CSV format handling for operation records and outcome output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to typed operation records
//! - Outcome output serialization
//!
//! All functions are pure (no I/O beyond the supplied writer) for easy testing.
//!
//! # Input Columns
//!
//! `type,timestamp,account,other,value`. The meaning of `other` and `value`
//! depends on the operation:
//!
//! | type | account | other | value |
//! |---|---|---|---|
//! | `create_account` | id | | |
//! | `deposit` | id | | amount |
//! | `transfer` | source | target | amount |
//! | `top_spenders` | | | n |
//! | `pay` | id | | amount |
//! | `get_payment_status` | id | payment id | |
//! | `merge_accounts` | id 1 | id 2 | |
//! | `get_balance` | id | | time_at |

use crate::types::{
    LedgerError, Operation, OperationOutcome, OperationRecord, OperationType, Timestamp,
};
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Only `type` and `timestamp` are required by every row; the other columns
/// are optional because most operations use only some of them.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub op_type: String,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Map an operation name to its type, ignoring case
fn parse_operation_type(raw: &str) -> Option<OperationType> {
    let op_type = match raw.trim().to_lowercase().as_str() {
        "create_account" => OperationType::CreateAccount,
        "deposit" => OperationType::Deposit,
        "transfer" => OperationType::Transfer,
        "top_spenders" => OperationType::TopSpenders,
        "pay" => OperationType::Pay,
        "get_payment_status" => OperationType::GetPaymentStatus,
        "merge_accounts" => OperationType::MergeAccounts,
        "get_balance" => OperationType::GetBalance,
        _ => return None,
    };
    Some(op_type)
}

/// Take a column value, rejecting absent or blank ones
fn required(
    value: Option<String>,
    op_type: OperationType,
    field: &str,
    timestamp: Timestamp,
) -> Result<String, LedgerError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(LedgerError::missing_field(
            op_type.as_str(),
            field,
            timestamp,
        )),
    }
}

/// Take a required column value and parse it as a number
fn required_number<T: FromStr>(
    value: Option<String>,
    op_type: OperationType,
    field: &str,
    timestamp: Timestamp,
) -> Result<T, LedgerError> {
    let raw = required(value, op_type, field, timestamp)?;
    raw.parse()
        .map_err(|_| LedgerError::invalid_field(field, &raw, timestamp))
}

/// Convert a CsvRecord to an OperationRecord
///
/// This function:
/// - Parses the operation type string (case-insensitive)
/// - Checks that every column the operation needs is present and non-blank
/// - Parses amounts, counts and query times as unsigned integers
///
/// Columns the operation does not use are ignored.
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
///
/// # Errors
///
/// Returns an error if:
/// - The operation type is unknown (`InvalidOperationType`)
/// - A required column is empty (`MissingField`)
/// - A numeric column does not parse (`InvalidField`)
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<OperationRecord, LedgerError> {
    let CsvRecord {
        op_type: raw_type,
        timestamp,
        account,
        other,
        value,
    } = csv_record;

    let op_type = parse_operation_type(&raw_type)
        .ok_or_else(|| LedgerError::invalid_operation_type(&raw_type, timestamp))?;

    let operation = match op_type {
        OperationType::CreateAccount => Operation::CreateAccount {
            account: required(account, op_type, "account", timestamp)?,
        },
        OperationType::Deposit => Operation::Deposit {
            account: required(account, op_type, "account", timestamp)?,
            amount: required_number(value, op_type, "value", timestamp)?,
        },
        OperationType::Transfer => Operation::Transfer {
            source: required(account, op_type, "account", timestamp)?,
            target: required(other, op_type, "other", timestamp)?,
            amount: required_number(value, op_type, "value", timestamp)?,
        },
        OperationType::TopSpenders => Operation::TopSpenders {
            n: required_number(value, op_type, "value", timestamp)?,
        },
        OperationType::Pay => Operation::Pay {
            account: required(account, op_type, "account", timestamp)?,
            amount: required_number(value, op_type, "value", timestamp)?,
        },
        OperationType::GetPaymentStatus => Operation::GetPaymentStatus {
            account: required(account, op_type, "account", timestamp)?,
            payment: required(other, op_type, "other", timestamp)?,
        },
        OperationType::MergeAccounts => Operation::MergeAccounts {
            account_1: required(account, op_type, "account", timestamp)?,
            account_2: required(other, op_type, "other", timestamp)?,
        },
        OperationType::GetBalance => Operation::GetBalance {
            account: required(account, op_type, "account", timestamp)?,
            time_at: required_number(value, op_type, "value", timestamp)?,
        },
    };

    Ok(OperationRecord::new(timestamp, operation))
}

/// Write operation outcomes to CSV format
///
/// Writes one row per outcome with columns: timestamp, type, result.
/// Outcomes are written in the order given, which is input order.
///
/// # Arguments
///
/// * `outcomes` - Outcomes to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Errors
///
/// Returns `IoError` if writing or flushing fails.
pub fn write_outcomes_csv(
    outcomes: &[OperationOutcome],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["timestamp", "type", "result"])
        .map_err(|e| LedgerError::IoError {
            message: format!("Failed to write CSV header: {}", e),
        })?;

    for outcome in outcomes {
        writer
            .write_record([
                outcome.timestamp.to_string(),
                outcome.kind.to_string(),
                outcome.render(),
            ])
            .map_err(|e| LedgerError::IoError {
                message: format!("Failed to write outcome record: {}", e),
            })?;
    }

    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OperationOutput, PaymentId};
    use rstest::rstest;

    fn csv_record(
        op_type: &str,
        account: Option<&str>,
        other: Option<&str>,
        value: Option<&str>,
    ) -> CsvRecord {
        CsvRecord {
            op_type: op_type.to_string(),
            timestamp: 7,
            account: account.map(str::to_string),
            other: other.map(str::to_string),
            value: value.map(str::to_string),
        }
    }

    #[rstest]
    #[case::create(
        csv_record("create_account", Some("a"), None, None),
        Operation::CreateAccount { account: "a".to_string() }
    )]
    #[case::deposit(
        csv_record("deposit", Some("a"), None, Some("100")),
        Operation::Deposit { account: "a".to_string(), amount: 100 }
    )]
    #[case::transfer(
        csv_record("transfer", Some("a"), Some("b"), Some("25")),
        Operation::Transfer { source: "a".to_string(), target: "b".to_string(), amount: 25 }
    )]
    #[case::top_spenders(
        csv_record("top_spenders", None, None, Some("3")),
        Operation::TopSpenders { n: 3 }
    )]
    #[case::pay(
        csv_record("pay", Some("a"), None, Some("40")),
        Operation::Pay { account: "a".to_string(), amount: 40 }
    )]
    #[case::payment_status(
        csv_record("get_payment_status", Some("a"), Some("payment1"), None),
        Operation::GetPaymentStatus { account: "a".to_string(), payment: "payment1".to_string() }
    )]
    #[case::merge(
        csv_record("merge_accounts", Some("a"), Some("b"), None),
        Operation::MergeAccounts { account_1: "a".to_string(), account_2: "b".to_string() }
    )]
    #[case::get_balance(
        csv_record("get_balance", Some("a"), None, Some("3")),
        Operation::GetBalance { account: "a".to_string(), time_at: 3 }
    )]
    #[case::case_insensitive(
        csv_record("DEPOSIT", Some("a"), None, Some("1")),
        Operation::Deposit { account: "a".to_string(), amount: 1 }
    )]
    #[case::unused_columns_ignored(
        csv_record("create_account", Some("a"), Some("zzz"), Some("9")),
        Operation::CreateAccount { account: "a".to_string() }
    )]
    fn test_convert_csv_record_valid(#[case] record: CsvRecord, #[case] expected: Operation) {
        let result = convert_csv_record(record).unwrap();
        assert_eq!(result, OperationRecord::new(7, expected));
    }

    #[rstest]
    #[case::invalid_type(
        csv_record("withdraw", Some("a"), None, Some("1")),
        LedgerError::invalid_operation_type("withdraw", 7)
    )]
    #[case::deposit_missing_amount(
        csv_record("deposit", Some("a"), None, None),
        LedgerError::missing_field("deposit", "value", 7)
    )]
    #[case::blank_account(
        csv_record("create_account", Some("  "), None, None),
        LedgerError::missing_field("create_account", "account", 7)
    )]
    #[case::transfer_missing_target(
        csv_record("transfer", Some("a"), None, Some("1")),
        LedgerError::missing_field("transfer", "other", 7)
    )]
    #[case::negative_amount(
        csv_record("pay", Some("a"), None, Some("-5")),
        LedgerError::invalid_field("value", "-5", 7)
    )]
    #[case::fractional_amount(
        csv_record("deposit", Some("a"), None, Some("1.5")),
        LedgerError::invalid_field("value", "1.5", 7)
    )]
    #[case::invalid_count(
        csv_record("top_spenders", None, None, Some("many")),
        LedgerError::invalid_field("value", "many", 7)
    )]
    fn test_convert_csv_record_errors(#[case] record: CsvRecord, #[case] expected: LedgerError) {
        assert_eq!(convert_csv_record(record), Err(expected));
    }

    #[test]
    fn test_write_outcomes_csv() {
        let outcomes = vec![
            OperationOutcome {
                timestamp: 1,
                kind: OperationType::CreateAccount,
                result: Ok(OperationOutput::Accepted),
            },
            OperationOutcome {
                timestamp: 2,
                kind: OperationType::Pay,
                result: Ok(OperationOutput::Payment(PaymentId::new(1))),
            },
            OperationOutcome {
                timestamp: 3,
                kind: OperationType::TopSpenders,
                result: Ok(OperationOutput::Ranking(vec![
                    "a(10)".to_string(),
                    "b(0)".to_string(),
                ])),
            },
            OperationOutcome {
                timestamp: 4,
                kind: OperationType::GetBalance,
                result: Err(LedgerError::account_not_found("x")),
            },
            OperationOutcome {
                timestamp: 5,
                kind: OperationType::MergeAccounts,
                result: Err(LedgerError::self_merge("a")),
            },
        ];

        let mut output = Vec::new();
        write_outcomes_csv(&outcomes, &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "timestamp,type,result\n\
             1,create_account,true\n\
             2,pay,payment1\n\
             3,top_spenders,\"a(10), b(0)\"\n\
             4,get_balance,\n\
             5,merge_accounts,false\n"
        );
    }

    #[test]
    fn test_write_outcomes_csv_empty() {
        let mut output = Vec::new();
        write_outcomes_csv(&[], &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "timestamp,type,result\n");
    }
}
