//! Payment-related types for the temporal ledger
//!
//! A payment debits an account immediately and schedules a cashback credit
//! for a later time. This module defines the payment record, its public id
//! and status, and the sequence generator that assigns ids.

use super::operation::{AccountId, Amount, Timestamp};
use std::fmt;

/// Prefix of every rendered payment id
const PAYMENT_PREFIX: &str = "payment";

/// Payment identifier
///
/// Rendered as `payment<N>` where `N` comes from a single ledger-wide sequence
/// starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaymentId(u64);

impl PaymentId {
    pub fn new(sequence: u64) -> Self {
        PaymentId(sequence)
    }

    /// The numeric sequence value
    pub fn sequence(&self) -> u64 {
        self.0
    }

    /// Parse a rendered id such as `payment12`
    ///
    /// Returns `None` for anything that was not produced by [`PaymentId`]'s
    /// `Display` implementation.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw.strip_prefix(PAYMENT_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // Display never pads, so a leading zero names no payment
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }
        digits.parse().ok().map(PaymentId)
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PAYMENT_PREFIX, self.0)
    }
}

/// Monotonic payment id generator
///
/// One instance is owned by the ledger and shared by all accounts.
#[derive(Debug, Clone)]
pub struct PaymentSequence {
    next: u64,
}

impl PaymentSequence {
    pub fn new() -> Self {
        PaymentSequence { next: 1 }
    }

    /// Hand out the next id
    pub fn next_id(&mut self) -> PaymentId {
        let id = PaymentId(self.next);
        self.next += 1;
        id
    }
}

impl Default for PaymentSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Cashback status reported by `get_payment_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    /// The cashback is scheduled but not yet credited
    InProgress,
    /// The cashback has been credited to the owning account
    CashbackReceived,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::InProgress => f.write_str("IN_PROGRESS"),
            PaymentStatus::CashbackReceived => f.write_str("CASHBACK_RECEIVED"),
        }
    }
}

/// Stored payment awaiting (or past) its cashback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: PaymentId,

    /// Current owner of the payment
    ///
    /// Starts as the paying account and moves to the surviving account when
    /// the owner is merged away. Cashback is credited to whoever owns the
    /// payment when it becomes due.
    pub owner: AccountId,

    /// Principal debited by the payment
    pub amount: Amount,

    /// Credit applied once `cashback_at` is reached
    pub cashback: Amount,

    /// Earliest timestamp at which the cashback is credited
    pub cashback_at: Timestamp,

    /// Whether the cashback has been credited
    pub refunded: bool,
}

impl Payment {
    pub fn status(&self) -> PaymentStatus {
        if self.refunded {
            PaymentStatus::CashbackReceived
        } else {
            PaymentStatus::InProgress
        }
    }
}
