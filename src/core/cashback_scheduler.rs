//! Deferred cashback scheduling
//!
//! This module provides the CashbackScheduler component that stores every
//! payment and credits its cashback once the payment's due time is reached.
//!
//! # Lazy Settlement
//!
//! Nothing happens on a timer. Every ledger operation first calls
//! [`CashbackScheduler::settle_up_to`] with its own timestamp, which credits
//! all cashbacks due at or before that time.
//!
//! # Pending Queue
//!
//! Unsettled cashbacks sit in a min-heap keyed by `(due time, payment id)`, so
//! a settlement pass only touches payments that are actually due, and
//! simultaneously due payments settle in payment id order.

use crate::core::account_directory::AccountDirectory;
use crate::core::balance_history::BalanceHistory;
use crate::types::{AccountId, LedgerError, Payment, PaymentId, PaymentStatus, Timestamp};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use tracing::{debug, warn};

/// Payment store and cashback queue
///
/// Payments are never deleted; only their owner changes (on merge) and their
/// refunded flag flips once.
#[derive(Debug, Default)]
pub struct CashbackScheduler {
    /// Map of payment id to stored payment
    payments: HashMap<PaymentId, Payment>,

    /// Payment ids currently owned by each account
    by_owner: HashMap<AccountId, Vec<PaymentId>>,

    /// Unsettled cashbacks, earliest due first
    pending: BinaryHeap<Reverse<(Timestamp, PaymentId)>>,
}

impl CashbackScheduler {
    /// Create a new empty scheduler
    pub fn new() -> Self {
        CashbackScheduler {
            payments: HashMap::new(),
            by_owner: HashMap::new(),
            pending: BinaryHeap::new(),
        }
    }

    /// Register a payment and queue its cashback
    ///
    /// If a payment with the same id is already stored, the new one is ignored.
    pub fn schedule(&mut self, payment: Payment) {
        if self.payments.contains_key(&payment.id) {
            warn!(payment = %payment.id, "payment already scheduled");
            return;
        }

        if !payment.refunded {
            self.pending.push(Reverse((payment.cashback_at, payment.id)));
        }
        self.by_owner
            .entry(payment.owner.clone())
            .or_default()
            .push(payment.id);
        self.payments.insert(payment.id, payment);
    }

    /// Credit every cashback due at or before `timestamp`
    ///
    /// Each credit goes to the payment's current owner and is recorded as a
    /// balance sample at `timestamp`. A cashback that would overflow the balance
    /// stays queued and is retried on the next pass.
    ///
    /// # Returns
    ///
    /// The number of cashbacks credited
    pub fn settle_up_to(
        &mut self,
        timestamp: Timestamp,
        directory: &mut AccountDirectory,
        history: &mut BalanceHistory,
    ) -> usize {
        let mut settled = 0;
        let mut retry = Vec::new();

        while let Some(&Reverse((due, payment_id))) = self.pending.peek() {
            if due > timestamp {
                break;
            }
            self.pending.pop();

            let Some(payment) = self.payments.get_mut(&payment_id) else {
                continue;
            };
            if payment.refunded {
                continue;
            }

            match directory.credit(&payment.owner, payment.cashback) {
                Ok(balance) => {
                    payment.refunded = true;
                    history.append(&payment.owner, timestamp, balance);
                    settled += 1;
                    debug!(
                        payment = %payment_id,
                        account = %payment.owner,
                        cashback = payment.cashback,
                        timestamp,
                        "cashback credited"
                    );
                }
                Err(e @ LedgerError::ArithmeticOverflow { .. }) => {
                    warn!(payment = %payment_id, error = %e, "cashback deferred");
                    retry.push(Reverse((due, payment_id)));
                }
                Err(e) => {
                    warn!(payment = %payment_id, error = %e, "cashback could not be credited");
                }
            }
        }

        self.pending.extend(retry);
        settled
    }

    /// Cashback status of `payment` as seen by `account`
    ///
    /// # Errors
    ///
    /// Returns `PaymentNotFound` if the id is malformed, unknown, or owned by
    /// another account.
    pub fn status(&self, account: &str, payment: &str) -> Result<PaymentStatus, LedgerError> {
        PaymentId::parse(payment)
            .and_then(|id| self.payments.get(&id))
            .filter(|stored| stored.owner == account)
            .map(Payment::status)
            .ok_or_else(|| LedgerError::payment_not_found(account, payment))
    }

    /// Hand every payment owned by `from` over to `to`
    ///
    /// Future cashbacks of those payments credit `to`.
    pub fn transfer_ownership(&mut self, from: &str, to: &str) {
        let Some(moved) = self.by_owner.remove(from) else {
            return;
        };

        for payment_id in &moved {
            if let Some(payment) = self.payments.get_mut(payment_id) {
                payment.owner = to.to_string();
            }
        }
        self.by_owner.entry(to.to_string()).or_default().extend(moved);
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.get(&id)
    }

    /// Number of cashbacks not yet credited
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn payment(sequence: u64, owner: &str, cashback: u64, cashback_at: Timestamp) -> Payment {
        Payment {
            id: PaymentId::new(sequence),
            owner: owner.to_string(),
            amount: cashback * 50,
            cashback,
            cashback_at,
            refunded: false,
        }
    }

    fn setup(accounts: &[&str]) -> (AccountDirectory, BalanceHistory) {
        let mut directory = AccountDirectory::new();
        let mut history = BalanceHistory::new();
        for id in accounts {
            directory.create(id, 1).unwrap();
            history.start(id, 1);
        }
        (directory, history)
    }

    #[test]
    fn test_schedule_and_status() {
        let mut scheduler = CashbackScheduler::new();
        scheduler.schedule(payment(1, "a", 2, 100));

        assert_eq!(scheduler.status("a", "payment1"), Ok(PaymentStatus::InProgress));
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn test_duplicate_payment_first_wins() {
        let mut scheduler = CashbackScheduler::new();
        scheduler.schedule(payment(1, "a", 2, 100));
        scheduler.schedule(payment(1, "b", 9, 5));

        assert_eq!(scheduler.get(PaymentId::new(1)).unwrap().owner, "a");
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[rstest]
    #[case::other_owner("b", "payment1")]
    #[case::unknown_payment("a", "payment2")]
    #[case::malformed("a", "bogus")]
    #[case::leading_zero("a", "payment01")]
    #[case::padded("a", "payment001")]
    fn test_status_rejects_other_owner_and_unknown_ids(
        #[case] account: &str,
        #[case] payment_id: &str,
    ) {
        let mut scheduler = CashbackScheduler::new();
        scheduler.schedule(payment(1, "a", 2, 100));

        assert_eq!(
            scheduler.status(account, payment_id),
            Err(LedgerError::payment_not_found(account, payment_id))
        );
    }

    #[test]
    fn test_settle_before_due_does_nothing() {
        let (mut directory, mut history) = setup(&["a"]);
        let mut scheduler = CashbackScheduler::new();
        scheduler.schedule(payment(1, "a", 2, 100));

        assert_eq!(scheduler.settle_up_to(99, &mut directory, &mut history), 0);
        assert_eq!(directory.balance("a"), Ok(0));
        assert_eq!(scheduler.status("a", "payment1"), Ok(PaymentStatus::InProgress));
    }

    #[test]
    fn test_settle_at_due_credits_and_records_sample() {
        let (mut directory, mut history) = setup(&["a"]);
        let mut scheduler = CashbackScheduler::new();
        scheduler.schedule(payment(1, "a", 2, 100));

        assert_eq!(scheduler.settle_up_to(150, &mut directory, &mut history), 1);
        assert_eq!(directory.balance("a"), Ok(2));
        assert_eq!(history.query("a", 149), Some(0));
        assert_eq!(history.query("a", 150), Some(2));
        assert_eq!(
            scheduler.status("a", "payment1"),
            Ok(PaymentStatus::CashbackReceived)
        );
        assert_eq!(scheduler.pending_count(), 0);

        // A second pass does not credit again
        assert_eq!(scheduler.settle_up_to(200, &mut directory, &mut history), 0);
        assert_eq!(directory.balance("a"), Ok(2));
    }

    #[test]
    fn test_settle_only_due_payments() {
        let (mut directory, mut history) = setup(&["a", "b"]);
        let mut scheduler = CashbackScheduler::new();
        scheduler.schedule(payment(1, "a", 2, 100));
        scheduler.schedule(payment(2, "b", 5, 300));
        scheduler.schedule(payment(3, "a", 7, 200));

        assert_eq!(scheduler.settle_up_to(250, &mut directory, &mut history), 2);
        assert_eq!(directory.balance("a"), Ok(9));
        assert_eq!(directory.balance("b"), Ok(0));
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn test_overflowing_cashback_stays_queued() {
        let (mut directory, mut history) = setup(&["a"]);
        directory.credit("a", u64::MAX - 1).unwrap();
        let mut scheduler = CashbackScheduler::new();
        scheduler.schedule(payment(1, "a", 2, 100));

        assert_eq!(scheduler.settle_up_to(100, &mut directory, &mut history), 0);
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.status("a", "payment1"), Ok(PaymentStatus::InProgress));

        directory.debit("a", 10).unwrap();
        assert_eq!(scheduler.settle_up_to(150, &mut directory, &mut history), 1);
        assert_eq!(directory.balance("a"), Ok(u64::MAX - 9));
        assert_eq!(
            scheduler.status("a", "payment1"),
            Ok(PaymentStatus::CashbackReceived)
        );
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_transfer_ownership_redirects_cashback() {
        let (mut directory, mut history) = setup(&["a", "b"]);
        let mut scheduler = CashbackScheduler::new();
        scheduler.schedule(payment(1, "b", 4, 100));

        scheduler.transfer_ownership("b", "a");
        assert!(scheduler.status("b", "payment1").is_err());
        assert_eq!(scheduler.status("a", "payment1"), Ok(PaymentStatus::InProgress));

        scheduler.settle_up_to(100, &mut directory, &mut history);
        assert_eq!(directory.balance("a"), Ok(4));
        assert_eq!(directory.balance("b"), Ok(0));
    }

    #[test]
    fn test_transfer_ownership_from_account_without_payments() {
        let mut scheduler = CashbackScheduler::new();
        scheduler.schedule(payment(1, "a", 4, 100));

        scheduler.transfer_ownership("z", "a");
        assert_eq!(scheduler.status("a", "payment1"), Ok(PaymentStatus::InProgress));
    }
}
