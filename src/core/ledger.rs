//! Temporal ledger
//!
//! This module provides the `Ledger` that exposes every public operation and
//! orchestrates the account directory, balance history, cashback scheduler,
//! merge resolver and spend tracker.
//!
//! Every operation follows the same shape:
//! - settle cashback that is due at the operation's time
//! - resolve account ids through merge aliases
//! - validate existence and funds
//! - mutate balances, then append history samples and spend totals
//!
//! A failed operation leaves the ledger unchanged apart from the cashback
//! settlement that preceded it.

use crate::core::account_directory::AccountDirectory;
use crate::core::balance_history::BalanceHistory;
use crate::core::cashback_scheduler::CashbackScheduler;
use crate::core::merge_resolver::MergeResolver;
use crate::core::spend_tracker::SpendTracker;
use crate::types::{
    Account, AccountId, Amount, LedgerError, Operation, OperationOutcome, OperationOutput,
    OperationRecord, Payment, PaymentId, PaymentSequence, PaymentStatus, Timestamp,
};
use tracing::debug;

/// Cashback paid on every payment, in percent of the amount (floored)
pub const CASHBACK_PERCENT: Amount = 2;

/// Delay between a payment and its cashback, in timestamp units
pub const CASHBACK_DELAY: Timestamp = 86_400_000;

/// Cashback due for a payment of `amount`
///
/// Computes `amount * CASHBACK_PERCENT / 100` without overflowing the
/// intermediate product.
pub fn cashback_for(amount: Amount) -> Amount {
    amount / 100 * CASHBACK_PERCENT + amount % 100 * CASHBACK_PERCENT / 100
}

/// In-memory banking ledger with point-in-time balance queries
///
/// Single writer: every operation takes `&mut self`, including queries,
/// since they settle due cashback first.
#[derive(Debug, Default)]
pub struct Ledger {
    directory: AccountDirectory,
    history: BalanceHistory,
    scheduler: CashbackScheduler,
    resolver: MergeResolver,
    spend: SpendTracker,
    payments: PaymentSequence,

    /// Highest timestamp seen by [`Ledger::process`]
    last_timestamp: Option<Timestamp>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Ledger {
            directory: AccountDirectory::new(),
            history: BalanceHistory::new(),
            scheduler: CashbackScheduler::new(),
            resolver: MergeResolver::new(),
            spend: SpendTracker::new(),
            payments: PaymentSequence::default(),
            last_timestamp: None,
        }
    }

    /// Apply one operation record
    ///
    /// Routes the record to the matching operation and wraps the result
    /// together with the record's timestamp and operation type.
    ///
    /// # Errors
    ///
    /// The outcome carries `TimestampRegression` without touching any state if
    /// the record's timestamp is lower than one already processed. Any other
    /// error comes from the operation itself.
    pub fn process(&mut self, record: OperationRecord) -> OperationOutcome {
        let OperationRecord {
            timestamp,
            operation,
        } = record;
        let kind = operation.kind();

        let result = match self.last_timestamp {
            Some(last) if timestamp < last => {
                Err(LedgerError::timestamp_regression(timestamp, last))
            }
            _ => {
                self.last_timestamp = Some(timestamp);
                self.apply(timestamp, operation)
            }
        };

        if let Err(e) = &result {
            debug!(%kind, timestamp, error = %e, "operation rejected");
        }

        OperationOutcome {
            timestamp,
            kind,
            result,
        }
    }

    fn apply(
        &mut self,
        timestamp: Timestamp,
        operation: Operation,
    ) -> Result<OperationOutput, LedgerError> {
        match operation {
            Operation::CreateAccount { account } => self
                .create_account(timestamp, &account)
                .map(|()| OperationOutput::Accepted),
            Operation::Deposit { account, amount } => self
                .deposit(timestamp, &account, amount)
                .map(OperationOutput::Balance),
            Operation::Transfer {
                source,
                target,
                amount,
            } => self
                .transfer(timestamp, &source, &target, amount)
                .map(OperationOutput::Balance),
            Operation::TopSpenders { n } => {
                Ok(OperationOutput::Ranking(self.top_spenders(timestamp, n)))
            }
            Operation::Pay { account, amount } => self
                .pay(timestamp, &account, amount)
                .map(OperationOutput::Payment),
            Operation::GetPaymentStatus { account, payment } => self
                .get_payment_status(timestamp, &account, &payment)
                .map(OperationOutput::Status),
            Operation::MergeAccounts {
                account_1,
                account_2,
            } => self
                .merge_accounts(timestamp, &account_1, &account_2)
                .map(|()| OperationOutput::Accepted),
            Operation::GetBalance { account, time_at } => self
                .get_balance(timestamp, &account, time_at)
                .map(OperationOutput::Balance),
        }
    }

    /// Register a new account with a zero balance
    ///
    /// An id that was merged away may be created again. The new account
    /// starts with a fresh history and spend total, and queries for the id
    /// no longer see anything from before the re-creation.
    ///
    /// # Errors
    ///
    /// Returns `AccountExists` if `account` names a live account.
    pub fn create_account(&mut self, timestamp: Timestamp, account: &str) -> Result<(), LedgerError> {
        self.directory.create(account, timestamp)?;

        self.resolver.forget(account);
        self.spend.reset(account);
        self.history.start(account, timestamp);

        Ok(())
    }

    /// Credit `amount` to `account`
    ///
    /// # Returns
    ///
    /// The balance after the deposit
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The id was merged away (`AccountMerged`)
    /// - The id does not name an account (`AccountNotFound`)
    /// - The balance would overflow
    pub fn deposit(
        &mut self,
        timestamp: Timestamp,
        account: &str,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        self.settle_cashback(timestamp);
        let id = self.live_id(account)?;

        let balance = self.directory.credit(&id, amount)?;
        self.history.append(&id, timestamp, balance);

        Ok(balance)
    }

    /// Move `amount` from `source` to `target`
    ///
    /// The amount counts toward `source`'s outgoing total.
    ///
    /// # Returns
    ///
    /// The source balance after the transfer
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either id was merged away or does not name an account
    /// - Both ids resolve to the same account
    /// - The source balance is lower than `amount`
    /// - The target balance would overflow
    pub fn transfer(
        &mut self,
        timestamp: Timestamp,
        source: &str,
        target: &str,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        self.settle_cashback(timestamp);
        let source_id = self.live_id(source)?;
        let target_id = self.live_id(target)?;

        if source_id == target_id {
            return Err(LedgerError::self_transfer(&source_id));
        }

        // Check the credit side before debiting so a failure changes nothing
        self.directory
            .balance(&target_id)?
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", &target_id))?;

        let source_balance = self.directory.debit(&source_id, amount)?;
        let target_balance = self.directory.credit(&target_id, amount)?;

        self.history.append(&source_id, timestamp, source_balance);
        self.history.append(&target_id, timestamp, target_balance);
        self.spend.add(&source_id, amount);

        Ok(source_balance)
    }

    /// Rank live accounts by outgoing total
    ///
    /// Highest total first, ties by ascending id, at most `n` entries of the
    /// form `id(total)`. Accounts that never spent are ranked with zero.
    pub fn top_spenders(&self, _timestamp: Timestamp, n: usize) -> Vec<String> {
        self.spend.top(self.directory.get_all_accounts(), n)
    }

    /// Debit `amount` from `account` as a payment and schedule its cashback
    ///
    /// The cashback of [`cashback_for`]`(amount)` is credited to whoever owns
    /// the payment once an operation at or after `timestamp + CASHBACK_DELAY`
    /// runs.
    ///
    /// # Returns
    ///
    /// The id of the new payment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The id was merged away or does not name an account
    /// - The balance is lower than `amount`
    /// - The cashback due time would overflow
    pub fn pay(
        &mut self,
        timestamp: Timestamp,
        account: &str,
        amount: Amount,
    ) -> Result<PaymentId, LedgerError> {
        self.settle_cashback(timestamp);
        let id = self.live_id(account)?;

        let cashback_at = timestamp
            .checked_add(CASHBACK_DELAY)
            .ok_or_else(|| LedgerError::arithmetic_overflow("pay", &id))?;

        let balance = self.directory.debit(&id, amount)?;
        self.history.append(&id, timestamp, balance);
        self.spend.add(&id, amount);

        let payment_id = self.payments.next_id();
        self.scheduler.schedule(Payment {
            id: payment_id,
            owner: id,
            amount,
            cashback: cashback_for(amount),
            cashback_at,
            refunded: false,
        });

        Ok(payment_id)
    }

    /// Cashback status of `payment`, which must belong to `account`
    ///
    /// Payments of accounts merged into `account` belong to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the id was merged away, does not name an account,
    /// or does not own the payment.
    pub fn get_payment_status(
        &mut self,
        timestamp: Timestamp,
        account: &str,
        payment: &str,
    ) -> Result<PaymentStatus, LedgerError> {
        self.settle_cashback(timestamp);
        let id = self.live_id(account)?;

        self.scheduler.status(&id, payment)
    }

    /// Fold `account_2` into `account_1`
    ///
    /// Both ids are resolved first. The survivor takes over the merged
    /// account's balance, outgoing total, payments and history; the merged id
    /// becomes an alias of the survivor.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Both ids resolve to the same account (`SelfMerge`)
    /// - Either resolved id is not live (`AccountNotFound`)
    /// - The combined balance would overflow
    pub fn merge_accounts(
        &mut self,
        timestamp: Timestamp,
        account_1: &str,
        account_2: &str,
    ) -> Result<(), LedgerError> {
        self.settle_cashback(timestamp);

        let survivor = self.resolver.resolve(account_1);
        let merged = self.resolver.resolve(account_2);

        if survivor == merged {
            return Err(LedgerError::self_merge(&survivor));
        }

        let survivor_balance = self.directory.balance(&survivor)?;
        let merged_balance = self.directory.balance(&merged)?;
        let combined = survivor_balance
            .checked_add(merged_balance)
            .ok_or_else(|| LedgerError::arithmetic_overflow("merge", &survivor))?;

        let survivor_snapshot = self.history.snapshot(&survivor);
        let merged_snapshot = self.history.snapshot(&merged);
        self.resolver.merge(
            timestamp,
            &survivor,
            &merged,
            survivor_snapshot,
            merged_snapshot,
        );

        self.directory.remove(&merged)?;
        self.directory.credit(&survivor, merged_balance)?;
        self.spend.absorb(&survivor, &merged);
        self.scheduler.transfer_ownership(&merged, &survivor);
        self.history.merge(&survivor, &merged);
        self.history.append(&survivor, timestamp, combined);

        debug!(
            survivor = %survivor,
            merged = %merged,
            balance = combined,
            timestamp,
            "accounts merged"
        );

        Ok(())
    }

    /// Balance of `account` as of `time_at`
    ///
    /// Cashback due at or before `time_at` is settled first.
    ///
    /// For an id that was merged away, times before the merge are answered
    /// from that id's own history; later times fail. For a live account, times
    /// before a merge it absorbed are answered from its own history as it was
    /// just before that merge, so balances of the absorbed account only show
    /// up from the merge onward.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The id was merged away at or before `time_at` (`AccountMerged`)
    /// - The id does not name an account (`AccountNotFound`)
    /// - The account did not exist yet at `time_at` (`NoBalanceAt`)
    pub fn get_balance(
        &mut self,
        _timestamp: Timestamp,
        account: &str,
        time_at: Timestamp,
    ) -> Result<Amount, LedgerError> {
        self.settle_cashback(time_at);

        if let Some(record) = self.resolver.merge_record(account) {
            if time_at >= record.merged_at {
                return Err(LedgerError::account_merged(account));
            }
            return self
                .resolver
                .history_for(account, time_at, &record.history)
                .balance_at(time_at)
                .ok_or_else(|| LedgerError::no_balance_at(account, time_at));
        }

        let id = self.resolver.resolve(account);
        let created_at = self.directory.created_at(&id)?;
        if time_at < created_at {
            return Err(LedgerError::no_balance_at(account, time_at));
        }

        let current = self
            .history
            .get(&id)
            .ok_or_else(|| LedgerError::no_balance_at(account, time_at))?;
        self.resolver
            .history_for(&id, time_at, current)
            .balance_at(time_at)
            .ok_or_else(|| LedgerError::no_balance_at(account, time_at))
    }

    /// Get a live account
    pub fn account(&self, id: &str) -> Option<&Account> {
        self.directory.get(id)
    }

    /// Get all live accounts sorted by id
    pub fn accounts(&self) -> Vec<&Account> {
        self.directory.get_all_accounts()
    }

    /// Number of cashbacks scheduled but not yet credited
    pub fn pending_cashbacks(&self) -> usize {
        self.scheduler.pending_count()
    }

    fn settle_cashback(&mut self, timestamp: Timestamp) {
        self.scheduler
            .settle_up_to(timestamp, &mut self.directory, &mut self.history);
    }

    /// Resolve `account` to the live account it names
    ///
    /// An id that was merged away is rejected rather than followed.
    fn live_id(&mut self, account: &str) -> Result<AccountId, LedgerError> {
        if self.resolver.is_dangling(account, &self.directory) {
            return Err(LedgerError::account_merged(account));
        }

        let id = self.resolver.resolve(account);
        if !self.directory.exists(&id) {
            return Err(LedgerError::account_not_found(account));
        }
        Ok(id)
    }
}
