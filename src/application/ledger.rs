use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDateTime;

use crate::domain::{Cents, Transaction, TransactionKind};
use crate::io::Exporter;

use super::LedgerError;

/// Ordered, append-only store of transactions.
/// This is the primary interface for any driver (CLI session, tests, etc.).
///
/// The ledger is `Send + Sync`: share it behind an `Arc` when several threads
/// record. Readers always see a whole snapshot, never a half-finished append.
#[derive(Debug, Default)]
pub struct Ledger {
    transactions: RwLock<Vec<Transaction>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Recording
    // ========================

    /// Append a transaction to the end of the ledger.
    pub fn record(&self, transaction: Transaction) {
        tracing::info!(
            kind = transaction.kind().as_str(),
            amount_cents = transaction.amount(),
            "{}",
            transaction
        );
        self.write().push(transaction);
    }

    /// Record a deposit of `amount` at `timestamp`.
    pub fn record_deposit(
        &self,
        amount: Cents,
        timestamp: NaiveDateTime,
    ) -> Result<Transaction, LedgerError> {
        self.record_kind(TransactionKind::Deposit, amount, timestamp)
    }

    /// Record a withdrawal of `amount` at `timestamp`.
    pub fn record_withdrawal(
        &self,
        amount: Cents,
        timestamp: NaiveDateTime,
    ) -> Result<Transaction, LedgerError> {
        self.record_kind(TransactionKind::Withdrawal, amount, timestamp)
    }

    fn record_kind(
        &self,
        kind: TransactionKind,
        amount: Cents,
        timestamp: NaiveDateTime,
    ) -> Result<Transaction, LedgerError> {
        let transaction = Transaction::new(timestamp, amount, kind)?;
        self.record(transaction.clone());
        Ok(transaction)
    }

    // ========================
    // Reading
    // ========================

    /// Snapshot of every recorded transaction, in recording order.
    pub fn list(&self) -> Vec<Transaction> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // ========================
    // Export
    // ========================

    /// Write the ledger to `path` as a text log, one formatted transaction per line.
    /// Existing content at `path` is replaced. Returns the number of lines written.
    ///
    /// If `path` cannot be opened nothing is written and an existing file is left as is.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<usize, LedgerError> {
        Exporter::new(self).export_text_file(path.as_ref())
    }

    /// Write a JSON snapshot of the ledger to `path`.
    /// Same open and truncation behavior as [`Ledger::export_to`].
    pub fn export_json_to(&self, path: impl AsRef<Path>) -> Result<usize, LedgerError> {
        Exporter::new(self).export_json_file(path.as_ref())
    }

    // A panic while holding the lock cannot leave the Vec half-pushed,
    // so poisoned guards are safe to reuse.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Transaction>> {
        self.transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Transaction>> {
        self.transactions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Ledger {
    fn drop(&mut self) {
        let count = self
            .transactions
            .get_mut()
            .map(|txs| txs.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len());
        tracing::debug!(count, "releasing ledger");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::NaiveDate;

    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
        assert!(ledger.list().is_empty());
    }

    #[test]
    fn test_record_preserves_order() {
        let ledger = Ledger::new();
        let first = Transaction::deposit(at(10, 0, 0), 10050).unwrap();
        let second = Transaction::withdrawal(at(10, 5, 0), 5000).unwrap();
        let third = Transaction::deposit(at(9, 0, 0), 1).unwrap();

        ledger.record(first.clone());
        ledger.record(second.clone());
        ledger.record(third.clone());

        // Recording order wins over timestamp order
        assert_eq!(ledger.list(), vec![first, second, third]);
        assert_eq!(ledger.len(), 3);
        assert!(!ledger.is_empty());
    }

    #[test]
    fn test_record_deposit_and_withdrawal() {
        let ledger = Ledger::new();

        let deposit = ledger.record_deposit(10050, at(10, 0, 0)).unwrap();
        let withdrawal = ledger.record_withdrawal(5000, at(10, 5, 0)).unwrap();

        assert_eq!(deposit.kind(), TransactionKind::Deposit);
        assert_eq!(withdrawal.kind(), TransactionKind::Withdrawal);
        assert_eq!(ledger.list(), vec![deposit, withdrawal]);
    }

    #[test]
    fn test_negative_amount_leaves_ledger_untouched() {
        let ledger = Ledger::new();
        ledger.record_deposit(100, at(10, 0, 0)).unwrap();

        let result = ledger.record_withdrawal(-100, at(10, 1, 0));

        assert!(matches!(result, Err(LedgerError::InvalidAmount(-100))));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let ledger = Ledger::new();
        ledger.record_deposit(100, at(10, 0, 0)).unwrap();

        let mut snapshot = ledger.list();
        snapshot.clear();
        ledger.record_deposit(200, at(10, 1, 0)).unwrap();

        assert_eq!(ledger.len(), 2);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_list_is_idempotent() {
        let ledger = Ledger::new();
        ledger.record_deposit(100, at(10, 0, 0)).unwrap();
        ledger.record_withdrawal(50, at(10, 1, 0)).unwrap();

        assert_eq!(ledger.list(), ledger.list());
    }

    #[test]
    fn test_concurrent_records_are_all_kept() {
        let ledger = Arc::new(Ledger::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for i in 0..100 {
                        ledger.record_deposit(worker * 1000 + i, at(10, 0, 0)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let transactions = ledger.list();
        assert_eq!(transactions.len(), 800);

        // Each worker's own appends stay in order
        for worker in 0..8 {
            let amounts: Vec<Cents> = transactions
                .iter()
                .map(Transaction::amount)
                .filter(|a| a / 1000 == worker)
                .collect();
            let expected: Vec<Cents> = (0..100).map(|i| worker * 1000 + i).collect();
            assert_eq!(amounts, expected);
        }
    }
}
