//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Append order: the log is exactly the sequence of appends
//! - Partitioning: wallet and aggregate buckets cover the log once
//! - Balance arithmetic: Σ(credits, cash in) - Σ(debits, cash out)
//! - Deterministic replay: reopening a store yields identical answers

use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use wallet_ledger::{Error, Ledger, Transaction, TransactionKind};

/// Strategy for generating the four known kinds
fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![
        Just(TransactionKind::Credit),
        Just(TransactionKind::Debit),
        Just(TransactionKind::CashIn),
        Just(TransactionKind::CashOut),
    ]
}

/// Strategy for generating valid transactions over a small key space
fn transaction_strategy() -> impl Strategy<Value = Transaction> {
    (
        kind_strategy(),
        "[1-4]",
        0u64..1_000_000u64,
        "[A-F]{2}",
    )
        .prop_map(|(kind, wallet, amount, aggregate)| {
            Transaction::new(kind, wallet, amount, aggregate)
        })
}

fn ledger_with(transactions: &[Transaction]) -> Ledger {
    let mut ledger = Ledger::in_memory();
    for t in transactions {
        ledger
            .append(t.kind.clone(), t.wallet.clone(), t.amount, t.aggregate.clone())
            .unwrap();
    }
    ledger
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: the log is the append sequence and the buckets partition it
    #[test]
    fn prop_log_preserves_order_and_buckets_partition(
        transactions in prop::collection::vec(transaction_strategy(), 0..60)
    ) {
        let ledger = ledger_with(&transactions);

        prop_assert_eq!(ledger.transactions(), transactions.as_slice());

        let wallets: BTreeSet<_> = transactions.iter().map(|t| t.wallet.clone()).collect();
        let aggregates: BTreeSet<_> = transactions.iter().map(|t| t.aggregate.clone()).collect();
        prop_assert_eq!(ledger.wallet_count(), wallets.len());
        prop_assert_eq!(ledger.aggregate_count(), aggregates.len());

        let mut wallet_total = 0;
        for wallet in &wallets {
            let bucket = ledger.wallet_transactions(wallet.as_str()).unwrap();
            let expected: Vec<&Transaction> =
                transactions.iter().filter(|t| &t.wallet == wallet).collect();
            prop_assert_eq!(&bucket, &expected);
            wallet_total += bucket.len();
        }
        prop_assert_eq!(wallet_total, transactions.len());

        let mut aggregate_total = 0;
        for aggregate in &aggregates {
            let bucket = ledger.aggregate_transactions(aggregate.as_str()).unwrap();
            let expected: Vec<&Transaction> =
                transactions.iter().filter(|t| &t.aggregate == aggregate).collect();
            prop_assert_eq!(&bucket, &expected);
            aggregate_total += bucket.len();
        }
        prop_assert_eq!(aggregate_total, transactions.len());
    }

    /// Property: balance is credits minus debits
    #[test]
    fn prop_balance_is_credits_minus_debits(
        transactions in prop::collection::vec(transaction_strategy(), 1..60)
    ) {
        let ledger = ledger_with(&transactions);

        let mut expected: HashMap<String, i64> = HashMap::new();
        for t in &transactions {
            let entry = expected.entry(t.wallet.as_str().to_string()).or_insert(0);
            match t.kind {
                TransactionKind::Credit | TransactionKind::CashIn => *entry += t.amount as i64,
                _ => *entry -= t.amount as i64,
            }
        }

        for (wallet, balance) in expected {
            prop_assert_eq!(ledger.balance(&wallet).unwrap(), balance);
        }
    }

    /// Property: wallets never appended to are not found
    #[test]
    fn prop_unknown_wallet_not_found(
        transactions in prop::collection::vec(transaction_strategy(), 0..30),
        wallet in "[5-9]{1,3}"
    ) {
        let ledger = ledger_with(&transactions);

        prop_assert!(matches!(ledger.balance(&wallet), Err(Error::NoSuchWallet(_))));
        prop_assert!(matches!(
            ledger.wallet_transactions(&wallet),
            Err(Error::NoSuchWallet(_))
        ));
    }

    /// Property: one unrecognized kind poisons the wallet balance
    #[test]
    fn prop_unrecognized_kind_fails_balance(
        transactions in prop::collection::vec(transaction_strategy(), 0..30),
        position in any::<prop::sample::Index>(),
        kind in "[a-z]{3,8}"
    ) {
        prop_assume!(!TransactionKind::from(kind.as_str()).is_recognized());

        let mut transactions = transactions;
        let bad = Transaction::new(TransactionKind::from(kind.as_str()), "1", 1, "ZZ");
        let at = position.index(transactions.len() + 1);
        transactions.insert(at, bad);

        let ledger = ledger_with(&transactions);
        prop_assert!(
            matches!(ledger.balance("1"), Err(Error::InvalidTransactionKind(ref k)) if *k == kind)
        );
    }

    /// Property: a transfer beyond the balance changes nothing
    #[test]
    fn prop_insufficient_transfer_appends_nothing(
        deposit in 0u64..1_000_000u64,
        excess in 1u64..1_000_000u64
    ) {
        let mut ledger = Ledger::in_memory();
        ledger.deposit("a", deposit).unwrap();
        let before = ledger.transactions().to_vec();

        let result = ledger.transfer("a", "b", deposit + excess);
        prop_assert!(matches!(result, Err(Error::InsufficientFunds { .. })), "unexpected result: {:?}", result);
        prop_assert_eq!(ledger.transactions(), before.as_slice());
    }

    /// Property: a covered transfer appends one debit and one credit under a fresh id
    #[test]
    fn prop_transfer_appends_two_legs(
        deposit in 1u64..1_000_000u64,
        fraction in 0u64..=100u64
    ) {
        let amount = deposit * fraction / 100;
        let mut ledger = Ledger::in_memory();
        let deposit_id = ledger.deposit("a", deposit).unwrap();

        let aggregate = ledger.transfer("a", "b", amount).unwrap();
        prop_assert_ne!(&aggregate, &deposit_id);
        prop_assert_eq!(ledger.len(), 3);

        let legs = ledger.aggregate_transactions(aggregate.as_str()).unwrap();
        prop_assert_eq!(legs.len(), 2);
        prop_assert_eq!(
            legs[0],
            &Transaction::new(TransactionKind::Debit, "a", amount, aggregate.clone())
        );
        prop_assert_eq!(
            legs[1],
            &Transaction::new(TransactionKind::Credit, "b", amount, aggregate.clone())
        );
        prop_assert_eq!(ledger.balance("a").unwrap(), (deposit - amount) as i64);
    }

    /// Property: reopening a persisted ledger answers every query identically
    #[test]
    fn prop_persisted_ledger_replays_identically(
        transactions in prop::collection::vec(transaction_strategy(), 0..40)
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.db.json");

        let mut original = Ledger::open_file(&path, false).unwrap();
        for t in &transactions {
            original
                .append(t.kind.clone(), t.wallet.clone(), t.amount, t.aggregate.clone())
                .unwrap();
        }

        let reopened = Ledger::open_file(&path, false).unwrap();
        prop_assert_eq!(reopened.transactions(), original.transactions());

        for t in &transactions {
            prop_assert_eq!(
                reopened.balance(t.wallet.as_str()).unwrap(),
                original.balance(t.wallet.as_str()).unwrap()
            );
            prop_assert_eq!(
                reopened.wallet_transactions(t.wallet.as_str()).unwrap(),
                original.wallet_transactions(t.wallet.as_str()).unwrap()
            );
            prop_assert_eq!(
                reopened.aggregate_transactions(t.aggregate.as_str()).unwrap(),
                original.aggregate_transactions(t.aggregate.as_str()).unwrap()
            );
        }
    }
}
