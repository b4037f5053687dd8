use chrono::NaiveDate;
use kpi_engine::{SortKey, SortState, Transaction, TransactionStatus};
use proptest::prelude::*;

fn transaction_strategy() -> impl Strategy<Value = Transaction> {
    (
        "[A-Z]{3}",
        0u32..5,
        0u32..28,
        prop_oneof![
            Just(TransactionStatus::Completed),
            Just(TransactionStatus::Pending),
            Just(TransactionStatus::Failed),
        ],
    )
        .prop_map(|(name, amount, day, status)| {
            Transaction::new(
                "",
                "CUST",
                name,
                "Standard",
                f64::from(amount) * 100.0,
                status,
                NaiveDate::from_ymd_opt(2025, 9, day + 1).unwrap(),
            )
        })
}

fn records_strategy() -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(transaction_strategy(), 0..40).prop_map(|mut records| {
        for (i, tx) in records.iter_mut().enumerate() {
            tx.id = format!("TXN-{:04}", i);
        }
        records
    })
}

fn key_strategy() -> impl Strategy<Value = SortKey> {
    prop_oneof![
        Just(SortKey::Id),
        Just(SortKey::CustomerName),
        Just(SortKey::Product),
        Just(SortKey::Amount),
        Just(SortKey::Status),
        Just(SortKey::Date),
    ]
}

proptest! {
    #[test]
    fn sorting_never_touches_the_source(
        records in records_strategy(),
        clicks in prop::collection::vec(key_strategy(), 0..6),
    ) {
        let before = records.clone();
        let mut state = SortState::new();
        for key in clicks {
            state.request_sort(key);
            let _ = state.apply(&records);
        }
        prop_assert_eq!(records, before);
    }

    #[test]
    fn sorted_view_is_a_permutation(records in records_strategy(), key in key_strategy()) {
        let mut state = SortState::new();
        state.request_sort(key);

        let mut sorted_ids: Vec<String> =
            state.apply(&records).into_iter().map(|tx| tx.id).collect();
        let mut original_ids: Vec<String> = records.iter().map(|tx| tx.id.clone()).collect();
        sorted_ids.sort();
        original_ids.sort();
        prop_assert_eq!(sorted_ids, original_ids);
    }

    #[test]
    fn equal_amounts_keep_input_order(records in records_strategy(), descending in any::<bool>()) {
        let mut state = SortState::new();
        state.request_sort(SortKey::Amount);
        if descending {
            state.request_sort(SortKey::Amount);
        }

        let view = state.apply_refs(&records);
        for pair in view.windows(2) {
            if pair[0].amount == pair[1].amount {
                // ids encode input position
                prop_assert!(pair[0].id < pair[1].id);
            } else if descending {
                prop_assert!(pair[0].amount > pair[1].amount);
            } else {
                prop_assert!(pair[0].amount < pair[1].amount);
            }
        }
    }
}
