// ↕️ Sortable Collection View
// Column sort state over a fixed record set. The backing slice is never
// reordered; every apply() produces a fresh sequence.

use crate::entities::Transaction;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// SORT KEY / DIRECTION
// ============================================================================

/// Column a transaction table can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    Id,
    CustomerName,
    Product,
    Amount,
    Status,
    Date,
}

impl SortKey {
    pub fn column_name(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::CustomerName => "customerName",
            SortKey::Product => "product",
            SortKey::Amount => "amount",
            SortKey::Status => "status",
            SortKey::Date => "date",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort column '{0}'")]
pub struct UnknownColumn(pub String);

impl FromStr for SortKey {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(SortKey::Id),
            "customer" | "customername" | "customer_name" => Ok(SortKey::CustomerName),
            "product" => Ok(SortKey::Product),
            "amount" => Ok(SortKey::Amount),
            "status" => Ok(SortKey::Status),
            "date" => Ok(SortKey::Date),
            _ => Err(UnknownColumn(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

// ============================================================================
// SORTABLE RECORDS
// ============================================================================

/// Value a record exposes for a sort key, compared by its natural ordering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
    Date(NaiveDate),
}

impl SortValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            // A record type returns one variant per key, so mixed pairs only
            // come from a broken Sortable impl. Release builds treat them as ties.
            _ => {
                debug_assert!(false, "mismatched sort values {:?} vs {:?}", self, other);
                Ordering::Equal
            }
        }
    }
}

/// Anything that can be shown in a sortable table
pub trait Sortable {
    fn sort_value(&self, key: SortKey) -> SortValue<'_>;
}

impl Sortable for Transaction {
    fn sort_value(&self, key: SortKey) -> SortValue<'_> {
        match key {
            SortKey::Id => SortValue::Text(&self.id),
            SortKey::CustomerName => SortValue::Text(&self.customer_name),
            SortKey::Product => SortValue::Text(&self.product),
            SortKey::Amount => SortValue::Number(self.amount),
            SortKey::Status => SortValue::Text(self.status.as_str()),
            SortKey::Date => SortValue::Date(self.date),
        }
    }
}

// ============================================================================
// SORT STATE
// ============================================================================

/// Active sort directive. `None` = no sort applied, input order is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    directive: Option<(SortKey, SortDirection)>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<SortKey> {
        self.directive.map(|(key, _)| key)
    }

    pub fn direction(&self) -> Option<SortDirection> {
        self.directive.map(|(_, direction)| direction)
    }

    /// Column-header activation: same key flips direction, a new key starts ascending
    pub fn request_sort(&mut self, key: SortKey) {
        self.directive = match self.directive {
            Some((active, direction)) if active == key => Some((key, direction.flipped())),
            _ => Some((key, SortDirection::Ascending)),
        };
    }

    /// Drop the directive; subsequent applies keep input order
    pub fn clear(&mut self) {
        self.directive = None;
    }

    /// Ordered references into `records` (stable: ties keep input order)
    pub fn apply_refs<'a, T: Sortable>(&self, records: &'a [T]) -> Vec<&'a T> {
        let mut view: Vec<&T> = records.iter().collect();

        if let Some((key, direction)) = self.directive {
            view.sort_by(|a, b| {
                let ordering = a.sort_value(key).compare(&b.sort_value(key));
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        view
    }

    /// Freshly ordered copy of `records`
    pub fn apply<T: Sortable + Clone>(&self, records: &[T]) -> Vec<T> {
        self.apply_refs(records).into_iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TransactionStatus;

    fn create_test_transaction(id: &str, customer: &str, amount: f64, day: u32) -> Transaction {
        Transaction::new(
            id,
            format!("CUST-{}", id),
            customer,
            "Standard",
            amount,
            TransactionStatus::Completed,
            NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
        )
    }

    fn sample() -> Vec<Transaction> {
        vec![
            create_test_transaction("TXN-0549", "Innovation Labs", 4433.0, 30),
            create_test_transaction("TXN-2081", "TechStart Inc", 2031.0, 29),
            create_test_transaction("TXN-1847", "Global Corp", 8750.0, 28),
            create_test_transaction("TXN-3392", "Digital Agency", 1250.0, 27),
        ]
    }

    fn ids(records: &[Transaction]) -> Vec<&str> {
        records.iter().map(|tx| tx.id.as_str()).collect()
    }

    #[test]
    fn test_no_directive_keeps_input_order() {
        let records = sample();
        let state = SortState::new();

        assert_eq!(state.key(), None);
        assert_eq!(state.apply(&records), records);
    }

    #[test]
    fn test_same_key_toggles_direction() {
        let records = sample();
        let mut state = SortState::new();

        state.request_sort(SortKey::Amount);
        assert_eq!(state.direction(), Some(SortDirection::Ascending));
        assert_eq!(
            ids(&state.apply(&records)),
            vec!["TXN-3392", "TXN-2081", "TXN-0549", "TXN-1847"]
        );

        state.request_sort(SortKey::Amount);
        assert_eq!(state.direction(), Some(SortDirection::Descending));
        assert_eq!(
            ids(&state.apply(&records)),
            vec!["TXN-1847", "TXN-0549", "TXN-2081", "TXN-3392"]
        );

        state.request_sort(SortKey::Amount);
        assert_eq!(state.direction(), Some(SortDirection::Ascending));
    }

    #[test]
    fn test_new_key_resets_to_ascending() {
        let records = sample();
        let mut state = SortState::new();

        state.request_sort(SortKey::Amount);
        state.request_sort(SortKey::Amount);
        state.request_sort(SortKey::CustomerName);

        assert_eq!(state.key(), Some(SortKey::CustomerName));
        assert_eq!(state.direction(), Some(SortDirection::Ascending));
        assert_eq!(
            ids(&state.apply(&records)),
            vec!["TXN-3392", "TXN-1847", "TXN-0549", "TXN-2081"]
        );
    }

    #[test]
    fn test_date_sort_is_chronological() {
        let records = sample();
        let mut state = SortState::new();
        state.request_sort(SortKey::Date);

        let sorted = state.apply(&records);
        assert!(sorted.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_source_is_untouched() {
        let records = sample();
        let before = records.clone();
        let mut state = SortState::new();

        for key in [SortKey::Amount, SortKey::Amount, SortKey::Date, SortKey::Id] {
            state.request_sort(key);
            let _ = state.apply(&records);
        }

        assert_eq!(records, before);
    }

    #[test]
    fn test_sort_is_stable() {
        let records = vec![
            create_test_transaction("TXN-A", "Beta", 500.0, 1),
            create_test_transaction("TXN-B", "Alpha", 100.0, 2),
            create_test_transaction("TXN-C", "Gamma", 500.0, 3),
            create_test_transaction("TXN-D", "Delta", 500.0, 4),
        ];
        let mut state = SortState::new();

        state.request_sort(SortKey::Amount);
        assert_eq!(
            ids(&state.apply(&records)),
            vec!["TXN-B", "TXN-A", "TXN-C", "TXN-D"]
        );

        state.request_sort(SortKey::Amount);
        assert_eq!(
            ids(&state.apply(&records)),
            vec!["TXN-A", "TXN-C", "TXN-D", "TXN-B"]
        );
    }

    #[test]
    fn test_status_sorts_by_label() {
        let mut records = sample();
        records[0].status = TransactionStatus::Pending;
        records[1].status = TransactionStatus::Failed;

        let mut state = SortState::new();
        state.request_sort(SortKey::Status);
        let statuses: Vec<TransactionStatus> =
            state.apply_refs(&records).iter().map(|tx| tx.status).collect();

        assert_eq!(
            statuses,
            vec![
                TransactionStatus::Completed,
                TransactionStatus::Completed,
                TransactionStatus::Failed,
                TransactionStatus::Pending,
            ]
        );
    }

    #[test]
    fn test_clear_restores_input_order() {
        let records = sample();
        let mut state = SortState::new();
        state.request_sort(SortKey::Amount);
        state.clear();

        assert_eq!(state.apply(&records), records);
    }

    /// Returns a different value kind per record for the same key
    #[derive(Debug, Clone)]
    struct MixedKinds(bool);

    impl Sortable for MixedKinds {
        fn sort_value(&self, _key: SortKey) -> SortValue<'_> {
            if self.0 {
                SortValue::Text("a")
            } else {
                SortValue::Number(1.0)
            }
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "mismatched sort values")]
    fn test_mixed_value_kinds_panic_in_debug() {
        let mut state = SortState::new();
        state.request_sort(SortKey::Amount);
        state.apply(&[MixedKinds(true), MixedKinds(false)]);
    }

    #[test]
    fn test_parse_column_names() {
        assert_eq!("customerName".parse::<SortKey>().unwrap(), SortKey::CustomerName);
        assert_eq!("customer".parse::<SortKey>().unwrap(), SortKey::CustomerName);
        assert_eq!("Amount".parse::<SortKey>().unwrap(), SortKey::Amount);
        assert!("price".parse::<SortKey>().is_err());
    }
}
