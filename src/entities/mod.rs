// Entity Models - typed records consumed by the metrics engine
//
// Every entity here is already validated. Loosely-typed payloads from the
// data store go through `crate::ingest` first.

pub mod customer;
pub mod lead;
pub mod marketing;
pub mod transaction;

pub use customer::{Customer, CustomerStatus, Region};
pub use lead::{Lead, LeadStatus};
pub use marketing::{MarketingSpend, RevenuePoint};
pub use transaction::{Transaction, TransactionStatus};

use thiserror::Error;

/// Returned by the `FromStr` impls of the entity enums
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLabelError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        ParseLabelError {
            kind,
            value: value.to_string(),
        }
    }
}

/// Case-insensitive label lookup shared by the enum parsers
pub(crate) fn match_label<T: Copy>(
    kind: &'static str,
    input: &str,
    table: &[(&str, T)],
) -> Result<T, ParseLabelError> {
    let needle = input.trim();
    table
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(needle))
        .map(|(_, value)| *value)
        .ok_or_else(|| ParseLabelError::new(kind, needle))
}
