use crate::ingest::ValidationError;
use thiserror::Error;

/// Undefined-aggregate conditions: a metric's denominator or sample set is empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("no customers acquired in period '{period}', acquisition cost is undefined")]
    NoAcquisitions { period: String },

    #[error("no completed transactions, lifetime value is undefined")]
    NoCompletedTransactions,

    #[error("no leads tracked, conversion rate is undefined")]
    NoLeads,

    #[error("growth needs at least {needed} periods, got {got}")]
    InsufficientHistory { needed: usize, got: usize },
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "{} invalid record(s), first: {}",
        .0.len(),
        .0.first().map(|e| e.to_string()).unwrap_or_default()
    )]
    Invalid(Vec<ValidationError>),
}
