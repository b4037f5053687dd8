// KPI Engine - Core Library
// Derived sales/marketing/retention metrics and the sortable transaction view

pub mod alerts;
pub mod config;
pub mod entities;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod report;
pub mod sorting;

// Re-export commonly used types
pub use alerts::{AlertEngine, AlertRule, Condition, KpiAlert, Severity};
pub use config::MetricsConfig;
pub use entities::{
    Customer, CustomerStatus, Lead, LeadStatus, MarketingSpend, ParseLabelError, Region,
    RevenuePoint, Transaction, TransactionStatus,
};
pub use error::{IngestError, MetricError};
pub use ingest::{load_csv, load_json, parse_json, RawRecord, Snapshot, ValidationError};
pub use metrics::{
    average_deal_size_by_region, churn_rate, completed_revenue, customer_acquisition_cost,
    customers_acquired_in_period, lead_conversion_rate, lead_funnel, marketing_spend_for_period,
    month_over_month_growth, open_pipeline, spend_by_channel, MetricsEngine, MOM_GROWTH_SENTINEL,
};
pub use report::{MetricName, MetricValue, MetricsReport, UnknownMetric};
pub use sorting::{SortDirection, SortKey, SortState, SortValue, Sortable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
