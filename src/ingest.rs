// 📥 Ingest boundary - loose external payloads → typed entities
//
// Rows arrive from the data store as CSV exports or JSON arrays where every
// field is effectively a string. Each Raw* record is validated field by field;
// the metrics engine only ever sees the typed entities.

use crate::entities::{
    Customer, CustomerStatus, Lead, LeadStatus, MarketingSpend, Region, RevenuePoint,
    Transaction, TransactionStatus,
};
use crate::error::IngestError;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Date formats accepted from the store and from dashboard exports
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub entity: String,
    /// Record id when present, otherwise the 1-based row number
    pub record: String,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}#{}] {}: {}", self.entity, self.record, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collects field errors for one record
struct FieldCheck {
    entity: &'static str,
    record: String,
    errors: Vec<ValidationError>,
}

impl FieldCheck {
    fn new(entity: &'static str, id: &str, row: usize) -> Self {
        let record = if id.trim().is_empty() {
            row.to_string()
        } else {
            id.trim().to_string()
        };
        FieldCheck {
            entity,
            record,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            entity: self.entity.to_string(),
            record: self.record.clone(),
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn required(&mut self, field: &str, value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            self.fail(field, "Required field is empty");
            None
        } else {
            Some(value.to_string())
        }
    }

    fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        let value = self.required(field, value)?;
        let parsed = DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&value, format).ok());
        if parsed.is_none() {
            self.fail(field, format!("Unrecognized date '{}'", value));
        }
        parsed
    }

    /// Spend period label, normalized to `YYYY-MM` so it sorts chronologically
    /// and lines up with customer join periods
    fn period(&mut self, field: &str, value: &str) -> Option<String> {
        let value = self.required(field, value)?;
        match NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d") {
            Ok(first_day) => Some(first_day.format("%Y-%m").to_string()),
            Err(_) => {
                self.fail(field, format!("Period must be YYYY-MM, got '{}'", value));
                None
            }
        }
    }

    /// Monetary amount: tolerates "$" and thousands separators, must be finite and >= 0
    fn amount(&mut self, field: &str, value: &str) -> Option<f64> {
        let value = self.required(field, value)?;
        let cleaned: String = value.chars().filter(|c| *c != '$' && *c != ',').collect();
        match cleaned.trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount >= 0.0 => Some(amount),
            Ok(amount) => {
                self.fail(field, format!("Amount must be a non-negative number, got {}", amount));
                None
            }
            Err(_) => {
                self.fail(field, format!("Not a number: '{}'", value));
                None
            }
        }
    }

    fn label<T: std::str::FromStr>(&mut self, field: &str, value: &str) -> Option<T>
    where
        T::Err: fmt::Display,
    {
        let value = self.required(field, value)?;
        match value.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.fail(field, e.to_string());
                None
            }
        }
    }

    fn finish<T>(self, entity: Option<T>) -> Result<T, Vec<ValidationError>> {
        match entity {
            Some(entity) if self.errors.is_empty() => Ok(entity),
            _ => Err(self.errors),
        }
    }
}

// ============================================================================
// RAW RECORDS
// ============================================================================

/// A loosely-typed row that validates into a typed entity
pub trait RawRecord: DeserializeOwned {
    type Entity;

    /// File stem inside a snapshot directory ("customers", "transactions", ...)
    const NAME: &'static str;

    fn validate(self, row: usize) -> Result<Self::Entity, Vec<ValidationError>>;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCustomer {
    pub id: String,
    pub name: String,
    pub join_date: String,
    pub status: String,
    pub region: Option<String>,
}

impl RawRecord for RawCustomer {
    type Entity = Customer;
    const NAME: &'static str = "customers";

    fn validate(self, row: usize) -> Result<Customer, Vec<ValidationError>> {
        let mut check = FieldCheck::new("Customer", &self.id, row);

        let id = check.required("id", &self.id);
        let name = check.required("name", &self.name);
        let join_date = check.date("joinDate", &self.join_date);
        let status = check.label::<CustomerStatus>("status", &self.status);
        let region = match self.region.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => check.label::<Region>("region", value),
        };

        let customer = match (id, name, join_date, status) {
            (Some(id), Some(name), Some(join_date), Some(status)) => Some(Customer {
                id,
                name,
                join_date,
                status,
                region,
            }),
            _ => None,
        };
        check.finish(customer)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTransaction {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub product: String,
    pub amount: String,
    pub status: String,
    pub date: String,
}

impl RawRecord for RawTransaction {
    type Entity = Transaction;
    const NAME: &'static str = "transactions";

    fn validate(self, row: usize) -> Result<Transaction, Vec<ValidationError>> {
        let mut check = FieldCheck::new("Transaction", &self.id, row);

        let id = check.required("id", &self.id);
        let customer_id = check.required("customerId", &self.customer_id);
        let amount = check.amount("amount", &self.amount);
        let status = check.label::<TransactionStatus>("status", &self.status);
        let date = check.date("date", &self.date);

        let transaction = match (id, customer_id, amount, status, date) {
            (Some(id), Some(customer_id), Some(amount), Some(status), Some(date)) => {
                Some(Transaction {
                    id,
                    customer_id,
                    customer_name: self.customer_name.trim().to_string(),
                    product: self.product.trim().to_string(),
                    amount,
                    status,
                    date,
                })
            }
            _ => None,
        };
        check.finish(transaction)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLead {
    pub id: String,
    pub source: String,
    pub date: String,
    pub status: String,
}

impl RawRecord for RawLead {
    type Entity = Lead;
    const NAME: &'static str = "leads";

    fn validate(self, row: usize) -> Result<Lead, Vec<ValidationError>> {
        let mut check = FieldCheck::new("Lead", &self.id, row);

        let id = check.required("id", &self.id);
        let date = check.date("date", &self.date);
        let status = check.label::<LeadStatus>("status", &self.status);

        let lead = match (id, date, status) {
            (Some(id), Some(date), Some(status)) => Some(Lead {
                id,
                source: self.source.trim().to_string(),
                date,
                status,
            }),
            _ => None,
        };
        check.finish(lead)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMarketingSpend {
    pub period: String,
    pub channel: String,
    pub amount: String,
}

impl RawRecord for RawMarketingSpend {
    type Entity = MarketingSpend;
    const NAME: &'static str = "marketing_spend";

    fn validate(self, row: usize) -> Result<MarketingSpend, Vec<ValidationError>> {
        let mut check = FieldCheck::new("MarketingSpend", "", row);

        let period = check.period("period", &self.period);
        let channel = check.required("channel", &self.channel);
        let amount = check.amount("amount", &self.amount);

        let spend = match (period, channel, amount) {
            (Some(period), Some(channel), Some(amount)) => Some(MarketingSpend {
                period,
                channel,
                amount,
            }),
            _ => None,
        };
        check.finish(spend)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRevenuePoint {
    pub month: String,
    pub actual: String,
    pub target: String,
}

impl RawRecord for RawRevenuePoint {
    type Entity = RevenuePoint;
    const NAME: &'static str = "revenue";

    fn validate(self, row: usize) -> Result<RevenuePoint, Vec<ValidationError>> {
        let mut check = FieldCheck::new("RevenuePoint", &self.month, row);

        let month = check.required("month", &self.month);
        let actual = check.amount("actual", &self.actual);
        // No target recorded for the month: variance stays undefined
        let target = match self.target.trim() {
            "" => Some(None),
            value => check.amount("target", value).map(Some),
        };

        let point = match (month, actual, target) {
            (Some(month), Some(actual), Some(target)) => Some(RevenuePoint {
                month,
                actual,
                target,
            }),
            _ => None,
        };
        check.finish(point)
    }
}

// ============================================================================
// LOADERS
// ============================================================================

/// Validate every row, reporting all invalid fields at once
pub fn validate_all<R: RawRecord>(rows: Vec<R>) -> Result<Vec<R::Entity>, IngestError> {
    let mut entities = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for (index, raw) in rows.into_iter().enumerate() {
        match raw.validate(index + 1) {
            Ok(entity) => entities.push(entity),
            Err(mut errs) => errors.append(&mut errs),
        }
    }

    if errors.is_empty() {
        Ok(entities)
    } else {
        Err(IngestError::Invalid(errors))
    }
}

pub fn load_csv<R: RawRecord>(path: &Path) -> Result<Vec<R::Entity>, IngestError> {
    let display = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| IngestError::Csv {
            path: display.clone(),
            source,
        })?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<R>() {
        let row = result.map_err(|source| IngestError::Csv {
            path: display.clone(),
            source,
        })?;
        rows.push(row);
    }

    validate_all(rows)
}

/// JSON array of objects as returned by the data store. Scalar values are
/// stringified so numbers and strings validate the same way; nulls are dropped.
pub fn parse_json<R: RawRecord>(
    content: &str,
    origin: &str,
) -> Result<Vec<R::Entity>, IngestError> {
    let json_error = |source| IngestError::Json {
        path: origin.to_string(),
        source,
    };

    let values: Vec<serde_json::Map<String, Value>> =
        serde_json::from_str(content).map_err(json_error)?;

    let mut rows = Vec::with_capacity(values.len());
    for object in values {
        let stringified: serde_json::Map<String, Value> = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, Value::String(s))),
                other => Some((key, Value::String(other.to_string()))),
            })
            .collect();
        rows.push(serde_json::from_value::<R>(Value::Object(stringified)).map_err(json_error)?);
    }

    validate_all(rows)
}

pub fn load_json<R: RawRecord>(path: &Path) -> Result<Vec<R::Entity>, IngestError> {
    let content = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_json::<R>(&content, &path.display().to_string())
}

/// Load `<dir>/<R::NAME>.csv` or `.json`; `None` when neither exists
fn load_entity<R: RawRecord>(dir: &Path) -> Result<Option<Vec<R::Entity>>, IngestError> {
    let csv_path = dir.join(format!("{}.csv", R::NAME));
    if csv_path.exists() {
        return load_csv::<R>(&csv_path).map(Some);
    }

    let json_path = dir.join(format!("{}.json", R::NAME));
    if json_path.exists() {
        return load_json::<R>(&json_path).map(Some);
    }

    Ok(None)
}

fn require_entity<R: RawRecord>(dir: &Path) -> Result<Vec<R::Entity>, IngestError> {
    load_entity::<R>(dir)?.ok_or_else(|| IngestError::Io {
        path: dir.join(format!("{}.{{csv,json}}", R::NAME)).display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "required snapshot file missing"),
    })
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Immutable input collections for one computation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub customers: Vec<Customer>,
    pub transactions: Vec<Transaction>,
    pub leads: Vec<Lead>,
    pub marketing_spend: Vec<MarketingSpend>,
    pub revenue: Vec<RevenuePoint>,
}

impl Snapshot {
    /// Load a snapshot directory. Customers and transactions are required;
    /// leads, marketing spend and revenue default to empty.
    pub fn load_dir(dir: &Path) -> Result<Snapshot, IngestError> {
        let snapshot = Snapshot {
            customers: require_entity::<RawCustomer>(dir)?,
            transactions: require_entity::<RawTransaction>(dir)?,
            leads: load_entity::<RawLead>(dir)?.unwrap_or_default(),
            marketing_spend: load_entity::<RawMarketingSpend>(dir)?.unwrap_or_default(),
            revenue: load_entity::<RawRevenuePoint>(dir)?.unwrap_or_default(),
        };

        info!(
            customers = snapshot.customers.len(),
            transactions = snapshot.transactions.len(),
            leads = snapshot.leads.len(),
            spend_entries = snapshot.marketing_spend.len(),
            revenue_points = snapshot.revenue.len(),
            "snapshot loaded from {}",
            dir.display()
        );

        let orphans = snapshot.orphan_transactions();
        if !orphans.is_empty() {
            warn!(
                count = orphans.len(),
                "transactions reference unknown customers and will be unattributed"
            );
        }

        Ok(snapshot)
    }

    /// Ids of transactions whose customer id doesn't resolve
    pub fn orphan_transactions(&self) -> Vec<&str> {
        let known: HashSet<&str> = self.customers.iter().map(|c| c.id.as_str()).collect();
        self.transactions
            .iter()
            .filter(|tx| !known.contains(tx.customer_id.as_str()))
            .map(|tx| tx.id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_transaction(id: &str, amount: &str, status: &str, date: &str) -> RawTransaction {
        RawTransaction {
            id: id.to_string(),
            customer_id: "CUST-001".to_string(),
            customer_name: "Innovation Labs".to_string(),
            product: "Premium".to_string(),
            amount: amount.to_string(),
            status: status.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn test_valid_transaction() {
        let tx = raw_transaction("TXN-0549", "$4,433", "Completed", "10/1/2025")
            .validate(1)
            .unwrap();

        assert_eq!(tx.amount, 4433.0);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
    }

    #[test]
    fn test_invalid_transaction_reports_every_field() {
        let errors = raw_transaction("TXN-X", "-10", "Refunded", "yesterday")
            .validate(3)
            .unwrap_err();

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["amount", "status", "date"]);
        assert!(errors.iter().all(|e| e.record == "TXN-X"));
        assert_eq!(
            errors[1].to_string(),
            "[Transaction#TXN-X] status: unknown transaction status 'Refunded'"
        );
    }

    #[test]
    fn test_missing_id_uses_row_number() {
        let errors = raw_transaction("", "100", "Pending", "2025-09-30")
            .validate(7)
            .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].record, "7");
        assert_eq!(errors[0].message, "Required field is empty");
    }

    #[test]
    fn test_customer_region_is_optional() {
        let raw = RawCustomer {
            id: "CUST-010".to_string(),
            name: "No Region Co".to_string(),
            join_date: "2025-10-03".to_string(),
            status: "active".to_string(),
            region: Some("  ".to_string()),
        };
        let customer = raw.validate(1).unwrap();
        assert_eq!(customer.region, None);
        assert_eq!(customer.status, CustomerStatus::Active);

        let raw = RawCustomer {
            region: Some("Atlantis".to_string()),
            ..RawCustomer::default()
        };
        let errors = raw.validate(2).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "region"));
    }

    #[test]
    fn test_parse_json_stringifies_numbers() {
        let json = r#"[
            {"period": "2025-10", "channel": "Google Ads", "amount": 5500},
            {"period": "2025-10", "channel": "LinkedIn", "amount": "3200.50"}
        ]"#;

        let spend = parse_json::<RawMarketingSpend>(json, "inline").unwrap();
        assert_eq!(spend.len(), 2);
        assert_eq!(spend[0].amount, 5500.0);
        assert_eq!(spend[1].amount, 3200.5);
    }

    #[test]
    fn test_spend_period_must_be_year_month() {
        let json = r#"[
            {"period": "Sep", "channel": "Google Ads", "amount": 4000},
            {"period": "Oct", "channel": "Google Ads", "amount": 5500}
        ]"#;

        match parse_json::<RawMarketingSpend>(json, "inline") {
            Err(IngestError::Invalid(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().all(|e| e.field == "period"));
                assert_eq!(errors[1].message, "Period must be YYYY-MM, got 'Oct'");
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_spend_period_is_normalized() {
        let raw = RawMarketingSpend {
            period: "2025-9".to_string(),
            channel: "Events".to_string(),
            amount: "1200".to_string(),
        };
        assert_eq!(raw.validate(1).unwrap().period, "2025-09");

        let raw = RawMarketingSpend {
            period: "2025-13".to_string(),
            channel: "Events".to_string(),
            amount: "1200".to_string(),
        };
        assert!(raw.validate(2).is_err());
    }

    #[test]
    fn test_revenue_target_is_optional() {
        let raw = RawRevenuePoint {
            month: "Jul".to_string(),
            actual: "130000".to_string(),
            target: String::new(),
        };
        let point = raw.validate(1).unwrap();
        assert_eq!(point.target, None);
        assert_eq!(point.variance(), None);

        let raw = RawRevenuePoint {
            month: "Aug".to_string(),
            actual: "130000".to_string(),
            target: "125000".to_string(),
        };
        let point = raw.validate(2).unwrap();
        assert_eq!(point.target, Some(125_000.0));
        assert_eq!(point.variance(), Some(5_000.0));

        let raw = RawRevenuePoint {
            month: "Sep".to_string(),
            actual: "130000".to_string(),
            target: "lots".to_string(),
        };
        let errors = raw.validate(3).unwrap_err();
        assert_eq!(errors[0].field, "target");
    }

    #[test]
    fn test_parse_json_null_is_missing() {
        let json = r#"[{"id": "LEAD-001", "source": null, "date": "2025-10-01", "status": "New"}]"#;
        let leads = parse_json::<RawLead>(json, "inline").unwrap();
        assert_eq!(leads[0].source, "");
    }

    #[test]
    fn test_validate_all_collects_errors() {
        let rows = vec![
            raw_transaction("TXN-1", "100", "Completed", "2025-09-01"),
            raw_transaction("TXN-2", "abc", "Completed", "2025-09-02"),
            raw_transaction("TXN-3", "100", "Lost", "2025-09-03"),
        ];

        match validate_all(rows) {
            Err(IngestError::Invalid(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].record, "TXN-2");
                assert_eq!(errors[1].record, "TXN-3");
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_orphan_transactions() {
        let snapshot = Snapshot {
            customers: vec![RawCustomer {
                id: "CUST-001".to_string(),
                name: "Innovation Labs".to_string(),
                join_date: "2025-01-15".to_string(),
                status: "Active".to_string(),
                region: Some("Americas".to_string()),
            }
            .validate(1)
            .unwrap()],
            transactions: vec![
                raw_transaction("TXN-1", "100", "Completed", "2025-09-01").validate(1).unwrap(),
                RawTransaction {
                    customer_id: "CUST-404".to_string(),
                    ..raw_transaction("TXN-2", "100", "Completed", "2025-09-01")
                }
                .validate(2)
                .unwrap(),
            ],
            ..Snapshot::default()
        };

        assert_eq!(snapshot.orphan_transactions(), vec!["TXN-2"]);
    }
}
