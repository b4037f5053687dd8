// 👤 Customer Entity
// Lifecycle status + geographic bucket used by churn and regional metrics

use super::{match_label, ParseLabelError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CUSTOMER STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerStatus {
    Active,
    Churned,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "Active",
            CustomerStatus::Churned => "Churned",
        }
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match_label(
            "customer status",
            s,
            &[
                ("Active", CustomerStatus::Active),
                ("Churned", CustomerStatus::Churned),
            ],
        )
    }
}

// ============================================================================
// REGION
// ============================================================================

/// Fixed set of geographic buckets a customer can be tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Pacific,
    Europe,
    Americas,
    Asia,
    Africa,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Pacific,
        Region::Europe,
        Region::Americas,
        Region::Asia,
        Region::Africa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Pacific => "Pacific",
            Region::Europe => "Europe",
            Region::Americas => "Americas",
            Region::Asia => "Asia",
            Region::Africa => "Africa",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let table: Vec<(&str, Region)> = Region::ALL.iter().map(|r| (r.as_str(), *r)).collect();
        match_label("region", s, &table)
    }
}

// ============================================================================
// CUSTOMER ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub join_date: NaiveDate,
    pub status: CustomerStatus,

    /// Untagged customers never contribute to per-region aggregates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

impl Customer {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        join_date: NaiveDate,
        status: CustomerStatus,
    ) -> Self {
        Customer {
            id: id.into(),
            name: name.into(),
            join_date,
            status,
            region: None,
        }
    }

    /// Builder pattern: tag with a region
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn is_churned(&self) -> bool {
        self.status == CustomerStatus::Churned
    }

    /// Period label (`YYYY-MM`) of the month this customer joined
    pub fn join_period(&self) -> String {
        self.join_date.format("%Y-%m").to_string()
    }
}
