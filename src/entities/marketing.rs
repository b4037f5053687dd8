// 📣 Marketing spend + revenue series

use serde::{Deserialize, Serialize};

/// One channel's spend for a coarse period (e.g. "2025-10").
/// Several entries may share a period; aggregation sums across channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingSpend {
    pub period: String,
    pub channel: String,
    pub amount: f64,
}

impl MarketingSpend {
    pub fn new(period: impl Into<String>, channel: impl Into<String>, amount: f64) -> Self {
        MarketingSpend {
            period: period.into(),
            channel: channel.into(),
            amount,
        }
    }
}

/// A point of the monthly revenue series, chronologically ordered by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub month: String,
    pub actual: f64,

    /// Planned revenue; months recorded without a plan have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

impl RevenuePoint {
    pub fn new(month: impl Into<String>, actual: f64) -> Self {
        RevenuePoint {
            month: month.into(),
            actual,
            target: None,
        }
    }

    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    /// Actual minus target; positive when the month beat its target.
    /// `None` when the month has no target.
    pub fn variance(&self) -> Option<f64> {
        self.target.map(|target| self.actual - target)
    }
}
