// 📋 Metrics Report - every KPI for one snapshot in a single value
//
// Undefined metrics are carried as MetricValue::Undefined with the reason,
// so a display layer never receives NaN.

use crate::entities::{LeadStatus, Region};
use crate::error::MetricError;
use crate::ingest::Snapshot;
use crate::metrics::{self, MetricsEngine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// METRIC VALUE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricValue {
    Value(f64),
    Undefined(String),
}

impl MetricValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            MetricValue::Value(v) => Some(*v),
            MetricValue::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, MetricValue::Value(_))
    }
}

impl From<Result<f64, MetricError>> for MetricValue {
    fn from(result: Result<f64, MetricError>) -> Self {
        match result {
            Ok(v) => MetricValue::Value(v),
            Err(e) => MetricValue::Undefined(e.to_string()),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Value(v) => write!(f, "{:.2}", v),
            MetricValue::Undefined(reason) => write!(f, "n/a ({})", reason),
        }
    }
}

// ============================================================================
// METRIC NAME
// ============================================================================

/// Scalar KPIs a report exposes by name (used by alert rules)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    Cac,
    Clv,
    LeadConversionRate,
    ChurnRate,
    MomGrowth,
    OpenPipeline,
    CompletedRevenue,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Cac => "cac",
            MetricName::Clv => "clv",
            MetricName::LeadConversionRate => "lead_conversion_rate",
            MetricName::ChurnRate => "churn_rate",
            MetricName::MomGrowth => "mom_growth",
            MetricName::OpenPipeline => "open_pipeline",
            MetricName::CompletedRevenue => "completed_revenue",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metric '{0}'")]
pub struct UnknownMetric(pub String);

impl FromStr for MetricName {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            MetricName::Cac,
            MetricName::Clv,
            MetricName::LeadConversionRate,
            MetricName::ChurnRate,
            MetricName::MomGrowth,
            MetricName::OpenPipeline,
            MetricName::CompletedRevenue,
        ]
        .into_iter()
        .find(|name| name.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

// ============================================================================
// METRICS REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Period CAC was computed for, `None` when there is no spend at all
    pub cac_period: Option<String>,
    pub cac: MetricValue,
    pub clv: MetricValue,
    pub lead_conversion_rate: MetricValue,
    pub avg_deal_size_by_region: BTreeMap<Region, f64>,
    pub churn_rate: f64,
    pub mom_growth: MetricValue,
    pub open_pipeline: f64,
    pub completed_revenue: f64,
    /// Latest month's actual minus target, `None` when that month has no target
    pub revenue_vs_target: Option<f64>,
    pub lead_funnel: BTreeMap<LeadStatus, usize>,
    pub spend_by_channel: BTreeMap<String, f64>,
    pub generated_at: DateTime<Utc>,
}

impl MetricsReport {
    /// Scalar value of a named KPI; `None` when undefined
    pub fn get(&self, name: MetricName) -> Option<f64> {
        match name {
            MetricName::Cac => self.cac.value(),
            MetricName::Clv => self.clv.value(),
            MetricName::LeadConversionRate => self.lead_conversion_rate.value(),
            MetricName::ChurnRate => Some(self.churn_rate),
            MetricName::MomGrowth => self.mom_growth.value(),
            MetricName::OpenPipeline => Some(self.open_pipeline),
            MetricName::CompletedRevenue => Some(self.completed_revenue),
        }
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!(
                "CAC ({}): {}",
                self.cac_period.as_deref().unwrap_or("-"),
                self.cac
            ),
            format!("CLV: {}", self.clv),
            format!("Lead conversion: {}%", self.lead_conversion_rate),
            format!("Churn rate: {:.2}%", self.churn_rate),
            format!("MoM growth: {}%", self.mom_growth),
            format!("Open pipeline: ${:.2}", self.open_pipeline),
            format!("Completed revenue: ${:.2}", self.completed_revenue),
        ];

        if let Some(variance) = self.revenue_vs_target {
            lines.push(format!("Revenue vs target (latest month): {:+.2}", variance));
        }

        if !self.avg_deal_size_by_region.is_empty() {
            lines.push("Average deal size by region:".to_string());
            for (region, avg) in &self.avg_deal_size_by_region {
                lines.push(format!("  {:<10} ${:.2}", region.as_str(), avg));
            }
        }

        lines.join("\n")
    }
}

impl MetricsEngine {
    /// Compute every KPI for `snapshot`.
    ///
    /// `acquired` overrides the CAC denominator; when `None` it is derived from
    /// customer join dates in the CAC period. The caller stamps the report with
    /// `generated_at`, so the same inputs always yield the same report.
    pub fn report(
        &self,
        snapshot: &Snapshot,
        acquired: Option<u32>,
        generated_at: DateTime<Utc>,
    ) -> MetricsReport {
        let (cac_period, cac) = match self.acquisition_cost(
            &snapshot.marketing_spend,
            &snapshot.customers,
            acquired,
        ) {
            Some((period, cac)) => (Some(period), MetricValue::from(cac)),
            None => (
                None,
                MetricValue::Undefined("no marketing spend recorded".to_string()),
            ),
        };

        let spend_by_channel = match &cac_period {
            Some(period) => metrics::spend_by_channel(&snapshot.marketing_spend, period),
            None => BTreeMap::new(),
        };

        let report = MetricsReport {
            cac_period,
            cac,
            clv: self.customer_lifetime_value(&snapshot.transactions).into(),
            lead_conversion_rate: metrics::lead_conversion_rate(&snapshot.leads).into(),
            avg_deal_size_by_region: metrics::average_deal_size_by_region(
                &snapshot.transactions,
                &snapshot.customers,
            ),
            churn_rate: metrics::churn_rate(&snapshot.customers),
            mom_growth: metrics::month_over_month_growth(&snapshot.revenue).into(),
            open_pipeline: metrics::open_pipeline(&snapshot.transactions),
            completed_revenue: metrics::completed_revenue(&snapshot.transactions),
            revenue_vs_target: snapshot.revenue.last().and_then(|point| point.variance()),
            lead_funnel: metrics::lead_funnel(&snapshot.leads),
            spend_by_channel,
            generated_at,
        };

        debug!(
            defined = [&report.cac, &report.clv, &report.lead_conversion_rate, &report.mom_growth]
                .iter()
                .filter(|v| v.is_defined())
                .count(),
            "metrics report built"
        );

        report
    }
}
