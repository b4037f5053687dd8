// 📊 Metrics Engine - derived KPIs over typed record snapshots
//
// Every function is pure: same input slices → same output, nothing mutated.
// Zero-denominator policy per metric:
//   CAC, CLV, lead conversion  → Err(MetricError), never NaN
//   churn rate                 → 0.0 for an empty customer base
//   MoM growth                 → MOM_GROWTH_SENTINEL when the prior period is 0

use crate::config::MetricsConfig;
use crate::entities::{
    Customer, Lead, LeadStatus, MarketingSpend, Region, RevenuePoint, Transaction,
};
use crate::error::MetricError;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// MoM growth reported when the prior period's actual is zero
pub const MOM_GROWTH_SENTINEL: f64 = 100.0;

// ============================================================================
// MARKETING
// ============================================================================

/// Total spend for `period`, summed across channels
pub fn marketing_spend_for_period(spend: &[MarketingSpend], period: &str) -> f64 {
    spend
        .iter()
        .filter(|s| s.period == period)
        .map(|s| s.amount)
        .sum()
}

/// Spend for `period` keyed by channel
pub fn spend_by_channel(spend: &[MarketingSpend], period: &str) -> BTreeMap<String, f64> {
    let mut by_channel = BTreeMap::new();
    for entry in spend.iter().filter(|s| s.period == period) {
        *by_channel.entry(entry.channel.clone()).or_insert(0.0) += entry.amount;
    }
    by_channel
}

/// Customer Acquisition Cost: spend in `period` / customers acquired in that period.
///
/// `acquired` is supplied by the caller; see [`customers_acquired_in_period`] for
/// deriving it from join dates.
pub fn customer_acquisition_cost(
    spend: &[MarketingSpend],
    period: &str,
    acquired: u32,
) -> Result<f64, MetricError> {
    if acquired == 0 {
        return Err(MetricError::NoAcquisitions {
            period: period.to_string(),
        });
    }

    let total = marketing_spend_for_period(spend, period);
    Ok(total / f64::from(acquired))
}

/// Customers whose join date falls in `period` (`YYYY-MM`)
pub fn customers_acquired_in_period(customers: &[Customer], period: &str) -> u32 {
    let count = customers
        .iter()
        .filter(|c| c.join_period() == period)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

// ============================================================================
// SALES
// ============================================================================

fn completed(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(|tx| tx.is_completed())
}

/// Sum of completed transaction amounts
pub fn completed_revenue(transactions: &[Transaction]) -> f64 {
    completed(transactions).map(|tx| tx.amount).sum()
}

/// Mean completed transaction amount, `None` when nothing completed
pub fn average_completed_amount(transactions: &[Transaction]) -> Option<f64> {
    let (total, count) = completed(transactions).fold((0.0, 0usize), |(total, count), tx| {
        (total + tx.amount, count + 1)
    });

    if count == 0 {
        None
    } else {
        Some(total / count as f64)
    }
}

/// Open pipeline: total of pending transaction amounts
pub fn open_pipeline(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|tx| tx.is_pending())
        .map(|tx| tx.amount)
        .sum()
}

/// Mean completed amount per customer region.
///
/// Transactions whose customer id doesn't resolve, or whose customer has no
/// region tag, are left out. Regions with no attributable completed
/// transaction are absent from the result.
pub fn average_deal_size_by_region(
    transactions: &[Transaction],
    customers: &[Customer],
) -> BTreeMap<Region, f64> {
    let regions: HashMap<&str, Option<Region>> = customers
        .iter()
        .map(|c| (c.id.as_str(), c.region))
        .collect();

    let mut totals: BTreeMap<Region, (f64, usize)> = BTreeMap::new();
    let mut unattributed = 0usize;

    for tx in completed(transactions) {
        match regions.get(tx.customer_id.as_str()) {
            Some(Some(region)) => {
                let entry = totals.entry(*region).or_insert((0.0, 0));
                entry.0 += tx.amount;
                entry.1 += 1;
            }
            _ => unattributed += 1,
        }
    }

    if unattributed > 0 {
        debug!(unattributed, "completed transactions without a resolvable region");
    }

    totals
        .into_iter()
        .map(|(region, (total, count))| (region, total / count as f64))
        .collect()
}

// ============================================================================
// LEADS
// ============================================================================

/// Converted leads / total leads, on a 0-100 scale
pub fn lead_conversion_rate(leads: &[Lead]) -> Result<f64, MetricError> {
    if leads.is_empty() {
        return Err(MetricError::NoLeads);
    }

    let converted = leads.iter().filter(|l| l.is_converted()).count();
    Ok(converted as f64 / leads.len() as f64 * 100.0)
}

/// Lead count per lifecycle status; statuses with no leads are omitted
pub fn lead_funnel(leads: &[Lead]) -> BTreeMap<LeadStatus, usize> {
    let mut funnel = BTreeMap::new();
    for lead in leads {
        *funnel.entry(lead.status).or_insert(0) += 1;
    }
    funnel
}

// ============================================================================
// RETENTION & GROWTH
// ============================================================================

/// Churned / total customers on a 0-100 scale. An empty base has no churn: 0.0.
pub fn churn_rate(customers: &[Customer]) -> f64 {
    if customers.is_empty() {
        return 0.0;
    }

    let churned = customers.iter().filter(|c| c.is_churned()).count();
    churned as f64 / customers.len() as f64 * 100.0
}

/// Percentage change from the second-to-last to the last point of a
/// chronologically ordered series.
pub fn month_over_month_growth(series: &[RevenuePoint]) -> Result<f64, MetricError> {
    let [.., previous, current] = series else {
        return Err(MetricError::InsufficientHistory {
            needed: 2,
            got: series.len(),
        });
    };

    if previous.actual == 0.0 {
        return Ok(MOM_GROWTH_SENTINEL);
    }

    Ok((current.actual - previous.actual) / previous.actual * 100.0)
}

// ============================================================================
// METRICS ENGINE
// ============================================================================

/// Carries the policy constants into the metrics that need them
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: MetricsConfig,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MetricsConfig) -> Self {
        MetricsEngine { config }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Customer Lifetime Value:
    /// mean(completed amount) × annual purchase frequency × lifespan years
    pub fn customer_lifetime_value(
        &self,
        transactions: &[Transaction],
    ) -> Result<f64, MetricError> {
        let average = average_completed_amount(transactions)
            .ok_or(MetricError::NoCompletedTransactions)?;

        Ok(average * self.config.lifetime_purchases())
    }

    /// CAC for the configured period, or the latest spend period when unset.
    /// Returns the period used alongside the result.
    pub fn acquisition_cost(
        &self,
        spend: &[MarketingSpend],
        customers: &[Customer],
        acquired: Option<u32>,
    ) -> Option<(String, Result<f64, MetricError>)> {
        let period = match &self.config.cac_period {
            Some(period) => period.clone(),
            None => latest_period(spend)?,
        };

        let acquired =
            acquired.unwrap_or_else(|| customers_acquired_in_period(customers, &period));
        debug!(%period, acquired, "computing acquisition cost");

        let cac = customer_acquisition_cost(spend, &period, acquired);
        Some((period, cac))
    }
}

/// Greatest period label among spend entries (labels sort chronologically as `YYYY-MM`)
pub fn latest_period(spend: &[MarketingSpend]) -> Option<String> {
    spend.iter().map(|s| s.period.as_str()).max().map(str::to_string)
}

// ============================================================================
// TESTS
// ============================================================================
