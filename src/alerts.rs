// 🔔 KPI Alerts - threshold rules as data
// Rules are evaluated against a MetricsReport; each breach becomes a KpiAlert.

use crate::report::{MetricName, MetricsReport};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Above,
    Below,
}

impl Condition {
    fn breached(&self, current: f64, threshold: f64) -> bool {
        match self {
            Condition::Above => current > threshold,
            Condition::Below => current < threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub metric: MetricName,
    pub condition: Condition,
    pub threshold: f64,
    pub severity: Severity,

    /// Overrides the generated alert message
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// ALERT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiAlert {
    /// Id of the rule that fired
    pub alert_type: String,
    pub metric_name: MetricName,
    pub threshold_value: f64,
    pub current_value: f64,
    pub severity: Severity,
    pub message: String,
}

// ============================================================================
// ALERT ENGINE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AlertEngine {
    rules: Vec<AlertRule>,
}

impl AlertEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: Vec<AlertRule>) -> Self {
        AlertEngine { rules }
    }

    /// Load rules from a JSON array file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read alert rules file: {:?}", path.as_ref()))?;

        let rules: Vec<AlertRule> =
            serde_json::from_str(&content).context("Failed to parse alert rules JSON")?;

        Ok(AlertEngine::from_rules(rules))
    }

    pub fn add_rule(&mut self, rule: AlertRule) {
        self.rules.push(rule);
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Alerts for every breached rule, most severe first (rule order within a severity)
    pub fn evaluate(&self, report: &MetricsReport) -> Vec<KpiAlert> {
        let mut alerts: Vec<KpiAlert> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let Some(current) = report.get(rule.metric) else {
                    debug!(
                        rule = %rule.id,
                        metric = %rule.metric,
                        "metric undefined, rule skipped"
                    );
                    return None;
                };

                if !rule.condition.breached(current, rule.threshold) {
                    return None;
                }

                let message = rule.message.clone().unwrap_or_else(|| {
                    format!(
                        "{} is {:.2}, {} threshold {:.2}",
                        rule.metric,
                        current,
                        match rule.condition {
                            Condition::Above => "above",
                            Condition::Below => "below",
                        },
                        rule.threshold
                    )
                });

                Some(KpiAlert {
                    alert_type: rule.id.clone(),
                    metric_name: rule.metric,
                    threshold_value: rule.threshold,
                    current_value: current,
                    severity: rule.severity,
                    message,
                })
            })
            .collect();

        // stable: rule order is kept within a severity
        alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
        alerts
    }
}
