// ⚙️ Metrics policy configuration
// Constants the KPI formulas assume but cannot derive from data

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_ANNUAL_PURCHASE_FREQUENCY: f64 = 12.0;
pub const DEFAULT_LIFESPAN_YEARS: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Purchases per customer per year assumed by CLV
    pub annual_purchase_frequency: f64,

    /// Customer relationship length in years assumed by CLV
    pub lifespan_years: f64,

    /// Period label ("2025-10") CAC is reported for. `None` = latest spend period.
    pub cac_period: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            annual_purchase_frequency: DEFAULT_ANNUAL_PURCHASE_FREQUENCY,
            lifespan_years: DEFAULT_LIFESPAN_YEARS,
            cac_period: None,
        }
    }
}

impl MetricsConfig {
    /// Load config from a JSON file. Missing fields fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read metrics config: {:?}", path.as_ref()))?;

        let config: MetricsConfig =
            serde_json::from_str(&content).context("Failed to parse metrics config JSON")?;

        config.validate()?;
        Ok(config)
    }

    pub fn with_cac_period(mut self, period: impl Into<String>) -> Self {
        self.cac_period = Some(period.into());
        self
    }

    /// CLV multiplier: frequency × lifespan
    pub fn lifetime_purchases(&self) -> f64 {
        self.annual_purchase_frequency * self.lifespan_years
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.annual_purchase_frequency.is_finite() && self.annual_purchase_frequency > 0.0) {
            bail!(
                "annual_purchase_frequency must be a positive number, got {}",
                self.annual_purchase_frequency
            );
        }
        if !(self.lifespan_years.is_finite() && self.lifespan_years > 0.0) {
            bail!(
                "lifespan_years must be a positive number, got {}",
                self.lifespan_years
            );
        }
        if let Some(period) = &self.cac_period {
            if NaiveDate::parse_from_str(&format!("{}-01", period), "%Y-%m-%d").is_err() {
                bail!("cac_period must be YYYY-MM, got '{}'", period);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MetricsConfig::default();
        assert_eq!(config.lifetime_purchases(), 36.0);
        assert!(config.cac_period.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_cac_period() {
        let config = MetricsConfig::default().with_cac_period("2025-09");
        assert_eq!(config.cac_period.as_deref(), Some("2025-09"));
        assert_eq!(config.lifespan_years, DEFAULT_LIFESPAN_YEARS);
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "lifespan_years": 5, "cac_period": "2025-09" }}"#).unwrap();

        let config = MetricsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.annual_purchase_frequency, 12.0);
        assert_eq!(config.lifespan_years, 5.0);
        assert_eq!(config.cac_period.as_deref(), Some("2025-09"));
    }

    #[test]
    fn test_rejects_non_positive_constants() {
        let config = MetricsConfig {
            annual_purchase_frequency: 0.0,
            ..MetricsConfig::default()
        };
        assert!(config.validate().is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "lifespan_years": -1 }}"#).unwrap();
        assert!(MetricsConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_rejects_month_name_cac_period() {
        let config = MetricsConfig::default().with_cac_period("Oct");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("YYYY-MM"));

        assert!(MetricsConfig::default().with_cac_period("2025-10").validate().is_ok());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = MetricsConfig::from_file("/nonexistent/metrics.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read metrics config"));
    }
}
