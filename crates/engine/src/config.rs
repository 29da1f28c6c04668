use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// All tunables for one reconciliation run. Constructed once and passed
/// into every component; there are no module-level defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub run: RunSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thresholds {
    /// A difference at or below this reconciles. Inclusive boundary,
    /// applied uniformly at supplier, entry, and summary level.
    #[serde(default = "default_reconcile")]
    pub reconcile: Decimal,
    /// Candidate search window for unrecorded/orphan entries, in percent
    /// of the target amount.
    #[serde(default = "default_value_match_pct")]
    pub value_match_pct: Decimal,
    /// Relative deviation below this is HIGH confidence.
    #[serde(default = "default_high_pct")]
    pub high_pct: Decimal,
    /// Relative deviation below this (and at or above `high_pct`) is
    /// MEDIUM; above it and within the window, LOW.
    #[serde(default = "default_medium_pct")]
    pub medium_pct: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSettings {
    /// Reference date for due-day computation. Defaults to today at run
    /// time when absent.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

fn default_reconcile() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_value_match_pct() -> Decimal {
    Decimal::from(10)
}

fn default_high_pct() -> Decimal {
    Decimal::ONE
}

fn default_medium_pct() -> Decimal {
    Decimal::from(3)
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            reconcile: default_reconcile(),
            value_match_pct: default_value_match_pct(),
            high_pct: default_high_pct(),
            medium_pct: default_medium_pct(),
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            run: RunSettings::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconcileConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconcileConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let t = &self.thresholds;

        if t.reconcile < Decimal::ZERO {
            return Err(ReconError::ConfigValidation(format!(
                "reconcile threshold must be >= 0, got {}",
                t.reconcile
            )));
        }
        if t.high_pct <= Decimal::ZERO {
            return Err(ReconError::ConfigValidation(format!(
                "high_pct must be > 0, got {}",
                t.high_pct
            )));
        }
        if t.medium_pct <= t.high_pct {
            return Err(ReconError::ConfigValidation(format!(
                "medium_pct ({}) must be greater than high_pct ({})",
                t.medium_pct, t.high_pct
            )));
        }
        if t.value_match_pct < t.medium_pct {
            return Err(ReconError::ConfigValidation(format!(
                "value_match_pct ({}) must be at least medium_pct ({})",
                t.value_match_pct, t.medium_pct
            )));
        }

        Ok(())
    }

    /// The effective reference date for due-day computation.
    pub fn reference_date(&self) -> NaiveDate {
        self.run
            .reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_when_empty() {
        let config = ReconcileConfig::from_toml("").unwrap();
        assert_eq!(config.thresholds.reconcile, dec!(0.01));
        assert_eq!(config.thresholds.value_match_pct, dec!(10));
        assert_eq!(config.thresholds.high_pct, dec!(1));
        assert_eq!(config.thresholds.medium_pct, dec!(3));
        assert!(config.run.reference_date.is_none());
    }

    #[test]
    fn parse_full_config() {
        let input = r#"
[thresholds]
reconcile = "0.05"
value_match_pct = "15"
high_pct = "0.5"
medium_pct = "2"

[run]
reference_date = "2026-06-30"
"#;
        let config = ReconcileConfig::from_toml(input).unwrap();
        assert_eq!(config.thresholds.reconcile, dec!(0.05));
        assert_eq!(config.thresholds.value_match_pct, dec!(15));
        assert_eq!(
            config.reference_date(),
            NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()
        );
    }

    #[test]
    fn reject_disordered_breakpoints() {
        let input = r#"
[thresholds]
high_pct = "3"
medium_pct = "1"
"#;
        let err = ReconcileConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("medium_pct"));
    }

    #[test]
    fn reject_window_below_medium() {
        let input = r#"
[thresholds]
value_match_pct = "2"
"#;
        let err = ReconcileConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("value_match_pct"));
    }

    #[test]
    fn reject_negative_reconcile() {
        let input = r#"
[thresholds]
reconcile = "-0.01"
"#;
        let err = ReconcileConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("reconcile"));
    }
}
