//! Optional `smed.toml` plus `SMED_*` environment overrides.
//!
//! ```toml
//! [engine]
//! period_days = 30
//! valuation_multiple = "3.5"
//!
//! [[rules]]
//! metric = "rent_ratio"
//! comparison = "greater_than"
//! threshold = "12"
//! severity = "critical"
//! ```
//!
//! Environment keys use `__` between levels, e.g. `SMED_ENGINE__PERIOD_DAYS=7`.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use sme_diagnostics_core::diagnostics::classification::{ClassificationRule, RuleTable};
use sme_diagnostics_core::EngineSettings;

pub const DEFAULT_FILE: &str = "smed.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    /// Replaces the standard threshold table when present
    pub rules: Option<Vec<ClassificationRule>>,
}

impl Settings {
    /// Load settings. An explicit `path` must exist; the default file may not.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => config::File::with_name(p).required(true),
            None => config::File::with_name(DEFAULT_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("SMED")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings
            .engine
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        if matches!(&settings.rules, Some(r) if r.is_empty()) {
            return Err(ConfigError::ValidationError(
                "`rules` is present but empty".into(),
            ));
        }

        tracing::debug!(
            period_days = settings.engine.period_days,
            custom_rules = settings.rules.is_some(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// The configured rule table, or the standard one.
    pub fn rule_table(&self) -> RuleTable {
        match &self.rules {
            Some(rules) => RuleTable::new(rules.clone()).unwrap_or_default(),
            None => RuleTable::standard(),
        }
    }

    /// Fill `settings` and `rules` into a JSON request that leaves them out.
    pub fn fill_defaults(&self, request: &mut Value) -> Result<(), serde_json::Error> {
        if let Value::Object(map) = request {
            if !map.contains_key("settings") {
                map.insert("settings".into(), serde_json::to_value(&self.engine)?);
            }
            if let Some(rules) = &self.rules {
                if !map.contains_key("rules") {
                    map.insert("rules".into(), serde_json::to_value(rules)?);
                }
            }
        }
        Ok(())
    }

    /// Fill the configured multiple and annualisation into a valuation
    /// request that leaves them out.
    pub fn fill_valuation_defaults(&self, request: &mut Value) -> Result<(), serde_json::Error> {
        if let Value::Object(map) = request {
            if !map.contains_key("multiple") {
                map.insert(
                    "multiple".into(),
                    serde_json::to_value(self.engine.valuation_multiple)?,
                );
            }
            if !map.contains_key("periods_per_year") {
                map.insert(
                    "periods_per_year".into(),
                    serde_json::to_value(self.engine.periods_per_year)?,
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use sme_diagnostics_core::diagnostics::classification::{Comparison, MetricKind, Severity};

    fn strict_rent() -> Settings {
        Settings {
            engine: EngineSettings::default(),
            rules: Some(vec![ClassificationRule {
                metric: MetricKind::RentRatio,
                comparison: Comparison::GreaterThan,
                threshold: dec!(8),
                severity: Severity::Critical,
            }]),
        }
    }

    #[test]
    fn test_fill_defaults_keeps_explicit_settings() {
        let mut request = json!({ "company_name": "X", "settings": { "period_days": 7 } });
        Settings::default().fill_defaults(&mut request).unwrap();
        assert_eq!(request["settings"]["period_days"], 7);
        assert!(request.get("rules").is_none());
    }

    #[test]
    fn test_fill_defaults_inserts_configured_values() {
        let mut request = json!({ "company_name": "X" });
        strict_rent().fill_defaults(&mut request).unwrap();
        assert_eq!(request["settings"]["period_days"], 30);
        assert_eq!(request["rules"][0]["metric"], "rent_ratio");
    }

    #[test]
    fn test_valuation_request_takes_configured_multiple() {
        let settings = Settings {
            engine: EngineSettings {
                valuation_multiple: dec!(4.5),
                periods_per_year: 4,
                ..Default::default()
            },
            rules: None,
        };
        let mut request = json!({ "period_ebitda": "1000" });
        settings.fill_valuation_defaults(&mut request).unwrap();
        assert_eq!(request["multiple"], "4.5");
        assert_eq!(request["periods_per_year"], 4);

        let mut explicit = json!({ "period_ebitda": "1000", "multiple": "2" });
        settings.fill_valuation_defaults(&mut explicit).unwrap();
        assert_eq!(explicit["multiple"], "2");
    }

    #[test]
    fn test_rule_table_follows_configuration() {
        assert_eq!(
            Settings::default()
                .rule_table()
                .classify(MetricKind::RentRatio, dec!(9)),
            Severity::Healthy
        );
        assert_eq!(
            strict_rent()
                .rule_table()
                .classify(MetricKind::RentRatio, dec!(9)),
            Severity::Critical
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(matches!(
            Settings::load(Some("does-not-exist.toml")),
            Err(ConfigError::LoadError(_))
        ));
    }
}
