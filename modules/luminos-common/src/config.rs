use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::info;

use crate::error::LuminosError;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Upper bound for `COLLECTION_WINDOW_HOURS`: one hundred years.
pub const MAX_WINDOW_HOURS: i64 = 24 * 365 * 100;

/// Tuning for the same-incident grouping pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionConfig {
    /// Reports further apart than this are never grouped.
    pub radius_km: f64,
    /// Reports created further apart than this are never grouped.
    pub window_hours: i64,
    /// Overlap at or above this groups without asking the judge.
    pub strong_overlap: f64,
    /// Overlap below this never groups.
    pub weak_overlap: f64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            radius_km: 0.1,
            window_hours: 48,
            strong_overlap: 0.6,
            weak_overlap: 0.25,
        }
    }
}

impl CollectionConfig {
    /// The grouping window as a duration. Fails when `window_hours` is not representable.
    pub fn window(&self) -> Result<chrono::Duration, LuminosError> {
        chrono::Duration::try_hours(self.window_hours).ok_or_else(|| {
            LuminosError::Config(format!("window of {} hours is out of range", self.window_hours))
        })
    }

    fn validate(self) -> Result<Self, LuminosError> {
        if !(self.radius_km.is_finite() && self.radius_km >= 0.0) {
            return Err(LuminosError::Config("COLLECTION_RADIUS_KM must be >= 0".into()));
        }
        if !(0..=MAX_WINDOW_HOURS).contains(&self.window_hours) {
            return Err(LuminosError::Config(format!(
                "COLLECTION_WINDOW_HOURS must be within [0, {MAX_WINDOW_HOURS}]"
            )));
        }
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.strong_overlap) || !in_unit(self.weak_overlap) {
            return Err(LuminosError::Config("overlap thresholds must be within [0, 1]".into()));
        }
        if self.weak_overlap > self.strong_overlap {
            return Err(LuminosError::Config(
                "COLLECTION_WEAK_OVERLAP must not exceed COLLECTION_STRONG_OVERLAP".into(),
            ));
        }
        Ok(self)
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // AI provider. Empty key disables every LLM call.
    pub anthropic_api_key: String,
    pub anthropic_model: String,

    pub collection: CollectionConfig,

    /// Where uploaded photos live; issue photo paths are relative to it.
    pub upload_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables. Nothing is required.
    pub fn from_env() -> Result<Self, LuminosError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source. Unset and blank values fall
    /// back to defaults; values that do not parse are a `LuminosError::Config`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LuminosError> {
        let defaults = CollectionConfig::default();
        let collection = CollectionConfig {
            radius_km: parsed(&lookup, "COLLECTION_RADIUS_KM", defaults.radius_km)?,
            window_hours: parsed(&lookup, "COLLECTION_WINDOW_HOURS", defaults.window_hours)?,
            strong_overlap: parsed(&lookup, "COLLECTION_STRONG_OVERLAP", defaults.strong_overlap)?,
            weak_overlap: parsed(&lookup, "COLLECTION_WEAK_OVERLAP", defaults.weak_overlap)?,
        }
        .validate()?;

        Ok(Self {
            anthropic_api_key: lookup("ANTHROPIC_API_KEY").unwrap_or_default(),
            anthropic_model: lookup("ANTHROPIC_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            collection,
            upload_dir: lookup("UPLOAD_DIR")
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
        })
    }

    pub fn llm_enabled(&self) -> bool {
        !self.anthropic_api_key.trim().is_empty()
    }

    /// Log the effective configuration with secrets reduced to set/unset.
    pub fn log_redacted(&self) {
        let key_state = if self.llm_enabled() { "set" } else { "unset" };
        info!(
            anthropic_api_key = key_state,
            anthropic_model = self.anthropic_model.as_str(),
            radius_km = self.collection.radius_km,
            window_hours = self.collection.window_hours,
            strong_overlap = self.collection.strong_overlap,
            weak_overlap = self.collection.weak_overlap,
            upload_dir = %self.upload_dir.display(),
            "Loaded config"
        );
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, LuminosError> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| LuminosError::Config(format!("{key} has invalid value {raw:?}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        assert!(CollectionConfig::default().validate().is_ok());
    }

    #[test]
    fn weak_above_strong_is_rejected() {
        let c = CollectionConfig {
            strong_overlap: 0.3,
            weak_overlap: 0.5,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(LuminosError::Config(_))));
    }

    #[test]
    fn negative_radius_is_rejected() {
        let c = CollectionConfig {
            radius_km: -1.0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn window_converts_to_duration() {
        assert_eq!(
            CollectionConfig::default().window().unwrap(),
            chrono::Duration::hours(48)
        );
    }

    #[test]
    fn huge_window_is_rejected() {
        let c = CollectionConfig {
            window_hours: 10_000_000_000,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(LuminosError::Config(_))));
    }

    #[test]
    fn unrepresentable_window_is_an_error() {
        let c = CollectionConfig {
            window_hours: i64::MAX,
            ..Default::default()
        };
        assert!(matches!(c.window(), Err(LuminosError::Config(_))));
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn nothing_set_gives_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.collection, CollectionConfig::default());
        assert_eq!(config.anthropic_model, DEFAULT_MODEL);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert!(!config.llm_enabled());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("COLLECTION_RADIUS_KM", ""),
            ("COLLECTION_WINDOW_HOURS", "   "),
            ("ANTHROPIC_MODEL", ""),
        ]))
        .unwrap();
        assert_eq!(config.collection.radius_km, 0.1);
        assert_eq!(config.collection.window_hours, 48);
        assert_eq!(config.anthropic_model, DEFAULT_MODEL);
    }

    #[test]
    fn numeric_values_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("COLLECTION_RADIUS_KM", " 0.25 "),
            ("COLLECTION_WINDOW_HOURS", "72"),
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
        ]))
        .unwrap();
        assert_eq!(config.collection.radius_km, 0.25);
        assert_eq!(config.collection.window_hours, 72);
        assert!(config.llm_enabled());
    }

    #[test]
    fn malformed_number_is_config_error() {
        let err = Config::from_lookup(lookup_from(&[("COLLECTION_RADIUS_KM", "abc")])).unwrap_err();
        match err {
            LuminosError::Config(msg) => assert!(msg.contains("COLLECTION_RADIUS_KM"), "{msg}"),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_window_is_config_error() {
        let result = Config::from_lookup(lookup_from(&[("COLLECTION_WINDOW_HOURS", "10000000000")]));
        assert!(matches!(result, Err(LuminosError::Config(_))));
    }

    // The only test that touches the process environment.
    #[test]
    fn from_env_reports_malformed_value() {
        env::set_var("COLLECTION_WEAK_OVERLAP", "lots");
        let result = Config::from_env();
        env::remove_var("COLLECTION_WEAK_OVERLAP");
        assert!(matches!(result, Err(LuminosError::Config(_))));
    }
}
