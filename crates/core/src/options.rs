//! Annotation options
//!
//! Options are layered: built-in defaults, then an optional JSON file, then
//! `CONNECTOR_*` environment variables, then whatever the caller sets
//! explicitly. Everything is validated once before a run starts.

use crate::segment::LengthMetric;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What to do when an element in a pair has no geometry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UngeometricPolicy {
    /// Stop the run at the failing pair
    #[default]
    Abort,
    /// Leave the pair out and keep going
    SkipPair,
}

/// When annotations are written into the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmissionMode {
    /// Append each pair as soon as it is computed
    #[default]
    Incremental,
    /// Compute every pair first, append only if all succeeded
    Batched,
}

/// User-facing annotation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorOptions {
    /// Line stroke width in millimeters
    pub stroke_width: f64,
    /// Label font size in pixels
    pub text_size: f64,
    /// Multiplier from document distance to reported distance
    pub scale_factor: f64,
    /// Distance between the line and its label
    pub text_raise: f64,
    /// Suffix appended to the reported distance
    pub unit: String,
    pub length_metric: LengthMetric,
    pub on_ungeometric: UngeometricPolicy,
    pub emission: EmissionMode,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            stroke_width: 1.0,
            text_size: 10.0,
            scale_factor: 1.0,
            text_raise: 5.0,
            unit: "m".to_string(),
            length_metric: LengthMetric::Euclidean,
            on_ungeometric: UngeometricPolicy::Abort,
            emission: EmissionMode::Incremental,
        }
    }
}

/// Errors raised while loading or validating options
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptionsError {
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("failed to read options file {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to parse options: {0}")]
    Parse(String),
}

impl OptionsError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        OptionsError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl ConnectorOptions {
    pub fn with_stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn with_text_size(mut self, text_size: f64) -> Self {
        self.text_size = text_size;
        self
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_text_raise(mut self, text_raise: f64) -> Self {
        self.text_raise = text_raise;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_length_metric(mut self, metric: LengthMetric) -> Self {
        self.length_metric = metric;
        self
    }

    pub fn with_ungeometric_policy(mut self, policy: UngeometricPolicy) -> Self {
        self.on_ungeometric = policy;
        self
    }

    pub fn with_emission(mut self, emission: EmissionMode) -> Self {
        self.emission = emission;
        self
    }

    /// Parse options from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        serde_json::from_str(json).map_err(|e| OptionsError::Parse(e.to_string()))
    }

    /// Load options from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, OptionsError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| OptionsError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&contents)
    }

    /// Apply `CONNECTOR_*` environment overrides
    ///
    /// Recognized variables:
    /// - `CONNECTOR_STROKE_WIDTH`
    /// - `CONNECTOR_TEXT_SIZE`
    /// - `CONNECTOR_SCALE_FACTOR`
    /// - `CONNECTOR_TEXT_RAISE`
    /// - `CONNECTOR_UNIT`
    pub fn with_env_overrides(self) -> Result<Self, OptionsError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, OptionsError> {
        let numeric = |key: &str| -> Result<Option<f64>, OptionsError> {
            lookup(key)
                .map(|value| {
                    value
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| OptionsError::invalid(key, format!("`{value}` is not a number")))
                })
                .transpose()
        };

        if let Some(value) = numeric("CONNECTOR_STROKE_WIDTH")? {
            self.stroke_width = value;
        }
        if let Some(value) = numeric("CONNECTOR_TEXT_SIZE")? {
            self.text_size = value;
        }
        if let Some(value) = numeric("CONNECTOR_SCALE_FACTOR")? {
            self.scale_factor = value;
        }
        if let Some(value) = numeric("CONNECTOR_TEXT_RAISE")? {
            self.text_raise = value;
        }
        if let Some(unit) = lookup("CONNECTOR_UNIT") {
            self.unit = unit;
        }
        Ok(self)
    }

    /// Reject values that would produce meaningless geometry
    pub fn validate(&self) -> Result<(), OptionsError> {
        let finite = [
            ("stroke_width", self.stroke_width),
            ("text_size", self.text_size),
            ("scale_factor", self.scale_factor),
            ("text_raise", self.text_raise),
        ];
        for (key, value) in finite {
            if !value.is_finite() {
                return Err(OptionsError::invalid(key, "must be a finite number"));
            }
        }
        if self.stroke_width < 0.0 {
            return Err(OptionsError::invalid("stroke_width", "must not be negative"));
        }
        if self.text_size <= 0.0 {
            return Err(OptionsError::invalid("text_size", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let options = ConnectorOptions::default();
        assert_eq!(options.stroke_width, 1.0);
        assert_eq!(options.text_size, 10.0);
        assert_eq!(options.scale_factor, 1.0);
        assert_eq!(options.text_raise, 5.0);
        assert_eq!(options.unit, "m");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options =
            ConnectorOptions::from_json(r#"{"scale_factor": 0.01, "on_ungeometric": "skip-pair"}"#)
                .unwrap();
        assert_eq!(options.scale_factor, 0.01);
        assert_eq!(options.on_ungeometric, UngeometricPolicy::SkipPair);
        assert_eq!(options.stroke_width, 1.0);
        assert_eq!(options.length_metric, LengthMetric::Euclidean);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ConnectorOptions::from_json("{ nope"),
            Err(OptionsError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("options.json");
        fs::write(&path, r#"{"stroke_width": 2.0, "length_metric": "longest-side"}"#).unwrap();

        let options = ConnectorOptions::from_file(&path).unwrap();
        assert_eq!(options.stroke_width, 2.0);
        assert_eq!(options.length_metric, LengthMetric::LongestSide);

        let missing = ConnectorOptions::from_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(OptionsError::Read { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("CONNECTOR_TEXT_RAISE", " 8 "), ("CONNECTOR_UNIT", "ft")]);
        let options = ConnectorOptions::default()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(options.text_raise, 8.0);
        assert_eq!(options.unit, "ft");
        assert_eq!(options.stroke_width, 1.0);
    }

    #[test]
    fn test_bad_override_names_the_variable() {
        let err = ConnectorOptions::default()
            .with_overrides(|key| (key == "CONNECTOR_SCALE_FACTOR").then(|| "abc".to_string()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for `CONNECTOR_SCALE_FACTOR`: `abc` is not a number"
        );
    }

    #[test]
    fn test_validation() {
        assert!(ConnectorOptions::default().with_stroke_width(-1.0).validate().is_err());
        assert!(ConnectorOptions::default().with_text_size(0.0).validate().is_err());
        assert!(ConnectorOptions::default().with_scale_factor(f64::NAN).validate().is_err());
        assert!(ConnectorOptions::default().with_text_raise(f64::INFINITY).validate().is_err());
        assert!(ConnectorOptions::default().with_stroke_width(0.0).validate().is_ok());
        assert!(ConnectorOptions::default().with_text_raise(-3.0).validate().is_ok());
    }
}
