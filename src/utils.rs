//! Validation utilities for metric definitions and configuration
//!
//! The catalog is fixed at compile time, but namespaces and constant labels
//! come from configuration. Prometheus only checks them when a family is
//! built, and its error names the bad value but not the config key it came
//! from. Checking them here lets
//! [`MetricsConfig::validate`](crate::MetricsConfig::validate) reject a bad
//! config at load time with the offending key in the error.

use super::*;
use lazy_static::lazy_static;
use regex::Regex;

const MAX_METRIC_NAME_LENGTH: usize = 255;
const MAX_LABEL_KEY_LENGTH: usize = 128;
const MAX_LABEL_VALUE_LENGTH: usize = 1024;

lazy_static! {
    static ref METRIC_NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*$").unwrap();
    static ref LABEL_KEY_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

/// Validate a metric name
///
/// Applied to the namespace-qualified name, so a namespace that is fine on
/// its own but pushes the name past the length limit is still caught.
///
/// # Examples
/// ```rust
/// use tyl_compliance_metrics::validate_metric_name;
///
/// assert!(validate_metric_name("compliance_scan_status").is_ok());
/// assert!(validate_metric_name("").is_err());
/// ```
pub fn validate_metric_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(metrics_error("metric_name", "Metric name cannot be empty"));
    }

    if name.len() > MAX_METRIC_NAME_LENGTH {
        return Err(metrics_error(
            "metric_name",
            format!("Metric name too long (max {MAX_METRIC_NAME_LENGTH} chars)"),
        ));
    }

    if !METRIC_NAME_REGEX.is_match(name) {
        return Err(metrics_error(
            "metric_name",
            "Invalid metric name format (must match [a-zA-Z_:][a-zA-Z0-9_:]*)",
        ));
    }

    Ok(())
}

/// Validate a label key
///
/// Keys starting with `__` are reserved for Prometheus internal use, and a
/// configured constant label must not claim one.
pub fn validate_label_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(metrics_error("label_key", "Label key cannot be empty"));
    }

    if key.len() > MAX_LABEL_KEY_LENGTH {
        return Err(metrics_error(
            "label_key",
            format!("Label key too long (max {MAX_LABEL_KEY_LENGTH} chars)"),
        ));
    }

    if key.starts_with("__") {
        return Err(metrics_error(
            "label_key",
            "Label keys starting with '__' are reserved",
        ));
    }

    if !LABEL_KEY_REGEX.is_match(key) {
        return Err(metrics_error(
            "label_key",
            "Invalid label key format (must match [a-zA-Z_][a-zA-Z0-9_]*)",
        ));
    }

    Ok(())
}

/// Validate a constant label value
///
/// Variable label values come from controller events and are not checked.
/// Constant label values come from configuration and end up on every series.
pub fn validate_label_value(value: &str) -> Result<()> {
    if value.len() > MAX_LABEL_VALUE_LENGTH {
        return Err(metrics_error(
            "label_value",
            format!("Label value too long (max {MAX_LABEL_VALUE_LENGTH} chars)"),
        ));
    }

    if value.contains('\0') {
        return Err(metrics_error(
            "label_value",
            "Label values cannot contain null bytes",
        ));
    }

    Ok(())
}

/// Validate a whole definition: its name and every declared label name
///
/// Label names must also be unique within the definition.
pub fn validate_definition(definition: &MetricDefinition) -> Result<()> {
    validate_metric_name(definition.name())?;

    for (index, label) in definition.label_names().iter().enumerate() {
        validate_label_key(label)?;
        if definition.label_names()[..index].contains(label) {
            return Err(metrics_error(
                "label_names",
                format!("Duplicate label '{label}' in {}", definition.name()),
            ));
        }
    }

    for (key, value) in definition.const_labels() {
        validate_label_key(key)?;
        validate_label_value(value)?;
    }

    Ok(())
}
