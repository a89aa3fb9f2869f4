//! Error handling integration for compliance metrics
//!
//! Semantic constructors over the TYL error system. Following the TYL
//! pattern, the crate does not define its own error enum; every failure is a
//! `TylError` built by one of the helpers below.

use super::*;

/// Create a metrics validation error
///
/// Used when metric names, label names, or label values fail validation.
///
/// # Example
/// ```rust
/// use tyl_compliance_metrics::metrics_error;
///
/// let error = metrics_error("metric_name", "Names cannot contain spaces");
/// ```
pub fn metrics_error(field: impl Into<String>, message: impl Into<String>) -> TylError {
    TylError::validation(field.into(), message.into())
}

/// Create a metrics configuration error
///
/// Used when a [`MetricsConfig`](crate::MetricsConfig) is rejected.
///
/// # Example
/// ```rust
/// use tyl_compliance_metrics::metrics_config_error;
///
/// let error = metrics_config_error("namespace", "Namespace cannot be empty");
/// ```
pub fn metrics_config_error(config_key: impl Into<String>, message: impl Into<String>) -> TylError {
    TylError::configuration(format!(
        "Metrics config error for {}: {}",
        config_key.into(),
        message.into()
    ))
}

/// Create a metrics registration error
///
/// Used by [`Metrics::register`](crate::Metrics::register) when the backend
/// registry refuses a family. The metric name is part of the message so the
/// operator can tell which family failed.
///
/// # Example
/// ```rust
/// use tyl_compliance_metrics::metrics_registration_error;
///
/// let error = metrics_registration_error("compliance_scan_status", "Duplicate metrics collector registration attempted");
/// assert!(error.to_string().contains("compliance_scan_status"));
/// ```
pub fn metrics_registration_error(
    metric_name: impl Into<String>,
    message: impl Into<String>,
) -> TylError {
    TylError::internal(format!(
        "register collector for {} metric: {}",
        metric_name.into(),
        message.into()
    ))
}

/// Create a metrics backend error
///
/// Used when a backend fails to build a family or otherwise misbehaves
/// outside of registration.
pub fn metrics_backend_error(
    backend_type: impl Into<String>,
    message: impl Into<String>,
) -> TylError {
    TylError::internal(format!(
        "Metrics backend error for {}: {}",
        backend_type.into(),
        message.into()
    ))
}

/// Helper trait for adding metrics context to existing errors
pub trait MetricsErrorExt {
    /// Add metric name context to an existing error by wrapping it
    fn with_metric_name(self, metric_name: impl Into<String>) -> TylError;
}

impl MetricsErrorExt for TylError {
    fn with_metric_name(self, metric_name: impl Into<String>) -> TylError {
        TylError::internal(format!("Metric [{}]: {}", metric_name.into(), self))
    }
}

/// Convert a prometheus error into a backend error
///
/// Note: helper functions rather than From impls to avoid orphan rule issues
pub fn from_prometheus_error(error: prometheus::Error) -> TylError {
    match error {
        prometheus::Error::AlreadyReg => metrics_backend_error(
            "prometheus",
            "Duplicate metrics collector registration attempted",
        ),
        prometheus::Error::InconsistentCardinality { expect, got } => metrics_error(
            "labels",
            format!("Inconsistent label cardinality: expected {expect} label values, got {got}"),
        ),
        other => metrics_backend_error("prometheus", other.to_string()),
    }
}

pub fn from_serde_json_error(error: serde_json::Error) -> TylError {
    metrics_config_error("json", error.to_string())
}
