//! Configuration for the metrics facade
//!
//! Nothing here is required: [`MetricsConfig::default`] yields the metric
//! names dashboards expect. A namespace or constant labels are only for
//! deployments that run several controllers against one Prometheus.

use super::*;
use crate::utils::{validate_label_key, validate_label_value, validate_metric_name};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Metrics facade configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Prefix joined to every metric name with `_`
    pub namespace: Option<String>,

    /// Labels with a fixed value attached to every family
    pub const_labels: BTreeMap<String, String>,
}

impl MetricsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration document and validate it
    ///
    /// # Example
    /// ```rust
    /// use tyl_compliance_metrics::MetricsConfig;
    ///
    /// let config = MetricsConfig::from_json(r#"{"namespace": "compliance_operator"}"#).unwrap();
    /// assert_eq!(config.qualified_name("compliance_state"), "compliance_operator_compliance_state");
    /// ```
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).map_err(from_serde_json_error)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_const_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.const_labels.insert(key.into(), value.into());
        self
    }

    /// Check the namespace and constant labels
    ///
    /// A constant label may not reuse a label name any catalog metric
    /// declares, since the series would then carry the name twice.
    pub fn validate(&self) -> Result<()> {
        if let Some(namespace) = &self.namespace {
            validate_metric_name(namespace)
                .map_err(|e| metrics_config_error("namespace", e.to_string()))?;
        }

        for (key, value) in &self.const_labels {
            validate_label_key(key)
                .and_then(|_| validate_label_value(value))
                .map_err(|e| metrics_config_error(format!("const_labels.{key}"), e.to_string()))?;

            if MetricId::ALL
                .iter()
                .any(|id| id.label_names().contains(&key.as_str()))
            {
                return Err(metrics_config_error(
                    format!("const_labels.{key}"),
                    "Constant label collides with a variable label",
                ));
            }
        }

        Ok(())
    }

    /// Full metric name for `base` under the configured namespace
    pub fn qualified_name(&self, base: &str) -> String {
        match &self.namespace {
            Some(namespace) if !namespace.is_empty() => format!("{namespace}_{base}"),
            _ => base.to_string(),
        }
    }
}
