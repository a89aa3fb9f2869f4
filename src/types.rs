//! Metric definitions, the fixed catalog, and backend family handles
//!
//! The catalog is the compatibility surface of this crate: metric names and
//! label names defined here are what dashboards and alerts query.

use crate::config::MetricsConfig;
use crate::errors::{from_prometheus_error, metrics_backend_error, MetricsErrorExt};
use crate::Result;
use prometheus::core::Collector;
use prometheus::{IntCounterVec, IntGaugeVec, Opts};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const LABEL_SCAN_NAME: &str = "scan_name";
pub const LABEL_SCAN_RESULT: &str = "scan_result";
pub const LABEL_SCAN_PHASE: &str = "scan_phase";
pub const LABEL_ERROR: &str = "error";
pub const LABEL_REMEDIATION_NAME: &str = "remediation_name";
pub const LABEL_REMEDIATION_STATE: &str = "remediation_state";
pub const LABEL_SUITE_NAME: &str = "suite_name";

const SCAN_STATUS_LABELS: [&str; 3] = [LABEL_SCAN_NAME, LABEL_SCAN_RESULT, LABEL_SCAN_PHASE];
const SCAN_ERROR_LABELS: [&str; 2] = [LABEL_SCAN_NAME, LABEL_ERROR];
const REMEDIATION_STATUS_LABELS: [&str; 2] = [LABEL_REMEDIATION_NAME, LABEL_REMEDIATION_STATE];
const COMPLIANCE_STATE_LABELS: [&str; 1] = [LABEL_SUITE_NAME];

/// Value kind of a metric family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonically increasing count of occurrences
    Counter,

    /// Value that can be set to anything (e.g. a state code)
    Gauge,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricKind::Counter => write!(f, "counter"),
            MetricKind::Gauge => write!(f, "gauge"),
        }
    }
}

/// Logical identifier of every metric the facade tracks
///
/// Declaration order is catalog order, which is also registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricId {
    ComplianceScanStatus,
    ComplianceScanError,
    ComplianceRemediationStatus,
    ComplianceState,
}

impl MetricId {
    pub const ALL: [MetricId; 4] = [
        MetricId::ComplianceScanStatus,
        MetricId::ComplianceScanError,
        MetricId::ComplianceRemediationStatus,
        MetricId::ComplianceState,
    ];

    /// Metric name without any configured namespace
    pub fn base_name(self) -> &'static str {
        match self {
            MetricId::ComplianceScanStatus => "compliance_scan_status",
            MetricId::ComplianceScanError => "compliance_scan_error",
            MetricId::ComplianceRemediationStatus => "compliance_remediation_status",
            MetricId::ComplianceState => "compliance_state",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            MetricId::ComplianceScanStatus => {
                "A counter for the total number of updates to the status of a ComplianceScan"
            }
            MetricId::ComplianceScanError => {
                "A counter for the total number of encounters of error"
            }
            MetricId::ComplianceRemediationStatus => {
                "A counter for the total number of updates to the status of a ComplianceRemediation"
            }
            MetricId::ComplianceState => {
                "A gauge for the compliance state of a ComplianceSuite. Set to 0 when COMPLIANT, 1 when NON-COMPLIANT, 2 when INCONSISTENT, and 3 when ERROR"
            }
        }
    }

    pub fn label_names(self) -> &'static [&'static str] {
        match self {
            MetricId::ComplianceScanStatus => &SCAN_STATUS_LABELS,
            MetricId::ComplianceScanError => &SCAN_ERROR_LABELS,
            MetricId::ComplianceRemediationStatus => &REMEDIATION_STATUS_LABELS,
            MetricId::ComplianceState => &COMPLIANCE_STATE_LABELS,
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            MetricId::ComplianceState => MetricKind::Gauge,
            _ => MetricKind::Counter,
        }
    }
}

impl std::fmt::Display for MetricId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.base_name())
    }
}

/// Immutable description of one metric family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDefinition {
    name: String,
    help: String,
    label_names: &'static [&'static str],
    kind: MetricKind,
    const_labels: BTreeMap<String, String>,
}

impl MetricDefinition {
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        label_names: &'static [&'static str],
        kind: MetricKind,
    ) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            label_names,
            kind,
            const_labels: BTreeMap::new(),
        }
    }

    /// Attach a constant label carried by every series of the family
    pub fn with_const_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.const_labels.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn label_names(&self) -> &'static [&'static str] {
        self.label_names
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn const_labels(&self) -> &BTreeMap<String, String> {
        &self.const_labels
    }

    fn opts(&self) -> Opts {
        let opts = Opts::new(self.name.clone(), self.help.clone());
        if self.const_labels.is_empty() {
            return opts;
        }
        opts.const_labels(
            self.const_labels
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<HashMap<_, _>>(),
        )
    }
}

/// The fixed set of metric definitions owned by a facade instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCatalog {
    definitions: BTreeMap<MetricId, MetricDefinition>,
}

impl MetricCatalog {
    /// Build the catalog with default names and no constant labels
    pub fn new() -> Self {
        Self::from_config(&MetricsConfig::default())
    }

    /// Build the catalog, applying the configured namespace and constant labels
    pub fn from_config(config: &MetricsConfig) -> Self {
        let definitions = MetricId::ALL
            .into_iter()
            .map(|id| {
                let mut definition = MetricDefinition::new(
                    config.qualified_name(id.base_name()),
                    id.help(),
                    id.label_names(),
                    id.kind(),
                );
                for (key, value) in &config.const_labels {
                    definition = definition.with_const_label(key.as_str(), value.as_str());
                }
                (id, definition)
            })
            .collect();

        Self { definitions }
    }

    pub fn get(&self, id: MetricId) -> Option<&MetricDefinition> {
        self.definitions.get(&id)
    }

    /// Definitions in registration order
    pub fn iter(&self) -> impl Iterator<Item = (MetricId, &MetricDefinition)> {
        self.definitions.iter().map(|(id, def)| (*id, def))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Backend-owned family handle
///
/// Cloning is cheap: clones share the same underlying child series.
#[derive(Clone)]
pub enum MetricFamily {
    Counter {
        name: String,
        label_names: &'static [&'static str],
        vec: IntCounterVec,
    },
    Gauge {
        name: String,
        label_names: &'static [&'static str],
        vec: IntGaugeVec,
    },
}

impl MetricFamily {
    /// Build the label-keyed vector described by `definition`
    pub fn from_definition(definition: &MetricDefinition) -> Result<Self> {
        let name = definition.name().to_string();
        let opts = definition.opts();
        let label_names = definition.label_names();
        let family = match definition.kind() {
            MetricKind::Counter => MetricFamily::Counter {
                vec: IntCounterVec::new(opts, label_names)
                    .map_err(|e| from_prometheus_error(e).with_metric_name(&name))?,
                name,
                label_names,
            },
            MetricKind::Gauge => MetricFamily::Gauge {
                vec: IntGaugeVec::new(opts, label_names)
                    .map_err(|e| from_prometheus_error(e).with_metric_name(&name))?,
                name,
                label_names,
            },
        };
        Ok(family)
    }

    pub fn name(&self) -> &str {
        match self {
            MetricFamily::Counter { name, .. } | MetricFamily::Gauge { name, .. } => name,
        }
    }

    pub fn label_names(&self) -> &'static [&'static str] {
        match self {
            MetricFamily::Counter { label_names, .. }
            | MetricFamily::Gauge { label_names, .. } => label_names,
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            MetricFamily::Counter { .. } => MetricKind::Counter,
            MetricFamily::Gauge { .. } => MetricKind::Gauge,
        }
    }

    /// Boxed collector for handing to a registry
    pub fn collector(&self) -> Box<dyn Collector> {
        match self {
            MetricFamily::Counter { vec, .. } => Box::new(vec.clone()),
            MetricFamily::Gauge { vec, .. } => Box::new(vec.clone()),
        }
    }

    /// Increment the child series for `values` by one, creating it if absent
    ///
    /// # Panics
    ///
    /// Panics if `values` does not match the family's label names.
    pub fn inc(&self, values: &[&str]) {
        match self {
            MetricFamily::Counter { vec, .. } => vec.with_label_values(values).inc(),
            MetricFamily::Gauge { vec, .. } => vec.with_label_values(values).inc(),
        }
    }

    /// Set the child series for `values`
    ///
    /// # Panics
    ///
    /// Panics on a counter family, or if `values` does not match the family's
    /// label names.
    pub fn set(&self, values: &[&str], value: i64) {
        match self {
            MetricFamily::Gauge { vec, .. } => vec.with_label_values(values).set(value),
            MetricFamily::Counter { name, .. } => {
                panic!("cannot set counter family {name}; counters only increase")
            }
        }
    }

    /// Read back the current value of the child series for `values`
    ///
    /// Only series that already exist are found; reading never creates one.
    pub fn value(&self, values: &[&str]) -> Result<f64> {
        let label_names = self.label_names();
        if values.len() != label_names.len() {
            return Err(from_prometheus_error(prometheus::Error::InconsistentCardinality {
                expect: label_names.len(),
                got: values.len(),
            })
            .with_metric_name(self.name()));
        }

        let collected = match self {
            MetricFamily::Counter { vec, .. } => vec.collect(),
            MetricFamily::Gauge { vec, .. } => vec.collect(),
        };

        for mf in &collected {
            for m in mf.get_metric() {
                let matches = label_names.iter().zip(values).all(|(name, value)| {
                    m.get_label()
                        .iter()
                        .any(|lp| lp.get_name() == *name && lp.get_value() == *value)
                });
                if !matches {
                    continue;
                }
                return Ok(match self {
                    MetricFamily::Counter { .. } => m.get_counter().get_value(),
                    MetricFamily::Gauge { .. } => m.get_gauge().get_value(),
                });
            }
        }

        Err(metrics_backend_error(
            self.name(),
            format!("series not found for label values {values:?}"),
        ))
    }
}

impl std::fmt::Debug for MetricFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricFamily")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_default_names() {
        let catalog = MetricCatalog::new();
        assert_eq!(catalog.len(), MetricId::ALL.len());

        let scan_status = catalog.get(MetricId::ComplianceScanStatus).unwrap();
        assert_eq!(scan_status.name(), "compliance_scan_status");
        assert_eq!(
            scan_status.label_names(),
            &["scan_name", "scan_result", "scan_phase"]
        );
        assert_eq!(scan_status.kind(), MetricKind::Counter);
    }

    #[test]
    fn test_catalog_order_matches_ids() {
        let catalog = MetricCatalog::new();
        let ids: Vec<MetricId> = catalog.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, MetricId::ALL.to_vec());
    }

    #[test]
    fn test_catalog_names_unique() {
        let catalog = MetricCatalog::new();
        let mut names: Vec<&str> = catalog.iter().map(|(_, def)| def.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_catalog_with_namespace_and_const_labels() {
        let config = MetricsConfig::default()
            .with_namespace("compliance_operator")
            .with_const_label("operator_namespace", "openshift-compliance");
        let catalog = MetricCatalog::from_config(&config);

        let state = catalog.get(MetricId::ComplianceState).unwrap();
        assert_eq!(state.name(), "compliance_operator_compliance_state");
        assert_eq!(
            state.const_labels().get("operator_namespace"),
            Some(&"openshift-compliance".to_string())
        );
        assert_eq!(state.kind(), MetricKind::Gauge);
    }

    #[test]
    fn test_metric_kind_display() {
        assert_eq!(MetricKind::Counter.to_string(), "counter");
        assert_eq!(MetricKind::Gauge.to_string(), "gauge");
    }

    #[test]
    fn test_family_counter_inc_and_value() {
        let catalog = MetricCatalog::new();
        let definition = catalog.get(MetricId::ComplianceScanError).unwrap();
        let family = MetricFamily::from_definition(definition).unwrap();

        family.inc(&["ocp4-cis", "timeout"]);
        family.inc(&["ocp4-cis", "timeout"]);

        assert_eq!(family.kind(), MetricKind::Counter);
        assert_eq!(family.value(&["ocp4-cis", "timeout"]).unwrap(), 2.0);
    }

    #[test]
    fn test_family_gauge_set() {
        let catalog = MetricCatalog::new();
        let definition = catalog.get(MetricId::ComplianceState).unwrap();
        let family = MetricFamily::from_definition(definition).unwrap();

        family.set(&["cis-suite"], 2);
        assert_eq!(family.value(&["cis-suite"]).unwrap(), 2.0);
    }

    #[test]
    #[should_panic(expected = "cannot set counter family")]
    fn test_family_counter_set_panics() {
        let catalog = MetricCatalog::new();
        let definition = catalog.get(MetricId::ComplianceScanStatus).unwrap();
        let family = MetricFamily::from_definition(definition).unwrap();

        family.set(&["foo", "bar", "baz"], 1);
    }

    #[test]
    fn test_family_value_wrong_cardinality() {
        let catalog = MetricCatalog::new();
        let definition = catalog.get(MetricId::ComplianceScanStatus).unwrap();
        let family = MetricFamily::from_definition(definition).unwrap();

        let error = family.value(&["foo"]).unwrap_err();
        assert!(error.to_string().contains("compliance_scan_status"));
    }

    #[test]
    fn test_family_value_of_unseen_series() {
        let catalog = MetricCatalog::new();
        let definition = catalog.get(MetricId::ComplianceScanStatus).unwrap();
        let family = MetricFamily::from_definition(definition).unwrap();
        family.inc(&["foo", "bar", "baz"]);

        let error = family.value(&["never", "seen", "tuple"]).unwrap_err();
        assert!(error.to_string().contains("series not found"));

        // The failed read left no child behind
        let series: usize = family
            .collector()
            .collect()
            .iter()
            .map(|mf| mf.get_metric().len())
            .sum();
        assert_eq!(series, 1);
    }

    #[test]
    fn test_family_value_with_const_labels() {
        let config = MetricsConfig::default().with_const_label("cluster", "prod");
        let catalog = MetricCatalog::from_config(&config);
        let definition = catalog.get(MetricId::ComplianceState).unwrap();
        let family = MetricFamily::from_definition(definition).unwrap();

        family.set(&["cis-suite"], 1);
        assert_eq!(family.value(&["cis-suite"]).unwrap(), 1.0);
    }

    #[test]
    #[should_panic]
    fn test_family_inc_wrong_cardinality_panics() {
        let catalog = MetricCatalog::new();
        let definition = catalog.get(MetricId::ComplianceScanStatus).unwrap();
        let family = MetricFamily::from_definition(definition).unwrap();

        family.inc(&["foo"]);
    }

    #[test]
    #[should_panic]
    fn test_family_gauge_set_wrong_cardinality_panics() {
        let catalog = MetricCatalog::new();
        let definition = catalog.get(MetricId::ComplianceState).unwrap();
        let family = MetricFamily::from_definition(definition).unwrap();

        family.set(&["a", "b"], 1);
    }
}
