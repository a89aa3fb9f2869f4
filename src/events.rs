//! Domain event payloads and their typed label records
//!
//! Each update operation on [`Metrics`](crate::Metrics) builds exactly one
//! label record. The record fixes the label arity at compile time, so a
//! mismatched label set cannot reach the backend.

use crate::types::MetricId;
use serde::{Deserialize, Serialize};

/// Status block of a ComplianceScan as reported by the controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceScanStatus {
    /// Scan result, e.g. `COMPLIANT`, `NON-COMPLIANT`, `ERROR`
    pub result: String,

    /// Scan phase, e.g. `PENDING`, `RUNNING`, `AGGREGATING`, `DONE`
    pub phase: String,
}

impl ComplianceScanStatus {
    pub fn new(result: impl Into<String>, phase: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            phase: phase.into(),
        }
    }
}

/// Aggregate compliance state of a ComplianceSuite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum ComplianceState {
    Compliant,
    NonCompliant,
    Inconsistent,
    Error,
}

impl ComplianceState {
    /// Value written to the `compliance_state` gauge
    pub fn gauge_value(self) -> i64 {
        match self {
            ComplianceState::Compliant => 0,
            ComplianceState::NonCompliant => 1,
            ComplianceState::Inconsistent => 2,
            ComplianceState::Error => 3,
        }
    }
}

impl std::fmt::Display for ComplianceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceState::Compliant => write!(f, "COMPLIANT"),
            ComplianceState::NonCompliant => write!(f, "NON-COMPLIANT"),
            ComplianceState::Inconsistent => write!(f, "INCONSISTENT"),
            ComplianceState::Error => write!(f, "ERROR"),
        }
    }
}

/// Label values for one child series of a specific metric
///
/// `N` must equal the number of label names the catalog declares for
/// `METRIC`, and `values()` must return them in declaration order.
pub trait SeriesLabels<const N: usize> {
    const METRIC: MetricId;

    fn values(&self) -> [&str; N];
}

/// `compliance_scan_status{scan_name, scan_result, scan_phase}`
#[derive(Debug, Clone, Copy)]
pub struct ScanStatusLabels<'a> {
    pub scan_name: &'a str,
    pub scan_result: &'a str,
    pub scan_phase: &'a str,
}

impl<'a> ScanStatusLabels<'a> {
    pub fn new(scan_name: &'a str, status: &'a ComplianceScanStatus) -> Self {
        Self {
            scan_name,
            scan_result: &status.result,
            scan_phase: &status.phase,
        }
    }
}

impl SeriesLabels<3> for ScanStatusLabels<'_> {
    const METRIC: MetricId = MetricId::ComplianceScanStatus;

    fn values(&self) -> [&str; 3] {
        [self.scan_name, self.scan_result, self.scan_phase]
    }
}

/// `compliance_scan_error{scan_name, error}`
#[derive(Debug, Clone, Copy)]
pub struct ScanErrorLabels<'a> {
    pub scan_name: &'a str,
    pub error: &'a str,
}

impl SeriesLabels<2> for ScanErrorLabels<'_> {
    const METRIC: MetricId = MetricId::ComplianceScanError;

    fn values(&self) -> [&str; 2] {
        [self.scan_name, self.error]
    }
}

/// `compliance_remediation_status{remediation_name, remediation_state}`
#[derive(Debug, Clone, Copy)]
pub struct RemediationStatusLabels<'a> {
    pub remediation_name: &'a str,
    pub remediation_state: &'a str,
}

impl SeriesLabels<2> for RemediationStatusLabels<'_> {
    const METRIC: MetricId = MetricId::ComplianceRemediationStatus;

    fn values(&self) -> [&str; 2] {
        [self.remediation_name, self.remediation_state]
    }
}

/// `compliance_state{suite_name}`
#[derive(Debug, Clone, Copy)]
pub struct ComplianceStateLabels<'a> {
    pub suite_name: &'a str,
}

impl SeriesLabels<1> for ComplianceStateLabels<'_> {
    const METRIC: MetricId = MetricId::ComplianceState;

    fn values(&self) -> [&str; 1] {
        [self.suite_name]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_arity<const N: usize, L: SeriesLabels<N>>(_: &L) {
        assert_eq!(L::METRIC.label_names().len(), N, "{}", L::METRIC);
    }

    #[test]
    fn test_label_records_match_catalog_arity() {
        let status = ComplianceScanStatus::new("COMPLIANT", "DONE");
        assert_arity(&ScanStatusLabels::new("ocp4-cis", &status));
        assert_arity(&ScanErrorLabels {
            scan_name: "ocp4-cis",
            error: "timeout",
        });
        assert_arity(&RemediationStatusLabels {
            remediation_name: "r1",
            remediation_state: "Applied",
        });
        assert_arity(&ComplianceStateLabels { suite_name: "s1" });
    }

    #[test]
    fn test_scan_status_labels_order() {
        let status = ComplianceScanStatus::new("bar", "baz");
        let labels = ScanStatusLabels::new("foo", &status);
        assert_eq!(labels.values(), ["foo", "bar", "baz"]);
    }

    #[test]
    fn test_compliance_state_gauge_values() {
        assert_eq!(ComplianceState::Compliant.gauge_value(), 0);
        assert_eq!(ComplianceState::NonCompliant.gauge_value(), 1);
        assert_eq!(ComplianceState::Inconsistent.gauge_value(), 2);
        assert_eq!(ComplianceState::Error.gauge_value(), 3);
    }

    #[test]
    fn test_compliance_state_serde() {
        let state: ComplianceState = serde_json::from_str(r#""NON-COMPLIANT""#).unwrap();
        assert_eq!(state, ComplianceState::NonCompliant);
        assert_eq!(state.to_string(), "NON-COMPLIANT");
    }

    #[test]
    fn test_scan_status_deserialize() {
        let status: ComplianceScanStatus =
            serde_json::from_str(r#"{"result": "COMPLIANT", "phase": "DONE"}"#).unwrap();
        assert_eq!(status, ComplianceScanStatus::new("COMPLIANT", "DONE"));
    }
}
