//! # TYL Compliance Metrics
//!
//! Metrics facade for the compliance controller.
//!
//! The facade defines a fixed catalog of labeled Prometheus series for
//! compliance domain events, registers the catalog once at startup, and
//! translates events into child series updates:
//!
//! - **Facade**: [`Metrics`] with one update operation per tracked event
//! - **Backend Port**: [`MetricsBackend`] trait, injected into the facade
//! - **Adapters**: [`PrometheusBackend`] for production, [`FakeBackend`] for tests
//!
//! ## Metrics
//! - `compliance_scan_status{scan_name, scan_result, scan_phase}` - Counter
//! - `compliance_scan_error{scan_name, error}` - Counter
//! - `compliance_remediation_status{remediation_name, remediation_state}` - Counter
//! - `compliance_state{suite_name}` - Gauge (0 compliant, 1 non-compliant, 2 inconsistent, 3 error)
//!
//! These names are a compatibility surface for dashboards and alerts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tyl_compliance_metrics::{ComplianceScanStatus, Metrics};
//!
//! # fn main() -> tyl_compliance_metrics::Result<()> {
//! let mut metrics = Metrics::new();
//! // Startup: a registration failure must stop the process
//! metrics.register()?;
//!
//! // Controller event loop
//! metrics.inc_compliance_scan_status("ocp4-cis", &ComplianceScanStatus::new("COMPLIANT", "DONE"));
//! # Ok(())
//! # }
//! ```
//!
//! ## HTTP Server
//! This crate does NOT serve `/metrics`. Expose
//! [`PrometheusBackend::render`] through the host application's HTTP stack.

// Re-export TYL framework functionality
pub use tyl_errors::{TylError, TylResult};

mod config;
pub use config::MetricsConfig;

mod types;
pub use types::{
    MetricCatalog, MetricDefinition, MetricFamily, MetricId, MetricKind, LABEL_ERROR,
    LABEL_REMEDIATION_NAME, LABEL_REMEDIATION_STATE, LABEL_SCAN_NAME, LABEL_SCAN_PHASE,
    LABEL_SCAN_RESULT, LABEL_SUITE_NAME,
};

mod events;
pub use events::{
    ComplianceScanStatus, ComplianceState, ComplianceStateLabels, RemediationStatusLabels,
    ScanErrorLabels, ScanStatusLabels, SeriesLabels,
};

// Backend port and its adapters
mod port;
pub use port::MetricsBackend;

mod backend;
pub use backend::PrometheusBackend;

mod mock;
pub use mock::{FakeBackend, FakeBackendConfig};

mod metrics;
pub use metrics::Metrics;

mod errors;
pub use errors::{
    from_prometheus_error, from_serde_json_error, metrics_backend_error, metrics_config_error,
    metrics_error, metrics_registration_error, MetricsErrorExt,
};

mod utils;
pub use utils::{
    validate_definition, validate_label_key, validate_label_value, validate_metric_name,
};

/// Result type for metrics operations using TYL error handling
pub type Result<T> = TylResult<T>;
