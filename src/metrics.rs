//! The metrics facade
//!
//! [`Metrics`] owns the catalog, registers it once through the injected
//! backend, and turns controller events into child series updates.

use super::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Metrics facade for the compliance controller
///
/// Call [`register`](Metrics::register) once during startup, before the
/// facade is shared with workers. Update operations take `&self` and are
/// safe to call concurrently; the backend's families synchronize child
/// creation and increments.
///
/// Calling [`register`](Metrics::register) a second time is a caller error.
/// It is not guarded here: the backend sees duplicate registrations and
/// rejects them.
pub struct Metrics {
    catalog: MetricCatalog,
    families: HashMap<MetricId, MetricFamily>,
    backend: Arc<dyn MetricsBackend>,
}

impl Metrics {
    /// Facade over the process-wide Prometheus registry
    ///
    /// Only builds the catalog; the registry is untouched until
    /// [`register`](Metrics::register).
    pub fn new() -> Self {
        Self::with_backend(Arc::new(PrometheusBackend::new()))
    }

    /// Facade over an injected backend, with default metric names
    pub fn with_backend(backend: Arc<dyn MetricsBackend>) -> Self {
        Self::from_catalog(MetricCatalog::new(), backend)
    }

    /// Facade over an injected backend with a namespace or constant labels
    pub fn with_config(config: &MetricsConfig, backend: Arc<dyn MetricsBackend>) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_catalog(
            MetricCatalog::from_config(config),
            backend,
        ))
    }

    fn from_catalog(catalog: MetricCatalog, backend: Arc<dyn MetricsBackend>) -> Self {
        debug!(
            metrics = catalog.len(),
            backend = backend.name(),
            "Built metric catalog"
        );
        Self {
            catalog,
            families: HashMap::new(),
            backend,
        }
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Create and register every catalog family, in catalog order
    ///
    /// Stops at the first family the backend refuses and returns an error
    /// naming it. Families registered before the failure stay registered and
    /// stay usable.
    pub fn register(&mut self) -> Result<()> {
        for (id, definition) in self.catalog.iter() {
            info!(
                metric = definition.name(),
                kind = %definition.kind(),
                backend = self.backend.name(),
                "Registering metric"
            );

            let family = self
                .backend
                .new_family(definition)
                .and_then(|family| self.backend.register(&family).map(|_| family))
                .map_err(|e| {
                    error!(metric = definition.name(), error = %e, "Failed to register metric");
                    metrics_registration_error(definition.name(), e.to_string())
                })?;

            self.families.insert(id, family);
        }

        Ok(())
    }

    /// Whether every catalog family has been registered
    ///
    /// Host processes can gate readiness on this so they never serve with a
    /// partial metric set.
    pub fn is_registered(&self) -> bool {
        self.catalog.iter().all(|(id, _)| self.families.contains_key(&id))
    }

    /// Count one status update of a ComplianceScan
    ///
    /// # Panics
    ///
    /// Panics if called before [`register`](Metrics::register) succeeded.
    pub fn inc_compliance_scan_status(&self, scan_name: &str, status: &ComplianceScanStatus) {
        self.inc(&ScanStatusLabels::new(scan_name, status));
    }

    /// Count one error encountered while running a ComplianceScan
    ///
    /// # Panics
    ///
    /// Panics if called before [`register`](Metrics::register) succeeded.
    pub fn inc_compliance_scan_error(&self, scan_name: &str, error: &str) {
        self.inc(&ScanErrorLabels { scan_name, error });
    }

    /// Count one state change of a ComplianceRemediation
    ///
    /// # Panics
    ///
    /// Panics if called before [`register`](Metrics::register) succeeded.
    pub fn inc_compliance_remediation_status(&self, remediation_name: &str, state: &str) {
        self.inc(&RemediationStatusLabels {
            remediation_name,
            remediation_state: state,
        });
    }

    /// Record the aggregate compliance state of a ComplianceSuite
    ///
    /// # Panics
    ///
    /// Panics if called before [`register`](Metrics::register) succeeded.
    pub fn set_compliance_state(&self, suite_name: &str, state: ComplianceState) {
        self.family(MetricId::ComplianceState)
            .set(&ComplianceStateLabels { suite_name }.values(), state.gauge_value());
    }

    fn inc<const N: usize, L: SeriesLabels<N>>(&self, labels: &L) {
        self.family(L::METRIC).inc(&labels.values());
    }

    fn family(&self, id: MetricId) -> &MetricFamily {
        match self.families.get(&id) {
            Some(family) => family,
            None => panic!("metric {id} updated before registration"),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("catalog", &self.catalog)
            .field("registered", &self.families.len())
            .field("backend", &self.backend.name())
            .finish()
    }
}
