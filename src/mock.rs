//! Recording fake backend for tests and demos
//!
//! [`FakeBackend`] accepts families into an in-memory list instead of a
//! Prometheus registry. Tests use it to force registration failures and to
//! read back child series values without a scrape pipeline.

use super::*;
use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError, RwLock};

const BACKEND_NAME: &str = "fake";

/// Failure injection for the fake backend
#[derive(Debug, Clone, PartialEq)]
pub struct FakeBackendConfig {
    /// Reject every registration
    pub fail_all: bool,

    /// Reject registration of these metric names only
    pub fail_on: BTreeSet<String>,

    /// Probability (0.0 to 1.0) of rejecting any single registration
    pub failure_rate: f64,

    /// Reject a name that was already accepted, as a real registry does
    pub reject_duplicates: bool,
}

impl Default for FakeBackendConfig {
    fn default() -> Self {
        Self {
            fail_all: false,
            fail_on: BTreeSet::new(),
            failure_rate: 0.0,
            reject_duplicates: true,
        }
    }
}

impl FakeBackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every registration
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Reject registration of `name`
    pub fn failing_on(mut self, name: impl Into<String>) -> Self {
        self.fail_on.insert(name.into());
        self
    }

    /// Reject registrations at random with the given probability
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_duplicate_check(mut self, reject: bool) -> Self {
        self.reject_duplicates = reject;
        self
    }
}

/// In-memory [`MetricsBackend`] that records every call
///
/// ## Example Usage
/// ```rust
/// use std::sync::Arc;
/// use tyl_compliance_metrics::{ComplianceScanStatus, FakeBackend, Metrics};
///
/// let backend = Arc::new(FakeBackend::default());
/// let mut metrics = Metrics::with_backend(backend.clone());
/// metrics.register().unwrap();
///
/// metrics.inc_compliance_scan_status("foo", &ComplianceScanStatus::new("bar", "baz"));
///
/// let value = backend.value("compliance_scan_status", &["foo", "bar", "baz"]).unwrap();
/// assert_eq!(value, 1.0);
/// ```
pub struct FakeBackend {
    config: FakeBackendConfig,

    /// Every name passed to `register`, accepted or not
    attempts: RwLock<Vec<String>>,

    /// Accepted families in registration order
    registered: RwLock<Vec<MetricFamily>>,

    rng: Mutex<fastrand::Rng>,
}

impl FakeBackend {
    pub fn new(config: FakeBackendConfig) -> Self {
        Self {
            config,
            attempts: RwLock::new(Vec::new()),
            registered: RwLock::new(Vec::new()),
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Backend that rejects every registration
    pub fn failing() -> Self {
        Self::new(FakeBackendConfig::new().failing())
    }

    pub fn config(&self) -> &FakeBackendConfig {
        &self.config
    }

    /// Names of every registration attempt, in call order
    pub fn register_attempts(&self) -> Vec<String> {
        self.attempts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Names of accepted families, in registration order
    pub fn registered_names(&self) -> Vec<String> {
        self.registered
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|family| family.name().to_string())
            .collect()
    }

    /// Accepted family with the given name
    pub fn family(&self, name: &str) -> Option<MetricFamily> {
        self.registered
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|family| family.name() == name)
            .cloned()
    }

    /// Current value of one child series of an accepted family
    pub fn value(&self, name: &str, label_values: &[&str]) -> Result<f64> {
        self.family(name)
            .ok_or_else(|| metrics_backend_error(BACKEND_NAME, format!("{name} is not registered")))?
            .value(label_values)
    }

    /// Forget every recorded call and accepted family
    pub fn clear(&self) {
        self.attempts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.registered
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn should_fail(&self, name: &str) -> bool {
        if self.config.fail_all || self.config.fail_on.contains(name) {
            return true;
        }
        if self.config.failure_rate <= 0.0 {
            return false;
        }

        let random_value = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .f64();
        random_value < self.config.failure_rate
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new(FakeBackendConfig::default())
    }
}

impl MetricsBackend for FakeBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn register(&self, family: &MetricFamily) -> Result<()> {
        self.attempts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(family.name().to_string());

        if self.should_fail(family.name()) {
            return Err(metrics_backend_error(
                BACKEND_NAME,
                "Simulated registration failure",
            ));
        }

        let mut registered = self
            .registered
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if self.config.reject_duplicates && registered.iter().any(|f| f.name() == family.name()) {
            return Err(metrics_backend_error(
                BACKEND_NAME,
                "Duplicate metrics collector registration attempted",
            ));
        }

        registered.push(family.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(id: MetricId) -> MetricFamily {
        let catalog = MetricCatalog::new();
        MetricFamily::from_definition(catalog.get(id).unwrap()).unwrap()
    }

    #[test]
    fn test_records_accepted_families() {
        let backend = FakeBackend::default();

        backend.register(&family(MetricId::ComplianceScanStatus)).unwrap();
        backend.register(&family(MetricId::ComplianceState)).unwrap();

        assert_eq!(
            backend.registered_names(),
            vec!["compliance_scan_status", "compliance_state"]
        );
        assert_eq!(backend.register_attempts().len(), 2);
    }

    #[test]
    fn test_failing_backend_records_attempt() {
        let backend = FakeBackend::failing();

        let error = backend
            .register(&family(MetricId::ComplianceScanStatus))
            .unwrap_err();

        assert!(error.to_string().contains("Simulated registration failure"));
        assert_eq!(backend.register_attempts(), vec!["compliance_scan_status"]);
        assert!(backend.registered_names().is_empty());
    }

    #[test]
    fn test_failing_on_single_name() {
        let backend =
            FakeBackend::new(FakeBackendConfig::new().failing_on("compliance_scan_error"));

        assert!(backend.register(&family(MetricId::ComplianceScanStatus)).is_ok());
        assert!(backend.register(&family(MetricId::ComplianceScanError)).is_err());
        assert_eq!(backend.registered_names(), vec!["compliance_scan_status"]);
    }

    #[test]
    fn test_full_failure_rate() {
        let backend = FakeBackend::new(FakeBackendConfig::new().with_failure_rate(1.0));
        assert!(backend.register(&family(MetricId::ComplianceState)).is_err());
    }

    #[test]
    fn test_failure_rate_is_clamped() {
        let config = FakeBackendConfig::new().with_failure_rate(1.5);
        assert_eq!(config.failure_rate, 1.0);
    }

    #[test]
    fn test_duplicate_rejected() {
        let backend = FakeBackend::default();

        backend.register(&family(MetricId::ComplianceState)).unwrap();
        let error = backend
            .register(&family(MetricId::ComplianceState))
            .unwrap_err();

        assert!(error.to_string().contains("Duplicate"));
        assert_eq!(backend.registered_names().len(), 1);
    }

    #[test]
    fn test_duplicate_allowed_when_check_disabled() {
        let backend = FakeBackend::new(FakeBackendConfig::new().with_duplicate_check(false));

        backend.register(&family(MetricId::ComplianceState)).unwrap();
        backend.register(&family(MetricId::ComplianceState)).unwrap();

        assert_eq!(backend.registered_names().len(), 2);
    }

    #[test]
    fn test_value_read_back() {
        let backend = FakeBackend::default();
        let scan_status = family(MetricId::ComplianceScanStatus);
        backend.register(&scan_status).unwrap();

        scan_status.inc(&["foo", "bar", "baz"]);

        assert_eq!(
            backend
                .value("compliance_scan_status", &["foo", "bar", "baz"])
                .unwrap(),
            1.0
        );
    }

    #[test]
    fn test_value_of_unseen_series() {
        let backend = FakeBackend::default();
        backend.register(&family(MetricId::ComplianceScanStatus)).unwrap();

        let error = backend
            .value("compliance_scan_status", &["foo", "bar", "baz"])
            .unwrap_err();
        assert!(error.to_string().contains("series not found"));
    }

    #[test]
    fn test_value_of_unregistered_family() {
        let backend = FakeBackend::default();
        let error = backend
            .value("compliance_scan_status", &["foo", "bar", "baz"])
            .unwrap_err();
        assert!(error.to_string().contains("not registered"));
    }

    #[test]
    fn test_clear() {
        let backend = FakeBackend::default();
        backend.register(&family(MetricId::ComplianceState)).unwrap();

        backend.clear();

        assert!(backend.register_attempts().is_empty());
        assert!(backend.registered_names().is_empty());
    }
}
