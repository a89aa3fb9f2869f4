//! Prometheus backend
//!
//! Registers families with a `prometheus::Registry`. By default that is the
//! crate-global default registry, shared by everything in the process that
//! uses the `prometheus` crate.
//!
//! This module does not serve `/metrics`. Use the host application's HTTP
//! framework and hand it [`PrometheusBackend::render`]:
//!
//! ```rust,ignore
//! async fn metrics_handler(State(backend): State<Arc<PrometheusBackend>>) -> String {
//!     backend.render().unwrap_or_default()
//! }
//! ```

use super::*;
use prometheus::proto;
use prometheus::{Encoder, Registry, TextEncoder};

const BACKEND_NAME: &str = "prometheus";

/// Production [`MetricsBackend`] over a `prometheus::Registry`
#[derive(Clone)]
pub struct PrometheusBackend {
    registry: Registry,
}

impl PrometheusBackend {
    /// Backend over the process-wide default registry
    pub fn new() -> Self {
        Self {
            registry: prometheus::default_registry().clone(),
        }
    }

    /// Backend over a caller-owned registry
    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Current state of every registered family
    pub fn gather(&self) -> Vec<proto::MetricFamily> {
        self.registry.gather()
    }

    /// Current state in the Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.gather(), &mut buffer)
            .map_err(from_prometheus_error)?;
        String::from_utf8(buffer)
            .map_err(|e| metrics_backend_error(BACKEND_NAME, format!("Non UTF-8 exposition: {e}")))
    }
}

impl Default for PrometheusBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsBackend for PrometheusBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn register(&self, family: &MetricFamily) -> Result<()> {
        self.registry
            .register(family.collector())
            .map_err(from_prometheus_error)
    }
}
