//! Backend capability consumed by the metrics facade
//!
//! The facade never talks to a registry directly. It asks a
//! [`MetricsBackend`] to build families and to register them, so tests can
//! swap in [`FakeBackend`](crate::FakeBackend) without any conditional code
//! in the facade.

use super::*;

/// **Backend Capability** for the metrics facade
///
/// Implementations must be thread-safe: registration happens once at
/// startup, but the families they hand out are mutated concurrently by
/// controller workers.
///
/// ## Example Implementation
/// ```rust
/// use tyl_compliance_metrics::{MetricFamily, MetricsBackend, Result};
///
/// struct DiscardingBackend;
///
/// impl MetricsBackend for DiscardingBackend {
///     fn name(&self) -> &str {
///         "discard"
///     }
///
///     fn register(&self, _family: &MetricFamily) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait MetricsBackend: Send + Sync {
    /// Short backend identifier used in logs and errors
    fn name(&self) -> &str;

    /// Create the family described by `definition`
    ///
    /// The default builds a `prometheus` counter or gauge vector, which gives
    /// thread-safe lazy child creation and atomic updates.
    fn new_family(&self, definition: &MetricDefinition) -> Result<MetricFamily> {
        validate_definition(definition)?;
        MetricFamily::from_definition(definition)
    }

    /// Register `family` with the process-wide registry
    ///
    /// Fails if a family with the same name is already registered, or for
    /// backend-specific reasons.
    fn register(&self, family: &MetricFamily) -> Result<()>;
}
