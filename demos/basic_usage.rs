//! Basic usage example for TYL Compliance Metrics
//!
//! Demonstrates the startup sequence a controller follows:
//! - build the facade over a Prometheus registry
//! - register the catalog once, treating failure as fatal
//! - feed controller events into update operations
//! - render the registry as the `/metrics` handler would
//!
//! It also shows the FakeBackend used in tests to force a registration failure.

use std::sync::Arc;
use std::thread;

use prometheus::Registry;
use tyl_compliance_metrics::{
    ComplianceScanStatus, ComplianceState, FakeBackend, FakeBackendConfig, Metrics,
    PrometheusBackend,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚀 TYL Compliance Metrics - Basic Usage Example");
    println!("================================================");

    let backend = Arc::new(PrometheusBackend::with_registry(Registry::new()));
    let mut metrics = Metrics::with_backend(backend.clone());

    // Startup: registration happens once, before workers start
    metrics.register().map_err(|e| e.to_string())?;
    println!("✅ Registered {} metric families", metrics.catalog().len());

    // Workers share the facade after registration
    let metrics = Arc::new(metrics);
    let workers: Vec<_> = ["ocp4-cis", "ocp4-cis-node-master", "rhcos4-e8"]
        .into_iter()
        .map(|scan| {
            let metrics = metrics.clone();
            thread::spawn(move || {
                for phase in ["PENDING", "LAUNCHING", "RUNNING", "AGGREGATING"] {
                    metrics.inc_compliance_scan_status(scan, &ComplianceScanStatus::new("", phase));
                }
                metrics.inc_compliance_scan_status(
                    scan,
                    &ComplianceScanStatus::new("NON-COMPLIANT", "DONE"),
                );
            })
        })
        .collect();

    for worker in workers {
        worker.join().map_err(|_| "worker panicked")?;
    }

    metrics.inc_compliance_scan_error("rhcos4-e8", "timeout waiting for scan pods");
    metrics.inc_compliance_remediation_status("ocp4-cis-api-server-audit-log-maxsize", "Applied");
    metrics.set_compliance_state("cis-compliance", ComplianceState::NonCompliant);

    println!("\n📊 Exposition output:");
    println!("{}", backend.render().map_err(|e| e.to_string())?);

    // Tests swap in a fake backend that can refuse registration
    println!("🧪 Registration against a failing backend...");
    let failing = Arc::new(FakeBackend::new(
        FakeBackendConfig::new().failing_on("compliance_scan_error"),
    ));
    let mut broken = Metrics::with_backend(failing.clone());
    match broken.register() {
        Ok(()) => println!("unexpected success"),
        Err(e) => println!("❌ {e}"),
    }
    println!("   attempted: {:?}", failing.register_attempts());
    println!("   accepted:  {:?}", failing.registered_names());

    Ok(())
}
