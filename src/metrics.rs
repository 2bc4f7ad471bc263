//! Directory Metrics
//!
//! Prometheus counters for directory operations, labelled by resource
//! kind, operation and outcome.

use crate::error::{Error, Result};
use crate::model::ResourceKind;
use prometheus::{IntCounterVec, Opts, Registry};

/// Counter name exposed on `/metrics`
pub const OPERATIONS_TOTAL: &str = "resource_directory_operations_total";

/// Operation counters
#[derive(Debug, Clone)]
pub struct DirectoryMetrics {
    operations: IntCounterVec,
}

impl DirectoryMetrics {
    /// Create the counters and register them on `registry`
    pub fn register(registry: &Registry) -> Result<Self> {
        let operations = IntCounterVec::new(
            Opts::new(OPERATIONS_TOTAL, "Directory operations by kind and outcome"),
            &["kind", "operation", "outcome"],
        )
        .map_err(|e| Error::Internal(format!("failed to create metrics: {}", e)))?;
        registry
            .register(Box::new(operations.clone()))
            .map_err(|e| Error::Internal(format!("failed to register metrics: {}", e)))?;
        Ok(Self { operations })
    }

    /// Count one operation
    pub fn record<T>(&self, kind: ResourceKind, operation: &str, result: &Result<T>) {
        let outcome = match result {
            Ok(_) => "success",
            Err(Error::NotFound { .. }) => "not_found",
            Err(Error::PermissionDenied { .. }) => "denied",
            Err(_) => "error",
        };
        self.operations
            .with_label_values(&[&kind.to_string(), operation, outcome])
            .inc();
    }

    /// Current count for a label set
    pub fn count(&self, kind: ResourceKind, operation: &str, outcome: &str) -> u64 {
        self.operations
            .with_label_values(&[&kind.to_string(), operation, outcome])
            .get()
    }
}
