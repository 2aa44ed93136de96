//! Metrics for DAO operations.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Metric names for DAO operations.
pub mod names {
    /// Total operations dispatched to the blocking pool.
    pub const OPERATIONS_TOTAL: &str = "daogen_dao_operations_total";
    /// Total operations that completed with a failure.
    pub const OPERATION_FAILURES_TOTAL: &str = "daogen_dao_operation_failures_total";
    /// Time from submission to completion, in seconds.
    pub const OPERATION_DURATION_SECONDS: &str = "daogen_dao_operation_duration_seconds";
}

/// Register all metric descriptions. Call once at startup, after installing a recorder.
pub fn register_metrics() {
    describe_counter!(
        names::OPERATIONS_TOTAL,
        "Total number of DAO operations dispatched"
    );
    describe_counter!(
        names::OPERATION_FAILURES_TOTAL,
        "Total number of DAO operations that failed"
    );
    describe_histogram!(
        names::OPERATION_DURATION_SECONDS,
        "DAO operation duration in seconds, including queueing for a worker"
    );
}

/// DAO metrics recorder.
#[derive(Clone)]
pub struct DaoMetrics;

impl DaoMetrics {
    /// Record one completed operation.
    pub fn operation_completed(table: &str, operation: &'static str, duration: Duration, succeeded: bool) {
        counter!(
            names::OPERATIONS_TOTAL,
            "table" => table.to_string(),
            "operation" => operation
        )
        .increment(1);

        if !succeeded {
            counter!(
                names::OPERATION_FAILURES_TOTAL,
                "table" => table.to_string(),
                "operation" => operation
            )
            .increment(1);
        }

        histogram!(
            names::OPERATION_DURATION_SECONDS,
            "table" => table.to_string(),
            "operation" => operation
        )
        .record(duration.as_secs_f64());
    }
}
