//! Metrics definitions for connection resolution.
//!
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`. Without an installed
//! recorder every call here is a no-op.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "connections_resolved_total",
        "Total number of connection fields successfully resolved"
    );
    describe_counter!(
        "connection_errors_total",
        "Total number of failed connection resolutions"
    );
    describe_histogram!(
        "connection_window_size",
        "Number of edges in a resolved connection window"
    );
    describe_histogram!(
        "connection_resolution_duration_seconds",
        "Time taken to resolve a connection in seconds"
    );
}

/// Record a successfully resolved connection.
///
/// # Arguments
/// * `relation` - The relation name (e.g. "user_pets")
/// * `window_size` - Number of edges in the window
pub fn record_connection_resolved(relation: &'static str, window_size: usize) {
    counter!("connections_resolved_total", "relation" => relation).increment(1);
    histogram!("connection_window_size", "relation" => relation).record(window_size as f64);
}

/// Record a failed connection resolution.
///
/// # Arguments
/// * `relation` - The relation name
/// * `kind` - The error code (e.g. "INVALID_CURSOR")
pub fn record_connection_error(relation: &'static str, kind: &'static str) {
    counter!("connection_errors_total", "relation" => relation, "kind" => kind).increment(1);
}

/// A timer that records resolution duration when dropped.
///
/// `stage` is either "ids" (identifier fetch and windowing) or "edges"
/// (batch node fetch).
pub struct ResolutionTimer {
    relation: &'static str,
    stage: &'static str,
    start: Instant,
}

impl ResolutionTimer {
    /// Start a new timer for one stage of a relation's resolution.
    pub fn new(relation: &'static str, stage: &'static str) -> Self {
        Self {
            relation,
            stage,
            start: Instant::now(),
        }
    }
}

impl Drop for ResolutionTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        histogram!(
            "connection_resolution_duration_seconds",
            "relation" => self.relation,
            "stage" => self.stage
        )
        .record(duration);
    }
}
