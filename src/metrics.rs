// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for clusterzone.
//!
//! All metrics carry the namespace prefix `clusterzone_`. The registry is not
//! exposed over HTTP; [`gather_metrics`] renders it in text format for whatever
//! exporter the deployment wires up.
//!
//! # Metrics Categories
//!
//! - **Event Metrics** - Watch events handled, by resource and action
//! - **Update Metrics** - Calls against the DNS update server and their outcome
//! - **Bootstrap Metrics** - Zone bootstrap attempts at startup
//!
//! # Example
//!
//! ```rust,no_run
//! use clusterzone::metrics::record_event;
//!
//! record_event("Service", "create", std::time::Duration::from_millis(3));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all clusterzone metrics
const METRICS_NAMESPACE: &str = "clusterzone";

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Event Metrics
// ============================================================================

/// Total number of watch events handled
///
/// Labels:
/// - `resource`: `Service` or `Endpoints`
/// - `action`: `create`, `update` or `delete`
pub static EVENTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_events_total"),
        "Total number of watch events handled by resource and action",
    );
    let counter = CounterVec::new(opts, &["resource", "action"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Time spent planning and applying one event, in seconds
///
/// Labels:
/// - `resource`: `Service` or `Endpoints`
pub static EVENT_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_event_duration_seconds"),
        "Time spent handling one watch event by resource",
    )
    .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]);
    let histogram = HistogramVec::new(opts, &["resource"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Update Metrics
// ============================================================================

/// Total number of RRset operations sent to the DNS update server
///
/// Labels:
/// - `operation`: `replace` or `delete`
/// - `outcome`: `success`, `connection` or `rejected`
pub static RRSET_OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_rrset_operations_total"),
        "Total number of RRset operations by operation and outcome",
    );
    let counter = CounterVec::new(opts, &["operation", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Bootstrap Metrics
// ============================================================================

/// Total number of zone bootstrap attempts
///
/// Labels:
/// - `outcome`: `success`, `transient` or `permanent`
pub static BOOTSTRAP_ATTEMPTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_bootstrap_attempts_total"),
        "Total number of managed zone bootstrap attempts by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a handled watch event
///
/// # Arguments
/// * `resource` - `Service` or `Endpoints`
/// * `action` - `create`, `update` or `delete`
/// * `duration` - Time spent planning and applying the event
pub fn record_event(resource: &str, action: &str, duration: Duration) {
    EVENTS_TOTAL.with_label_values(&[resource, action]).inc();
    EVENT_DURATION_SECONDS
        .with_label_values(&[resource])
        .observe(duration.as_secs_f64());
}

/// Record the outcome of one RRset operation
///
/// # Arguments
/// * `operation` - `replace` or `delete`
/// * `outcome` - `success`, or the error kind
pub fn record_rrset_operation(operation: &str, outcome: &str) {
    RRSET_OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Record a bootstrap attempt
///
/// # Arguments
/// * `outcome` - `success`, `transient` or `permanent`
pub fn record_bootstrap_attempt(outcome: &str) {
    BOOTSTRAP_ATTEMPTS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
