//! Prometheus metrics for observability.
//!
//! This module provides metrics for the admin endpoint:
//! - HTTP request metrics (latency, counts, errors)
//! - Registry size (collected dynamically)
//!
//! Check pipeline and external service metrics live in the core crate and
//! are registered here so one scrape returns everything.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tracing::warn;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Path label for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "classrelay_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("classrelay_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "classrelay_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "classrelay_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Registry Metrics (collected dynamically)
// =============================================================================

pub static CHANNELS_REGISTERED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "classrelay_channels_registered",
        "Number of channels in the registry",
    )
    .unwrap()
});

pub static BATCHES_REGISTERED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "classrelay_batches_registered",
        "Number of batches in the registry",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Registry
    registry
        .register(Box::new(CHANNELS_REGISTERED.clone()))
        .unwrap();
    registry
        .register(Box::new(BATCHES_REGISTERED.clone()))
        .unwrap();

    // Core metrics (checks, downloads, external services)
    for metric in classrelay_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Refresh gauges that mirror current state before a scrape.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let registry = state.registry();
    if let Ok(channels) = registry.list_channels() {
        CHANNELS_REGISTERED.set(channels.len() as i64);
    }
    if let Ok(batches) = registry.list_batches() {
        BATCHES_REGISTERED.set(batches.len() as i64);
    }
}
