//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Check runs and their per-entry outcomes
//! - The download agent
//! - External services (course site, resolver, Telegram)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Check pipeline
// =============================================================================

/// Check invocations by terminal outcome.
pub static CHECKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("classrelay_checks_total", "Total /check invocations"),
        &["outcome"], // "processed", "nothing_new", "registry_error", "fetch_failed"
    )
    .unwrap()
});

/// Entries handled by outcome.
pub static ENTRIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("classrelay_entries_total", "Completed class entries handled"),
        &["outcome"], // "delivered", "unresolvable", "download_failed", "delivery_failed", "error"
    )
    .unwrap()
});

// =============================================================================
// Downloads
// =============================================================================

/// Time spent in the download agent.
pub static DOWNLOAD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "classrelay_download_duration_seconds",
            "Duration of download agent runs",
        )
        .buckets(vec![5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1200.0, 3600.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// External services
// =============================================================================

/// External requests by service and result.
pub static EXTERNAL_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "classrelay_external_requests_total",
            "Requests to external services",
        ),
        &["service", "result"],
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CHECKS_TOTAL.clone()),
        Box::new(ENTRIES_TOTAL.clone()),
        Box::new(DOWNLOAD_DURATION.clone()),
        Box::new(EXTERNAL_REQUESTS.clone()),
    ]
}
