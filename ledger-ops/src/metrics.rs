//! Metrics collection for observability
//!
//! Prometheus collectors for the operation layer:
//!
//! - `ledger_statements_total` - Statements committed, labeled by nothing (raw count)
//! - `ledger_insufficient_funds_total` - Operations rejected by the funds check
//! - `ledger_lock_timeouts_total` - Exclusion scope acquisitions that timed out
//! - `ledger_operation_duration_seconds` - Histogram of committed operation latencies
//!
//! Collectors live on a private registry so multiple engines can coexist in
//! one process (the global default registry rejects duplicate registration).

use prometheus::{Histogram, HistogramOpts, IntCounter, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Total statements committed
    pub statements_total: IntCounter,

    /// Operations rejected by the insufficient-funds check
    pub insufficient_funds_total: IntCounter,

    /// Exclusion scope acquisitions that timed out
    pub lock_timeouts_total: IntCounter,

    /// Committed operation latency histogram
    pub operation_duration: Histogram,

    registry: Arc<Registry>,
}

impl Metrics {
    /// Create a collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let statements_total = IntCounter::with_opts(Opts::new(
            "ledger_statements_total",
            "Total statements committed",
        ))?;
        registry.register(Box::new(statements_total.clone()))?;

        let insufficient_funds_total = IntCounter::with_opts(Opts::new(
            "ledger_insufficient_funds_total",
            "Operations rejected by the funds check",
        ))?;
        registry.register(Box::new(insufficient_funds_total.clone()))?;

        let lock_timeouts_total = IntCounter::with_opts(Opts::new(
            "ledger_lock_timeouts_total",
            "Exclusion scope acquisitions that timed out",
        ))?;
        registry.register(Box::new(lock_timeouts_total.clone()))?;

        let operation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ledger_operation_duration_seconds",
                "Histogram of committed operation latencies",
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0]),
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            statements_total,
            insufficient_funds_total,
            lock_timeouts_total,
            operation_duration,
            registry,
        })
    }

    /// Registry for a scrape endpoint owned by the embedding service
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
