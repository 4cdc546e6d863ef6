//! Metrics collection for observability
//!
//! Prometheus metrics for the ledger actor, kept in a private registry so
//! several ledgers can live in one process.
//!
//! # Metrics
//!
//! - `ledger_transactions_total` - Total number of transactions appended
//! - `ledger_rejected_transfers_total` - Transfers refused for insufficient funds
//! - `ledger_append_duration_seconds` - Histogram of mutation latencies (including persistence)
//! - `ledger_log_length` - Current number of logged transactions

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use std::fmt;
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Total transactions appended
    pub transactions_total: IntCounter,

    /// Transfers rejected for insufficient funds
    pub rejected_transfers: IntCounter,

    /// Append duration histogram
    pub append_duration: Histogram,

    /// Log length
    pub log_length: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let transactions_total = IntCounter::new(
            "ledger_transactions_total",
            "Total number of transactions appended",
        )?;
        registry.register(Box::new(transactions_total.clone()))?;

        let rejected_transfers = IntCounter::new(
            "ledger_rejected_transfers_total",
            "Transfers refused for insufficient funds",
        )?;
        registry.register(Box::new(rejected_transfers.clone()))?;

        let append_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ledger_append_duration_seconds",
                "Histogram of append latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0]),
        )?;
        registry.register(Box::new(append_duration.clone()))?;

        let log_length = IntGauge::new("ledger_log_length", "Number of logged transactions")?;
        registry.register(Box::new(log_length.clone()))?;

        Ok(Self {
            transactions_total,
            rejected_transfers,
            append_duration,
            log_length,
            registry,
        })
    }

    /// Record appended transactions and the resulting log length
    pub fn record_appended(&self, count: usize, log_length: usize) {
        self.transactions_total.inc_by(count as u64);
        self.log_length.set(log_length as i64);
    }

    /// Record a transfer refused for insufficient funds
    pub fn record_rejected_transfer(&self) {
        self.rejected_transfers.inc();
    }

    /// Record append duration
    pub fn record_append_duration(&self, duration_seconds: f64) {
        self.append_duration.observe(duration_seconds);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("transactions_total", &self.transactions_total.get())
            .field("rejected_transfers", &self.rejected_transfers.get())
            .field("log_length", &self.log_length.get())
            .finish_non_exhaustive()
    }
}
