// Prometheus metrics for snapshot collection

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::error::CollectError;

#[derive(Clone)]
pub struct Metrics {
    pub snapshots_total: IntCounter,
    /// Failed builds, labelled by error code
    pub snapshot_failures_total: IntCounterVec,
    pub snapshot_duration_seconds: Histogram,

    pub registry: Arc<Registry>,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let snapshots_total = IntCounter::with_opts(Opts::new(
            "bgpview_snapshots_total",
            "Total number of router snapshot builds attempted",
        ))?;
        registry.register(Box::new(snapshots_total.clone()))?;

        let snapshot_failures_total = IntCounterVec::new(
            Opts::new(
                "bgpview_snapshot_failures_total",
                "Total number of failed router snapshot builds",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(snapshot_failures_total.clone()))?;

        let snapshot_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "bgpview_snapshot_duration_seconds",
            "Time spent collecting one router snapshot",
        ))?;
        registry.register(Box::new(snapshot_duration_seconds.clone()))?;

        Ok(Metrics {
            snapshots_total,
            snapshot_failures_total,
            snapshot_duration_seconds,
            registry: Arc::new(registry),
        })
    }

    pub fn record_failure(&self, error: &CollectError) {
        self.snapshot_failures_total
            .with_label_values(&[error.code()])
            .inc();
    }

    /// Encode every registered metric in the Prometheus text format
    pub fn encode(&self) -> Result<(String, Vec<u8>), prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((encoder.format_type().to_string(), buffer))
    }
}
