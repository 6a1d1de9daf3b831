//! Prometheus metrics for the node.
//!
//! [`AppMetrics`] owns a dedicated [`Registry`] that the daemon can encode
//! into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

pub struct AppMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    pub chains_registered: IntCounter,
    pub accounts_activated: IntCounter,
    pub deposits: IntCounter,
    pub unbondings_queued: IntCounter,
    pub unbondings_settled: IntCounter,
    /// Settlement attempts that failed; the same entry may count more than once.
    pub unbondings_failed: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    pub pending_unbondings: IntGauge,
    pub block_height: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time spent in `end_block`, in milliseconds.
    pub end_block_time_ms: Histogram,
}

impl AppMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let chains_registered = register_int_counter_with_registry!(
            Opts::new(
                "interstake_source_chains_registered_total",
                "Source chains enrolled"
            ),
            registry
        )
        .expect("failed to register chains_registered counter");

        let accounts_activated = register_int_counter_with_registry!(
            Opts::new(
                "interstake_interchain_accounts_activated_total",
                "Interchain accounts confirmed by the counterparty"
            ),
            registry
        )
        .expect("failed to register accounts_activated counter");

        let deposits = register_int_counter_with_registry!(
            Opts::new("interstake_deposits_total", "Deposits credited to agents"),
            registry
        )
        .expect("failed to register deposits counter");

        let unbondings_queued = register_int_counter_with_registry!(
            Opts::new("interstake_unbondings_queued_total", "Unbonding requests queued"),
            registry
        )
        .expect("failed to register unbondings_queued counter");

        let unbondings_settled = register_int_counter_with_registry!(
            Opts::new(
                "interstake_unbondings_settled_total",
                "Unbonding entries settled"
            ),
            registry
        )
        .expect("failed to register unbondings_settled counter");

        let unbondings_failed = register_int_counter_with_registry!(
            Opts::new(
                "interstake_unbonding_failures_total",
                "Failed settlement attempts"
            ),
            registry
        )
        .expect("failed to register unbondings_failed counter");

        let pending_unbondings = register_int_gauge_with_registry!(
            Opts::new("interstake_pending_unbondings", "Entries in the unbonding queue"),
            registry
        )
        .expect("failed to register pending_unbondings gauge");

        let block_height = register_int_gauge_with_registry!(
            Opts::new("interstake_block_height", "Height of the last processed block"),
            registry
        )
        .expect("failed to register block_height gauge");

        let end_block_time_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "interstake_end_block_time_ms",
                "end_block processing time in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(0.1, 2.0, 15).unwrap()),
            registry
        )
        .expect("failed to register end_block_time_ms histogram");

        Self {
            registry,
            chains_registered,
            accounts_activated,
            deposits,
            unbondings_queued,
            unbondings_settled,
            unbondings_failed,
            pending_unbondings,
            block_height,
            end_block_time_ms,
        }
    }

    /// Prometheus text exposition of every metric.
    pub fn encode(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}
