// src/db/monitoring.rs

use std::time::Instant;
use log::debug;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

/// Store operations executed, labelled by operation and outcome.
pub static DB_QUERY_COUNTER: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pim_db_query_total",
        "Total number of store operations executed",
        &["operation", "outcome"]
    )
    .expect("metric pim_db_query_total registers once")
});

pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "pim_db_query_duration_seconds",
        "Duration of store operations in seconds",
        &["operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25]
    )
    .expect("metric pim_db_query_duration_seconds registers once")
});

/// Runs one store operation and records its count and latency.
pub fn measure_db_operation<T, E, F>(operation: &str, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
{
    let start = Instant::now();
    let result = f();
    let secs = start.elapsed().as_secs_f64();

    let outcome = if result.is_ok() { "ok" } else { "error" };
    DB_QUERY_COUNTER.with_label_values(&[operation, outcome]).inc();
    DB_QUERY_DURATION.with_label_values(&[operation]).observe(secs);

    debug!("store operation {} took {:.4} seconds ({})", operation, secs, outcome);
    result
}

/// Current metrics in the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        log::error!("failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_counts_outcomes() {
        let ok: Result<i32, String> = measure_db_operation("unit_probe", || Ok(1));
        assert_eq!(ok, Ok(1));
        let err: Result<i32, String> = measure_db_operation("unit_probe", || Err("boom".into()));
        assert!(err.is_err());

        assert!(DB_QUERY_COUNTER.with_label_values(&["unit_probe", "ok"]).get() >= 1);
        assert!(DB_QUERY_COUNTER.with_label_values(&["unit_probe", "error"]).get() >= 1);

        let text = gather_metrics();
        assert!(text.contains("pim_db_query_total"));
    }
}
