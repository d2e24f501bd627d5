use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static STORE_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "flatfile_store_operations_total",
        "Record store operations by resource and operation",
        &["resource", "operation"]
    )
    .expect("register store_operations_total")
});

pub static STALE_READS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "flatfile_store_stale_reads_total",
        "Operations served from the last loaded collection after a failed reload",
        &["resource"]
    )
    .expect("register stale_reads_total")
});

pub static WRITE_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "flatfile_store_write_failures_total",
        "Failed collection file rewrites",
        &["resource"]
    )
    .expect("register write_failures_total")
});

pub fn record_operation(resource: &str, operation: &str) {
    STORE_OPERATIONS_TOTAL.with_label_values(&[resource, operation]).inc();
}

/// Render the default registry in the text exposition format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        record_operation("metrics_test", "create");
        STALE_READS_TOTAL.with_label_values(&["metrics_test"]).inc();
        WRITE_FAILURES_TOTAL.with_label_values(&["metrics_test"]).inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("flatfile_store_operations_total"));
        assert!(text.contains("resource=\"metrics_test\""));
        assert!(text.contains("flatfile_store_stale_reads_total"));
        assert!(text.contains("flatfile_store_write_failures_total"));
    }
}
