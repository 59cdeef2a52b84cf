use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "catalog_operations_total",
        "CRUD operations by resource, operation and outcome",
        &["resource", "operation", "outcome"]
    )
    .expect("register operations_total")
});

pub fn record(resource: &str, operation: &str, outcome: &str) {
    OPERATIONS_TOTAL.with_label_values(&[resource, operation, outcome]).inc();
}

/// Current count for one label set; used by tests and diagnostics.
pub fn count(resource: &str, operation: &str, outcome: &str) -> u64 {
    OPERATIONS_TOTAL.with_label_values(&[resource, operation, outcome]).get()
}

/// Render the default registry in Prometheus text format.
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).map_err(|e| format!("metrics encode error: {e}"))?;
    String::from_utf8(buffer).map_err(|e| format!("metrics encode error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_increments_labelled_counter() {
        let before = count("metrics_test", "find", "found");
        record("metrics_test", "find", "found");
        assert_eq!(count("metrics_test", "find", "found"), before + 1);
    }

    #[test]
    fn encoded_text_contains_counter() {
        record("metrics_test", "list", "listed");
        let text = encode_metrics().unwrap();
        assert!(text.contains("catalog_operations_total"));
    }
}
