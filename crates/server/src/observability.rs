use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder,
};
use service::RecordError;

// Prometheus metrics (default registry)
pub static WORDS_RECORDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "word_wall_words_recorded_total",
        "Words accepted and counted"
    )
    .expect("register words_recorded_total")
});

pub static MESSAGES_RECORDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "word_wall_messages_recorded_total",
        "Messages appended to the feed"
    )
    .expect("register messages_recorded_total")
});

pub static INPUT_REJECTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "word_wall_input_rejected_total",
        "Posts refused by validation",
        &["operation", "reason"]
    )
    .expect("register input_rejected_total")
});

pub static STORE_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "word_wall_store_errors_total",
        "Operations that failed because the store was unavailable",
        &["operation"]
    )
    .expect("register store_errors_total")
});

/// Registers every metric so `/metrics` lists them before the first request.
pub fn init() {
    Lazy::force(&WORDS_RECORDED_TOTAL);
    Lazy::force(&MESSAGES_RECORDED_TOTAL);
    Lazy::force(&INPUT_REJECTED_TOTAL);
    Lazy::force(&STORE_ERRORS_TOTAL);
}

pub fn record_failure(operation: &str, err: &RecordError) {
    match err {
        RecordError::Invalid(r) => INPUT_REJECTED_TOTAL
            .with_label_values(&[operation, r.reason()])
            .inc(),
        RecordError::StoreUnavailable(_) => {
            STORE_ERRORS_TOTAL.with_label_values(&[operation]).inc()
        }
    }
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}
