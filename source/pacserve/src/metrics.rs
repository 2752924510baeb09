//! Prometheus-style metrics: a response-time histogram, a per-status
//! counter, and a per-PAC-file served counter, gathered from the
//! process-wide default registry and rendered as text at `/metrics`.
//!
//! A direct counterpart to the custom Prometheus setup in the original
//! implementation, minus the socket-state gauge (this server has no
//! equivalent to that process's netstat polling).

use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram, CounterVec, Encoder, Histogram, TextEncoder,
};

lazy_static! {
    static ref RESPONSE_TIME: Histogram = register_histogram!(
        "pacserve_response_time_seconds",
        "Response time distribution in seconds"
    )
    .expect("metric name and help text are fixed and valid");
    static ref HTTP_STATUS_TOTAL: CounterVec = register_counter_vec!(
        "pacserve_http_status_total",
        "Total number of responses by HTTP status code",
        &["status_code"]
    )
    .expect("metric name and help text are fixed and valid");
    static ref PAC_FILE_TOTAL: CounterVec = register_counter_vec!(
        "pacserve_pac_file_total",
        "Number of times each PAC file was served",
        &["file"]
    )
    .expect("metric name and help text are fixed and valid");
}

/// Records one served request. `pac_filename` is `None` for the
/// synthetic root (no file-backed default).
pub fn record_response(status: u16, elapsed: Duration, pac_filename: Option<&str>) {
    RESPONSE_TIME.observe(elapsed.as_secs_f64());
    HTTP_STATUS_TOTAL
        .with_label_values(&[&status.to_string()])
        .inc();
    PAC_FILE_TOTAL
        .with_label_values(&[pac_filename.unwrap_or("default")])
        .inc();
}

/// Renders the default registry in Prometheus's text exposition format.
pub fn render() -> String {
    let metric_families = prometheus::gather();
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    encoder
        .encode(&metric_families, &mut buf)
        .expect("gathered metric families always encode");
    String::from_utf8(buf).expect("the Prometheus text encoder always emits valid UTF-8")
}
