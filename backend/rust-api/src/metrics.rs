use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram, register_histogram_vec, register_int_counter_vec,
    register_int_gauge, CounterVec, Encoder, Histogram, HistogramVec, IntCounterVec, IntGauge,
    TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Scoring Metrics
    pub static ref SESSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "scoring_sessions_total",
        "Total number of scoring sessions by lifecycle event",
        &["status"]
    )
    .unwrap();

    pub static ref SESSIONS_ACTIVE: IntGauge = register_int_gauge!(
        "scoring_sessions_active",
        "Number of scoring sessions not yet submitted"
    )
    .unwrap();

    pub static ref SCORE_SUBMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "score_submissions_total",
        "Total number of scored answers",
        &["mode", "outcome"]
    )
    .unwrap();

    pub static ref RESPONSE_TIME_SECONDS: HistogramVec = register_histogram_vec!(
        "question_response_time_seconds",
        "Time from question start to submission",
        &["mode"],
        vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]
    )
    .unwrap();

    pub static ref HINTS_REQUESTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "hints_requested_total",
        "Total number of hint requests",
        &["result"]
    )
    .unwrap();

    // Compliance Metrics
    pub static ref AUDIT_RUNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "audit_runs_total",
        "Total number of block compliance audits",
        &["mode"]
    )
    .unwrap();

    pub static ref AUDIT_SCORE: Histogram = register_histogram!(
        "audit_score",
        "Compliance score distribution",
        vec![0.0, 25.0, 50.0, 70.0, 80.0, 90.0, 95.0, 100.0]
    )
    .unwrap();

    // Capabilities Cache Metrics
    pub static ref CACHE_HIT_RATIO: CounterVec = register_counter_vec!(
        "cache_hit_ratio",
        "Cache hit/miss ratio",
        &["result"]
    )
    .unwrap();

    pub static ref CAPABILITY_FETCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "capability_fetches_total",
        "Total number of capability fetches from the remote function",
        &["status"]
    )
    .unwrap();

    // Version History Metrics
    pub static ref HISTORY_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "history_operations_total",
        "Total number of course history operations",
        &["operation", "status"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Record cache hit
pub fn record_cache_hit() {
    CACHE_HIT_RATIO.with_label_values(&["hit"]).inc();
}

/// Record cache miss
pub fn record_cache_miss() {
    CACHE_HIT_RATIO.with_label_values(&["miss"]).inc();
}
