use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Encoder, Histogram,
    HistogramVec, IntCounterVec, TextEncoder,
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

    // Store Metrics
    pub static ref DB_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "db_operations_total",
        "Total number of store operations",
        &["operation", "collection", "status"]
    )
    .unwrap();

    pub static ref DB_OPERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "db_operation_duration_seconds",
        "Store operation duration in seconds",
        &["operation", "collection"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .unwrap();

    // Business Metrics
    pub static ref RESPONSES_SUBMITTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "survey_responses_submitted_total",
        "Total number of survey response submissions",
        &["outcome"]
    )
    .unwrap();

    pub static ref RESPONSE_SCORE: Histogram = register_histogram!(
        "survey_response_score",
        "Total score of accepted survey responses",
        vec![0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0]
    )
    .unwrap();

    pub static ref AUTHORING_CHANGES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "survey_authoring_changes_total",
        "Total number of survey and question mutations",
        &["entity", "action"]
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

/// Helper: track store operation with metrics
pub async fn track_db_operation<F, T, E>(operation: &str, collection: &str, future: F) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
{
    let start = std::time::Instant::now();
    let result = future.await;
    let duration = start.elapsed().as_secs_f64();

    let status = if result.is_ok() { "success" } else { "error" };

    DB_OPERATIONS_TOTAL
        .with_label_values(&[operation, collection, status])
        .inc();

    DB_OPERATION_DURATION_SECONDS
        .with_label_values(&[operation, collection])
        .observe(duration);

    result
}

pub fn record_authoring_change(entity: &str, action: &str) {
    AUTHORING_CHANGES_TOTAL
        .with_label_values(&[entity, action])
        .inc();
}

pub fn record_submission(outcome: &str, score: Option<f64>) {
    RESPONSES_SUBMITTED_TOTAL
        .with_label_values(&[outcome])
        .inc();
    if let Some(score) = score {
        RESPONSE_SCORE.observe(score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        let _ = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/health", "200"])
            .get();
    }

    #[test]
    fn test_render_metrics() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();
        record_submission("accepted", Some(5.0));

        let output = render_metrics().unwrap();
        assert!(output.contains("http_requests_total"));
        assert!(output.contains("survey_responses_submitted_total"));
        assert!(output.contains("survey_response_score"));
    }

    #[tokio::test]
    async fn test_track_db_operation_passes_result_through() {
        let ok: Result<i32, String> =
            track_db_operation("get_survey", "surveys", async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));

        let err: Result<i32, String> =
            track_db_operation("get_survey", "surveys", async { Err("down".to_string()) }).await;
        assert!(err.is_err());

        let failures = DB_OPERATIONS_TOTAL
            .with_label_values(&["get_survey", "surveys", "error"])
            .get();
        assert!(failures >= 1);
    }
}
