//! Prometheus metrics for plant-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// API metrics
pub static PREDICTIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static CHAT_TURNS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

// Provider metrics
pub static PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static PROVIDER_TOKENS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

// Database metrics
pub static DB_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Must be called once at startup.
pub fn init_metrics() {
    let registry = Registry::new();

    let predictions_total = IntCounterVec::new(
        Opts::new("predictions_total", "Total prediction requests"),
        &["status"],
    )
    .expect("Failed to create predictions_total metric");

    let chat_turns_total = IntCounterVec::new(
        Opts::new("chat_turns_total", "Total chat turns processed"),
        &["status"],
    )
    .expect("Failed to create chat_turns_total metric");

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "provider_latency_seconds",
            "External model API latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider", "model"],
    )
    .expect("Failed to create provider_latency_seconds metric");

    let provider_errors = IntCounterVec::new(
        Opts::new("provider_errors_total", "Total external model errors"),
        &["provider", "error_type"],
    )
    .expect("Failed to create provider_errors_total metric");

    let provider_tokens = IntCounterVec::new(
        Opts::new("provider_tokens_total", "Total tokens processed"),
        &["model", "type"], // type: input, output
    )
    .expect("Failed to create provider_tokens_total metric");

    let db_errors = IntCounterVec::new(
        Opts::new("db_errors_total", "Total database errors"),
        &["operation", "collection"],
    )
    .expect("Failed to create db_errors_total metric");

    registry
        .register(Box::new(predictions_total.clone()))
        .expect("Failed to register predictions_total");
    registry
        .register(Box::new(chat_turns_total.clone()))
        .expect("Failed to register chat_turns_total");
    registry
        .register(Box::new(provider_latency.clone()))
        .expect("Failed to register provider_latency_seconds");
    registry
        .register(Box::new(provider_errors.clone()))
        .expect("Failed to register provider_errors_total");
    registry
        .register(Box::new(provider_tokens.clone()))
        .expect("Failed to register provider_tokens_total");
    registry
        .register(Box::new(db_errors.clone()))
        .expect("Failed to register db_errors_total");

    let _ = REGISTRY.set(registry);
    let _ = PREDICTIONS_TOTAL.set(predictions_total);
    let _ = CHAT_TURNS_TOTAL.set(chat_turns_total);
    let _ = PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = PROVIDER_ERRORS_TOTAL.set(provider_errors);
    let _ = PROVIDER_TOKENS_TOTAL.set(provider_tokens);
    let _ = DB_ERRORS_TOTAL.set(db_errors);

    tracing::info!("Prometheus metrics initialized");
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

// Helper functions for recording metrics

/// Record a completed prediction request.
pub fn record_prediction(status: &str) {
    if let Some(counter) = PREDICTIONS_TOTAL.get() {
        counter.with_label_values(&[status]).inc();
    }
}

/// Record a completed chat turn.
pub fn record_chat_turn(status: &str) {
    if let Some(counter) = CHAT_TURNS_TOTAL.get() {
        counter.with_label_values(&[status]).inc();
    }
}

/// Record external model latency.
pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(histogram) = PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record an external model error.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(counter) = PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[provider, error_type]).inc();
    }
}

/// Record token usage for a model call.
pub fn record_tokens(model: &str, input_tokens: i32, output_tokens: i32) {
    if let Some(counter) = PROVIDER_TOKENS_TOTAL.get() {
        counter
            .with_label_values(&[model, "input"])
            .inc_by(input_tokens.max(0) as u64);
        counter
            .with_label_values(&[model, "output"])
            .inc_by(output_tokens.max(0) as u64);
    }
}

/// Record a database error.
pub fn record_db_error(operation: &str, collection: &str) {
    if let Some(counter) = DB_ERRORS_TOTAL.get() {
        counter.with_label_values(&[operation, collection]).inc();
    }
}
