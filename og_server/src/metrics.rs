//! Prometheus metrics for monitoring the task platform.
//!
//! Metrics are exposed in Prometheus text format on a dedicated scrape
//! listener (see `METRICS_BIND`).
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts, duration, status codes
//! - **Engine Metrics**: Tasks generated/settled, recharge prompts, rule hits
//! - **Ledger Metrics**: Deposit/withdrawal requests and decisions
//! - **Auth Metrics**: Admin login attempts

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Sets up a Prometheus scrape endpoint on the specified address.
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Engine Metrics
// ============================================================================

/// Increment generated-task counter for a store tier.
pub fn tasks_generated_total(store: &str) {
    metrics::counter!("tasks_generated_total",
        "store" => store.to_string()
    )
    .increment(1);
}

/// Increment settled-task counter and record the commission paid.
pub fn tasks_settled_total(commission: f64) {
    metrics::counter!("tasks_settled_total").increment(1);
    metrics::histogram!("commission_paid_usdt").record(commission);
}

/// Set the registered-user gauge.
pub fn users_total(count: usize) {
    metrics::gauge!("users_total").set(count as f64);
}

/// Increment the recharge-prompt counter.
pub fn recharge_prompts_total() {
    metrics::counter!("recharge_prompts_total").increment(1);
}

/// Increment the inject-rule-fired counter.
pub fn inject_rules_fired_total() {
    metrics::counter!("inject_rules_fired_total").increment(1);
}

// ============================================================================
// Ledger Metrics
// ============================================================================

/// Increment the ledger-request counter.
pub fn ledger_requests_total(kind: &str) {
    metrics::counter!("ledger_requests_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Increment the ledger-decision counter.
pub fn ledger_decisions_total(kind: &str, approved: bool) {
    metrics::counter!("ledger_decisions_total",
        "kind" => kind.to_string(),
        "approved" => approved.to_string()
    )
    .increment(1);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment admin login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}
