//! Structured logging configuration.
//!
//! Request logs carry the request id injected by the request-id middleware,
//! so a single grab/settle round trip can be correlated across lines.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via `RUST_LOG`; the default keeps hyper quiet.
///
/// # Example
///
/// ```no_run
/// use og_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Example
///
/// ```
/// use og_server::logging::log_security_event;
///
/// log_security_event("failed_admin_login", Some("admin"), "Invalid password attempt");
/// ```
pub fn log_security_event(event_type: &str, subject: Option<&str>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        subject = subject,
        "SECURITY: {}",
        message
    );
}
