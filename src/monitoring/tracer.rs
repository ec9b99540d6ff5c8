/*!
 * Structured Tracing
 * Subscriber setup and pool reporting using the tracing crate
 *
 * Only setup, teardown and explicit reporting emit events. The acquire and
 * release paths stay silent because a subscriber formats through the
 * general allocator.
 */

use crate::core::limits::ENV_TRACE_JSON;
use crate::memory::{PoolPressure, PoolStats};
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - EXCEPT_TRACE_JSON: Enable JSON output (default: false)
///
/// Later calls are no-ops, so tests may call it freely.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let initialized = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .compact(),
            )
            .try_init()
    };

    if initialized.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Emit a pool snapshot, warning once pressure reaches `High`
pub fn report_pool(label: &str, stats: &PoolStats) {
    let pressure = stats.pressure();
    match pressure {
        PoolPressure::High | PoolPressure::Critical => warn!(
            pool = label,
            %pressure,
            outstanding = stats.outstanding,
            capacity = stats.capacity,
            high_water = stats.high_water,
            failed_acquires = stats.failed_acquires,
            "Exception pool pressure {}: {:.1}% of slots outstanding",
            pressure,
            stats.usage_percentage()
        ),
        PoolPressure::Low | PoolPressure::Medium => info!(
            pool = label,
            %pressure,
            outstanding = stats.outstanding,
            capacity = stats.capacity,
            high_water = stats.high_water,
            failed_acquires = stats.failed_acquires,
            "Exception pool usage {:.1}%",
            stats.usage_percentage()
        ),
    }
}
