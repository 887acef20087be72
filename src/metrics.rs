//! Prometheus metrics for the command engine.
//!
//! - `relaybot_commands_total{command}` - handler invocations by path
//! - `relaybot_command_duration_seconds{command}` - handler latency histogram
//! - `relaybot_dispatch_failures_total{kind}` - failures by kind
//! - `relaybot_handler_errors_total{command, error}` - errors raised by handlers
//! - `relaybot_mention_lookups_total{kind, outcome}` - pre-fetch lookups
//! - `relaybot_messages_ignored_total` - messages without the prefix
//!
//! Recording helpers are no-ops until [`init`] has run.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use relaybot_model::MentionKind;
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Handler invocations by command path.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Dispatch failures by kind.
pub static DISPATCH_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();

/// Errors returned by handlers, by command path and error code.
pub static HANDLER_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Mention lookups by kind and outcome.
pub static MENTION_LOOKUPS: OnceLock<IntCounterVec> = OnceLock::new();

/// Messages that did not start with the prefix.
pub static MESSAGES_IGNORED: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

/// Handler latency by command path.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup; later calls are harmless.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, metric = stringify!($metric), "Failed to register metric");
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, metric = stringify!($metric), "Failed to create metric");
                }
            }
        };
    }

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("relaybot_commands_total", "Command handler invocations by path"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("relaybot_command_duration_seconds", "Command handler latency by path")
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["command"]));
    register!(DISPATCH_FAILURES, IntCounterVec::new(Opts::new("relaybot_dispatch_failures_total", "Dispatch failures by kind"), &["kind"]));
    register!(HANDLER_ERRORS, IntCounterVec::new(Opts::new("relaybot_handler_errors_total", "Errors returned by command handlers"), &["command", "error"]));
    register!(MENTION_LOOKUPS, IntCounterVec::new(Opts::new("relaybot_mention_lookups_total", "Mention lookups by kind and outcome"), &["kind", "outcome"]));
    register!(MESSAGES_IGNORED, IntCounter::new("relaybot_messages_ignored_total", "Messages without the command prefix"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recording helpers
// ============================================================================

/// Record a handler invocation with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

#[inline]
pub fn record_handler_error(command: &str, error: &str) {
    if let Some(c) = HANDLER_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

#[inline]
pub fn record_failure(kind: &str) {
    if let Some(c) = DISPATCH_FAILURES.get() {
        c.with_label_values(&[kind]).inc();
    }
}

#[inline]
pub fn record_mention_lookup(kind: MentionKind, outcome: &str) {
    if let Some(c) = MENTION_LOOKUPS.get() {
        c.with_label_values(&[kind.label(), outcome]).inc();
    }
}

#[inline]
pub fn record_ignored() {
    if let Some(c) = MESSAGES_IGNORED.get() {
        c.inc();
    }
}
