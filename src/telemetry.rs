//! Telemetry utilities for command timing and dispatch spans.

use std::time::Instant;

/// Guard for timing a handler call and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(&self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use relaybot_model::MessageCreated;
    use tracing::{Span, debug_span, info_span};

    /// Span covering the dispatch of one message.
    pub fn dispatch(message: &MessageCreated) -> Span {
        match &message.server_id {
            Some(server) => info_span!(
                "dispatch",
                message = %message.id,
                author = %message.author_id,
                channel = %message.channel_id,
                server = %server,
            ),
            None => info_span!(
                "dispatch",
                message = %message.id,
                author = %message.author_id,
                channel = %message.channel_id,
            ),
        }
    }

    /// Span around a handler call.
    pub fn command(path: &str) -> Span {
        debug_span!("command", name = %path)
    }
}
