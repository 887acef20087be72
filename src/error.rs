//! Unified error handling for relaybot.
//!
//! This module provides the error hierarchy of the command engine:
//! construction-time tree errors, per-argument conversion failures (which are
//! data, never propagated), and handler errors (which always propagate).

use relaybot_model::{LookupError, Reply};
use thiserror::Error;
use tokio::sync::mpsc;

// ============================================================================
// Tree Errors (command registration)
// ============================================================================

/// Malformed command declarations, reported when the tree is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("command name must not be empty (under `{parent}`)")]
    EmptyName { parent: String },

    #[error("`{command}`: rest argument `{argument}` must be the last argument")]
    RestNotLast { command: String, argument: String },

    #[error("`{command}`: only one rest argument is allowed, found {count}")]
    MultipleRest { command: String, count: usize },

    #[error("`{command}`: argument `{argument}` has an invalid pattern: {reason}")]
    InvalidPattern {
        command: String,
        argument: String,
        reason: String,
    },

    #[error("`{group}`: {fallback} handler declared twice")]
    DuplicateFallback {
        group: String,
        fallback: &'static str,
    },

    #[error("`{command}`: no converter registered for `{type_name}` (argument `{argument}`)")]
    MissingConverter {
        command: String,
        argument: String,
        type_name: &'static str,
    },

    #[error("`{command}`: argument `{argument}` of type `{type_name}` must be a rest argument")]
    RestOnlyType {
        command: String,
        argument: String,
        type_name: &'static str,
    },

    #[error("`{command}`: argument `{argument}` of type `{type_name}` needs a pattern")]
    MissingPattern {
        command: String,
        argument: String,
        type_name: &'static str,
    },

    #[error("`{command}`: command names must not contain the separator {separator:?}")]
    NameContainsSeparator { command: String, separator: char },
}

// ============================================================================
// Conversion Errors (candidate matching)
// ============================================================================

/// Why a converter rejected the remaining text.
///
/// A conversion error only disqualifies the current candidate; the dispatcher
/// moves on to the next overload and reports the collected errors only if
/// every candidate fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("expected a value, found nothing")]
    Empty,

    #[error("`{token}` is not a valid {expected}: {reason}")]
    Parse {
        expected: &'static str,
        token: String,
        reason: String,
    },

    #[error("expected a mention starting with `{sigil}`")]
    NotAMention { sigil: char },

    #[error("no known {kind} matches `{text}`")]
    UnknownMention { kind: &'static str, text: String },

    #[error("text does not match `{pattern}`")]
    NoMatch { pattern: String },

    #[error("no pattern configured for this argument")]
    NoPattern,

    #[error("only valid as the last (rest) argument")]
    RestOnly,

    #[error("unexpected trailing text `{0}`")]
    Leftover(String),

    #[error("no converter registered for `{0}`")]
    NoConverter(&'static str),
}

impl ConvertError {
    /// Convenience constructor for a token that failed to parse.
    pub fn parse(expected: &'static str, token: &str, reason: impl std::fmt::Display) -> Self {
        Self::Parse {
            expected,
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }
}

// ============================================================================
// Handler Errors (command execution)
// ============================================================================

/// Errors raised by a matched command handler.
///
/// The dispatcher never swallows these: they propagate to whoever awaited the
/// dispatch.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<Reply>),

    #[error("reply timed out")]
    SendTimeout,

    #[error("missing argument `{0}`")]
    MissingArgument(String),

    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Send(_) => "send_error",
            Self::SendTimeout => "send_timeout",
            Self::MissingArgument(_) => "missing_argument",
            Self::Lookup(_) => "lookup_error",
            Self::Internal(_) => "internal_error",
            Self::Other(_) => "handler_error",
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
