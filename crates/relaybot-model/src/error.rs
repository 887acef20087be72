//! Error types for entity lookups.

use crate::mention::MentionKind;
use thiserror::Error;

/// Failure to resolve a mentioned entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The service has no entity with this id.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Which table was searched.
        kind: MentionKind,
        /// The id that was looked up.
        id: String,
    },
    /// The service could not be reached or refused the request.
    #[error("lookup unavailable: {0}")]
    Unavailable(String),
}

impl LookupError {
    /// Static label for metrics.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Unavailable(_) => "unavailable",
        }
    }
}
