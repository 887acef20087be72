//! Dispatch failures.
//!
//! Every message that carries the prefix but does not end in a handler call
//! produces exactly one [`CommandFailure`]. Failures are data: they are
//! returned from dispatch and broadcast to failure subscribers, never raised.

use crate::error::ConvertError;
use std::fmt;

/// A converter (or the leftover check) that rejected a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedArgument {
    /// Index of the argument in the candidate's list. Equal to the argument
    /// count for leftover text.
    pub position: usize,
    /// Argument name, `None` for leftover text.
    pub argument: Option<String>,
    /// Short name of the argument type, `None` for leftover text.
    pub type_name: Option<String>,
    pub error: ConvertError,
}

impl fmt::Display for FailedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.argument, &self.type_name) {
            (Some(name), Some(ty)) => write!(f, "argument `{name}` ({ty}): {}", self.error),
            (Some(name), None) => write!(f, "argument `{name}`: {}", self.error),
            _ => write!(f, "{}", self.error),
        }
    }
}

/// One overload that matched by name and arity but failed conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedCandidate {
    /// The candidate's usage line.
    pub usage: String,
    pub argument: FailedArgument,
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// A group was invoked without a sub-command and has no fallback.
    Unspecified,
    /// No command at this level has the given name.
    NoCommandFound,
    /// Commands matched by name, but none accepts this many tokens.
    BadArgumentCount,
    /// Every candidate with a fitting arity failed conversion.
    BadArguments(Vec<FailedCandidate>),
}

impl FailureKind {
    /// Static label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::NoCommandFound => "no_command_found",
            Self::BadArgumentCount => "bad_argument_count",
            Self::BadArguments(_) => "bad_arguments",
        }
    }
}

/// A failed dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    pub kind: FailureKind,
    /// Path of the level that failed, e.g. `role give`.
    pub command_name: String,
    /// Argument text that level received.
    pub raw_arguments: String,
    pub prefix: String,
}

impl CommandFailure {
    /// A user-facing sentence describing the failure.
    pub fn describe(&self) -> String {
        let invoked = format!("{}{}", self.prefix, self.command_name);
        match &self.kind {
            FailureKind::Unspecified => format!("`{invoked}` needs a sub-command."),
            FailureKind::NoCommandFound => {
                if self.command_name.is_empty() {
                    "No command given.".to_string()
                } else {
                    format!("Unknown command `{invoked}`.")
                }
            }
            FailureKind::BadArgumentCount => {
                format!("Wrong number of arguments for `{invoked}`.")
            }
            FailureKind::BadArguments(candidates) => {
                let mut out = format!("Invalid arguments for `{invoked}`:");
                for candidate in candidates {
                    out.push_str(&format!(
                        "\n  {}{}: {}",
                        self.prefix, candidate.usage, candidate.argument
                    ));
                }
                out
            }
        }
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
