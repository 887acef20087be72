//! Argument specifications.
//!
//! An [`ArgumentSpec`] is the built, validated form of an argument
//! declaration: which converter to use (by [`TypeKey`]), the name shown in
//! usage lines, whether it is the rest argument, and an optional anchored
//! pattern for pattern-matching converters.

use regex::Regex;
use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies an argument type, and therefore the converter that parses it.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// The key for `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Full type name, as reported by [`std::any::type_name`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without module paths, e.g. `Vec<String>` or `DateTime<Utc>`.
    pub fn short_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut segment = String::new();
        for c in self.name.chars() {
            match c {
                ':' => segment.clear(),
                '<' | '>' | ',' | ' ' | '[' | ']' | ';' | '&' | '(' | ')' => {
                    out.push_str(&segment);
                    segment.clear();
                    out.push(c);
                }
                _ => segment.push(c),
            }
        }
        out.push_str(&segment);
        out
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

/// How many tokens an argument may consume.
///
/// Used by the dispatcher's arity pre-filter: a leaf is only worth converting
/// when the token count of its input lies within the sum of its arguments'
/// spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub min: usize,
    /// `None` means unbounded.
    pub max: Option<usize>,
}

impl TokenSpan {
    /// Exactly one token.
    pub const ONE: TokenSpan = TokenSpan {
        min: 1,
        max: Some(1),
    };

    /// Nothing.
    pub const NONE: TokenSpan = TokenSpan {
        min: 0,
        max: Some(0),
    };

    /// Any number of tokens, including zero.
    pub const ANY: TokenSpan = TokenSpan { min: 0, max: None };

    /// At least one token, no upper bound.
    pub const AT_LEAST_ONE: TokenSpan = TokenSpan { min: 1, max: None };

    /// Span of two arguments consumed one after the other.
    pub fn then(self, next: TokenSpan) -> TokenSpan {
        TokenSpan {
            min: self.min + next.min,
            max: match (self.max, next.max) {
                (Some(a), Some(b)) => Some(a + b),
                _ => None,
            },
        }
    }

    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

/// A built argument specification.
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    pub(crate) ty: TypeKey,
    pub(crate) name: String,
    pub(crate) rest: bool,
    pub(crate) pattern: Option<Regex>,
    pub(crate) description: Option<String>,
}

impl ArgumentSpec {
    /// The converter key.
    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    /// Display name used in usage lines and failure reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this argument consumes all remaining text.
    pub fn is_rest(&self) -> bool {
        self.rest
    }

    /// The anchored pattern, if the declaration supplied one.
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Usage fragment: `<name>` or `[name...]` for the rest argument.
    pub fn usage(&self) -> String {
        if self.rest {
            format!("[{}...]", self.name)
        } else {
            format!("<{}>", self.name)
        }
    }
}

/// Compile a declaration pattern so that it only matches at the cursor.
pub(crate) fn anchor_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_key_identity() {
        assert_eq!(TypeKey::of::<i32>(), TypeKey::of::<i32>());
        assert_ne!(TypeKey::of::<i32>(), TypeKey::of::<i64>());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(TypeKey::of::<Vec<String>>().short_name(), "Vec<String>");
        assert_eq!(
            TypeKey::of::<chrono::DateTime<chrono::Utc>>().short_name(),
            "DateTime<Utc>"
        );
        assert_eq!(TypeKey::of::<u8>().short_name(), "u8");
    }

    #[test]
    fn test_span_arithmetic() {
        let two = TokenSpan::ONE.then(TokenSpan::ONE);
        assert_eq!(two, TokenSpan { min: 2, max: Some(2) });
        assert!(two.contains(2));
        assert!(!two.contains(3));

        let open = two.then(TokenSpan::ANY);
        assert!(open.contains(2));
        assert!(open.contains(40));
        assert!(!open.contains(1));
    }

    #[test]
    fn test_anchored_pattern() {
        let re = anchor_pattern(r"\d+d\d+").unwrap();
        assert!(re.is_match("2d6 rest"));
        assert!(!re.is_match("roll 2d6"));
    }
}
