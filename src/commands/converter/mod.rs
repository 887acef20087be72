//! Argument converters and the converter registry.
//!
//! A converter turns a prefix of the remaining command text into a typed
//! value and returns what is left. Failure is data ([`ConvertError`]): the
//! pipeline treats it as "this candidate does not match" and moves on.
//!
//! ## Built-in converters
//!
//! | Type | Accepted text |
//! |------|---------------|
//! | `String` | next token, or all remaining text when rest |
//! | integers, floats, `char`, `bool` | one token, Rust literal syntax |
//! | `Decimal` | one token, plain decimal notation |
//! | `Uuid` | one token, any canonical UUID form |
//! | `DateTime<Utc>`, `NaiveDateTime`, `NaiveDate` | one token, ISO 8601 |
//! | `TimeDelta` | one token, `[-][d.]hh:mm[:ss[.fff]]` or whole days |
//! | `Url` | one token, absolute URL |
//! | `PatternMatch`, `PatternMatches` | text matched by the argument pattern |
//! | `Vec<String>` | rest only: every remaining token |
//! | `Member`, `Role`, `Channel` | `@name` / `#name` against pre-fetched mentions |

mod mention;
mod pattern;
mod scalar;
mod text;
mod time;

pub use mention::MentionConverter;
pub use pattern::{MatchConverter, MatchesConverter, PatternMatch, PatternMatches};
pub use scalar::FromStrConverter;
pub use text::{StringConverter, TokenListConverter};
pub use time::{TimeSpanConverter, parse_time_span};

use super::argument::{ArgumentSpec, TokenSpan, TypeKey};
use super::arguments::ArgValue;
use super::prefetch::KnownEntities;
use super::tokenizer::Tokenizer;
use crate::error::ConvertError;
use relaybot_model::{Channel, Member, MentionKind, Role};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Everything a converter may look at besides the text itself.
pub struct ConvertContext<'a> {
    pub spec: &'a ArgumentSpec,
    pub tokenizer: &'a Tokenizer,
    pub known: &'a KnownEntities,
}

/// A successful conversion.
pub struct Converted<'t> {
    pub value: ArgValue,
    /// The text that produced `value`.
    pub consumed: &'t str,
    /// Text left for the next argument, leading separators already skipped.
    pub remaining: &'t str,
}

impl<'t> Converted<'t> {
    pub fn new<T: Send + Sync + 'static>(value: T, consumed: &'t str, remaining: &'t str) -> Self {
        Self {
            value: Box::new(value),
            consumed,
            remaining,
        }
    }
}

/// Converts a prefix of the remaining command text into a typed value.
pub trait Converter: Send + Sync {
    /// Consume a prefix of `text`.
    fn convert<'t>(
        &self,
        text: &'t str,
        cx: &ConvertContext<'_>,
    ) -> Result<Converted<'t>, ConvertError>;

    /// Token counts this converter can consume for `spec`.
    fn span(&self, spec: &ArgumentSpec) -> TokenSpan {
        if spec.is_rest() {
            TokenSpan::ANY
        } else {
            TokenSpan::ONE
        }
    }

    /// The mention table this converter reads, if any.
    fn mention(&self) -> Option<MentionKind> {
        None
    }

    /// True for converters that only make sense as the rest argument.
    fn rest_only(&self) -> bool {
        false
    }

    /// True for converters that read [`ArgumentSpec::pattern`].
    fn needs_pattern(&self) -> bool {
        false
    }
}

/// Single-token converter built from a closure.
pub struct FnConverter<T, F> {
    expected: &'static str,
    parse: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> FnConverter<T, F>
where
    F: Fn(&str) -> Result<T, String> + Send + Sync,
    T: Send + Sync + 'static,
{
    pub fn new(expected: &'static str, parse: F) -> Self {
        Self {
            expected,
            parse,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Converter for FnConverter<T, F>
where
    F: Fn(&str) -> Result<T, String> + Send + Sync,
    T: Send + Sync + 'static,
{
    fn convert<'t>(
        &self,
        text: &'t str,
        cx: &ConvertContext<'_>,
    ) -> Result<Converted<'t>, ConvertError> {
        let (token, remaining) = cx.tokenizer.next_token(text).ok_or(ConvertError::Empty)?;
        let value =
            (self.parse)(token).map_err(|reason| ConvertError::parse(self.expected, token, reason))?;
        Ok(Converted::new(value, token, remaining))
    }
}

/// Converter table keyed by argument type.
///
/// Registering a converter for a type that already has one replaces it.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<TypeKey, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in converter.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Register `converter` for `T`, returning the converter it replaced.
    pub fn register<T: 'static>(
        &mut self,
        converter: impl Converter + 'static,
    ) -> Option<Arc<dyn Converter>> {
        self.converters
            .insert(TypeKey::of::<T>(), Arc::new(converter))
    }

    /// Register a single-token converter for `T` from a parsing closure.
    pub fn register_fn<T, F>(&mut self, expected: &'static str, parse: F) -> Option<Arc<dyn Converter>>
    where
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.register::<T>(FnConverter::new(expected, parse))
    }

    pub fn get(&self, key: &TypeKey) -> Option<&Arc<dyn Converter>> {
        self.converters.get(key)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.converters.contains_key(&TypeKey::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    fn register_builtins(&mut self) {
        macro_rules! from_str {
            ($($ty:ty => $expected:literal),* $(,)?) => {
                $( self.register::<$ty>(FromStrConverter::<$ty>::new($expected)); )*
            };
        }

        from_str! {
            i8 => "integer", i16 => "integer", i32 => "integer", i64 => "integer",
            i128 => "integer", isize => "integer",
            u8 => "unsigned integer", u16 => "unsigned integer", u32 => "unsigned integer",
            u64 => "unsigned integer", u128 => "unsigned integer", usize => "unsigned integer",
            f32 => "number", f64 => "number",
            rust_decimal::Decimal => "decimal",
            bool => "boolean (true/false)",
            char => "single character",
            uuid::Uuid => "UUID",
            url::Url => "absolute URL",
            chrono::DateTime<chrono::Utc> => "RFC 3339 date-time",
            chrono::NaiveDateTime => "date-time",
            chrono::NaiveDate => "date",
        }

        self.register::<String>(StringConverter);
        self.register::<Vec<String>>(TokenListConverter);
        self.register::<chrono::TimeDelta>(TimeSpanConverter);
        self.register::<PatternMatch>(MatchConverter);
        self.register::<PatternMatches>(MatchesConverter);
        self.register::<Member>(MentionConverter::<Member>::new());
        self.register::<Role>(MentionConverter::<Role>::new());
        self.register::<Channel>(MentionConverter::<Channel>::new());
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.converters.keys().map(|k| k.name()).collect();
        names.sort_unstable();
        f.debug_struct("ConverterRegistry")
            .field("types", &names)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_builtins_cover_spec_types() {
        let registry = ConverterRegistry::with_builtins();
        assert!(registry.contains::<i64>());
        assert!(registry.contains::<u16>());
        assert!(registry.contains::<f64>());
        assert!(registry.contains::<rust_decimal::Decimal>());
        assert!(registry.contains::<bool>());
        assert!(registry.contains::<String>());
        assert!(registry.contains::<Vec<String>>());
        assert!(registry.contains::<uuid::Uuid>());
        assert!(registry.contains::<chrono::TimeDelta>());
        assert!(registry.contains::<Member>());
        assert!(registry.contains::<Channel>());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = ConverterRegistry::with_builtins();
        let before = registry.len();
        let replaced = registry.register_fn::<i32, _>("even integer", |s| {
            let n: i32 = s.parse().map_err(|e| format!("{e}"))?;
            if n % 2 == 0 { Ok(n) } else { Err("odd".into()) }
        });
        assert!(replaced.is_some());
        assert_eq!(registry.len(), before);

        let spec = spec::<i32>("n");
        let tokenizer = Tokenizer::default();
        let known = KnownEntities::default();
        let cx = ConvertContext {
            spec: &spec,
            tokenizer: &tokenizer,
            known: &known,
        };
        let converter = registry.get(&spec.type_key()).unwrap();
        assert!(converter.convert("4", &cx).is_ok());
        assert!(matches!(
            converter.convert("3", &cx),
            Err(ConvertError::Parse { expected: "even integer", .. })
        ));
    }

    #[test]
    fn test_scalar_consumes_one_token() {
        let known = KnownEntities::default();
        let out = run(&spec::<u8>("n"), "42 rest", &known).unwrap();
        assert_eq!(out.consumed, "42");
        assert_eq!(out.remaining, "rest");
        assert_eq!(out.value.downcast_ref::<u8>(), Some(&42));
    }
}
