//! Single-token converters for types implementing [`FromStr`].

use super::{ConvertContext, Converted, Converter};
use crate::error::ConvertError;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

/// Parses exactly one token with `T::from_str`.
///
/// Rust's numeric parsers are locale-independent, so `1.5` is always one and
/// a half and `1,5` is always an error.
pub struct FromStrConverter<T> {
    expected: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FromStrConverter<T> {
    /// `expected` names the type in failure reports ("integer", "UUID", ...).
    pub fn new(expected: &'static str) -> Self {
        Self {
            expected,
            _marker: PhantomData,
        }
    }
}

impl<T> Converter for FromStrConverter<T>
where
    T: FromStr + Send + Sync + 'static,
    T::Err: Display,
{
    fn convert<'t>(
        &self,
        text: &'t str,
        cx: &ConvertContext<'_>,
    ) -> Result<Converted<'t>, ConvertError> {
        let (token, remaining) = cx.tokenizer.next_token(text).ok_or(ConvertError::Empty)?;
        let value = token
            .parse::<T>()
            .map_err(|e| ConvertError::parse(self.expected, token, e))?;
        Ok(Converted::new(value, token, remaining))
    }
}
