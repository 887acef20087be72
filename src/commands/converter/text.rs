//! Text converters: `String` and the rest-only `Vec<String>`.

use super::{ConvertContext, Converted, Converter};
use crate::error::ConvertError;

/// `String`: the next token, or every remaining character when rest.
pub struct StringConverter;

impl Converter for StringConverter {
    fn convert<'t>(
        &self,
        text: &'t str,
        cx: &ConvertContext<'_>,
    ) -> Result<Converted<'t>, ConvertError> {
        if cx.spec.is_rest() {
            return Ok(Converted::new(text.to_string(), text, ""));
        }
        let (token, remaining) = cx.tokenizer.next_token(text).ok_or(ConvertError::Empty)?;
        Ok(Converted::new(token.to_string(), token, remaining))
    }
}

/// `Vec<String>`: every remaining token. Only valid as the rest argument.
pub struct TokenListConverter;

impl Converter for TokenListConverter {
    fn convert<'t>(
        &self,
        text: &'t str,
        cx: &ConvertContext<'_>,
    ) -> Result<Converted<'t>, ConvertError> {
        if !cx.spec.is_rest() {
            return Err(ConvertError::RestOnly);
        }
        let tokens: Vec<String> = cx.tokenizer.tokens(text).map(str::to_string).collect();
        Ok(Converted::new(tokens, text, ""))
    }

    fn rest_only(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::commands::prefetch::KnownEntities;
    use crate::error::ConvertError;

    #[test]
    fn test_string_token() {
        let known = KnownEntities::default();
        let out = run(&spec::<String>("word"), "hello there", &known).unwrap();
        assert_eq!(out.value.downcast_ref::<String>().unwrap(), "hello");
        assert_eq!(out.remaining, "there");
    }

    #[test]
    fn test_string_rest_keeps_text_verbatim() {
        let known = KnownEntities::default();
        let out = run(&rest_spec::<String>("text"), "hello   there", &known).unwrap();
        assert_eq!(out.value.downcast_ref::<String>().unwrap(), "hello   there");
        assert_eq!(out.remaining, "");
    }

    #[test]
    fn test_token_list_consumes_everything() {
        let known = KnownEntities::default();
        let out = run(&rest_spec::<Vec<String>>("words"), "one two three", &known).unwrap();
        assert_eq!(
            out.value.downcast_ref::<Vec<String>>().unwrap(),
            &vec!["one".to_string(), "two".to_string(), "three".to_string()]
        );
        assert_eq!(out.remaining, "");

        let out = run(&rest_spec::<Vec<String>>("words"), "", &known).unwrap();
        assert!(out.value.downcast_ref::<Vec<String>>().unwrap().is_empty());
    }

    #[test]
    fn test_token_list_requires_rest() {
        let known = KnownEntities::default();
        assert!(matches!(
            run(&spec::<Vec<String>>("words"), "a b", &known),
            Err(ConvertError::RestOnly)
        ));
    }
}
