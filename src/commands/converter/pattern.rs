//! Regular-expression converters.
//!
//! The pattern comes from the argument declaration and is anchored at the
//! cursor, so a match always starts at the beginning of the remaining text.
//! A match must also end on a token boundary.

use super::{ConvertContext, Converted, Converter};
use crate::commands::argument::{ArgumentSpec, TokenSpan};
use crate::error::ConvertError;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// One pattern match and its capture groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    text: String,
    groups: Vec<Option<String>>,
    named: BTreeMap<String, String>,
}

impl PatternMatch {
    fn from_captures(re: &Regex, caps: &Captures<'_>) -> Self {
        let groups = caps
            .iter()
            .skip(1)
            .map(|g| g.map(|m| m.as_str().to_string()))
            .collect();
        let named = re
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
            .collect();
        Self {
            text: caps
                .get(0)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            groups,
            named,
        }
    }

    /// The whole matched text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Capture group `index` (1-based, like `$1`). Group 0 is the whole match.
    pub fn group(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return Some(&self.text);
        }
        self.groups.get(index - 1)?.as_deref()
    }

    /// Named capture group.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }
}

/// Consecutive pattern matches, each separated by separators.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternMatches(pub Vec<PatternMatch>);

impl PatternMatches {
    pub fn iter(&self) -> impl Iterator<Item = &PatternMatch> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn pattern_of<'a>(cx: &'a ConvertContext<'_>) -> Result<&'a Regex, ConvertError> {
    cx.spec.pattern().ok_or(ConvertError::NoPattern)
}

/// Apply `re` at the start of `text`, keeping the match only if it ends on a boundary.
fn match_at<'t>(re: &Regex, text: &'t str, cx: &ConvertContext<'_>) -> Option<Captures<'t>> {
    let caps = re.captures(text)?;
    let end = caps.get(0)?.end();
    cx.tokenizer.at_boundary(&text[end..]).then_some(caps)
}

/// `PatternMatch`: one anchored match of the argument pattern.
pub struct MatchConverter;

impl Converter for MatchConverter {
    fn convert<'t>(
        &self,
        text: &'t str,
        cx: &ConvertContext<'_>,
    ) -> Result<Converted<'t>, ConvertError> {
        let re = pattern_of(cx)?;
        let caps = match_at(re, text, cx).ok_or_else(|| ConvertError::NoMatch {
            pattern: re.as_str().to_string(),
        })?;
        let end = caps.get(0).map_or(0, |m| m.end());
        let found = PatternMatch::from_captures(re, &caps);
        let remaining = cx.tokenizer.skip_separators(&text[end..]);
        Ok(Converted::new(found, &text[..end], remaining))
    }

    fn span(&self, _spec: &ArgumentSpec) -> TokenSpan {
        TokenSpan::ANY
    }

    fn needs_pattern(&self) -> bool {
        true
    }
}

/// `PatternMatches`: as many consecutive matches as the text holds, at least one.
pub struct MatchesConverter;

impl Converter for MatchesConverter {
    fn convert<'t>(
        &self,
        text: &'t str,
        cx: &ConvertContext<'_>,
    ) -> Result<Converted<'t>, ConvertError> {
        let re = pattern_of(cx)?;
        let mut found = Vec::new();
        let mut cursor = text;
        let mut consumed_end = 0;

        while let Some(caps) = match_at(re, cursor, cx) {
            let end = caps.get(0).map_or(0, |m| m.end());
            if end == 0 {
                break;
            }
            found.push(PatternMatch::from_captures(re, &caps));
            consumed_end = text.len() - cursor.len() + end;
            cursor = cx.tokenizer.skip_separators(&cursor[end..]);
        }

        if found.is_empty() {
            return Err(ConvertError::NoMatch {
                pattern: re.as_str().to_string(),
            });
        }
        Ok(Converted::new(PatternMatches(found), &text[..consumed_end], cursor))
    }

    fn span(&self, _spec: &ArgumentSpec) -> TokenSpan {
        TokenSpan::ANY
    }

    fn needs_pattern(&self) -> bool {
        true
    }
}
