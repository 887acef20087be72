//! Separator-driven tokenizer.
//!
//! Command text is never split eagerly. Converters walk a cursor over the
//! remaining text and ask the tokenizer for the next token, so that mention and
//! pattern converters can consume text that spans several separators.

use serde::Deserialize;

/// What to do with empty tokens produced by adjacent separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// `"a  b"` yields `["a", "", "b"]`.
    KeepEmpty,
    /// `"a  b"` yields `["a", "b"]`.
    #[default]
    DropEmpty,
}

/// Splits command text on a configured separator set.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    separators: Vec<char>,
    policy: SplitPolicy,
}

impl Tokenizer {
    /// Create a tokenizer. Duplicate separators are collapsed.
    pub fn new(separators: impl IntoIterator<Item = char>, policy: SplitPolicy) -> Self {
        let mut seps: Vec<char> = Vec::new();
        for c in separators {
            if !seps.contains(&c) {
                seps.push(c);
            }
        }
        Self {
            separators: seps,
            policy,
        }
    }

    /// The separator set, in configuration order.
    pub fn separators(&self) -> &[char] {
        &self.separators
    }

    /// The empty-token policy.
    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    #[inline]
    pub fn is_separator(&self, c: char) -> bool {
        self.separators.contains(&c)
    }

    /// The separator used when rebuilding text from tokens.
    pub fn primary_separator(&self) -> char {
        self.separators.first().copied().unwrap_or(' ')
    }

    /// True when `rest` begins at a token boundary: end of text or a separator.
    #[inline]
    pub fn at_boundary(&self, rest: &str) -> bool {
        rest.chars().next().is_none_or(|c| self.is_separator(c))
    }

    /// Split the command name off the front of `text`.
    ///
    /// The name ends at the first separator; the whole separator run after it
    /// is discarded regardless of the split policy.
    pub fn split_name<'t>(&self, text: &'t str) -> (&'t str, &'t str) {
        match text.find(|c| self.is_separator(c)) {
            Some(at) => {
                let rest = text[at..].trim_start_matches(|c| self.is_separator(c));
                (&text[..at], rest)
            }
            None => (text, ""),
        }
    }

    /// Drop the separators that follow a consumed token.
    ///
    /// Under [`SplitPolicy::DropEmpty`] the whole run is removed; under
    /// [`SplitPolicy::KeepEmpty`] exactly one separator is, so that the next
    /// call to [`next_token`](Self::next_token) yields an empty token.
    pub fn skip_separators<'t>(&self, text: &'t str) -> &'t str {
        match self.policy {
            SplitPolicy::DropEmpty => text.trim_start_matches(|c| self.is_separator(c)),
            SplitPolicy::KeepEmpty => {
                let mut chars = text.chars();
                match chars.next() {
                    Some(c) if self.is_separator(c) => chars.as_str(),
                    _ => text,
                }
            }
        }
    }

    /// Take one token off the front of `text`.
    ///
    /// Returns the token and the text left after it (separators already
    /// skipped), or `None` when `text` is exhausted.
    pub fn next_token<'t>(&self, text: &'t str) -> Option<(&'t str, &'t str)> {
        if text.is_empty() {
            return None;
        }
        match text.find(|c| self.is_separator(c)) {
            Some(at) => Some((&text[..at], self.skip_separators(&text[at..]))),
            None => Some((text, "")),
        }
    }

    /// Iterate over every token in `text`.
    pub fn tokens<'s, 't>(&'s self, text: &'t str) -> Tokens<'s, 't> {
        Tokens {
            tokenizer: self,
            rest: text,
        }
    }

    /// Number of tokens in `text`, counted exactly as converters consume them.
    pub fn count(&self, text: &str) -> usize {
        self.tokens(text).count()
    }

    /// Rebuild text from tokens using the primary separator.
    pub fn join<'a>(&self, tokens: impl IntoIterator<Item = &'a str>) -> String {
        let sep = self.primary_separator();
        let mut out = String::new();
        for (i, token) in tokens.into_iter().enumerate() {
            if i > 0 {
                out.push(sep);
            }
            out.push_str(token);
        }
        out
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new([' '], SplitPolicy::DropEmpty)
    }
}

/// Iterator returned by [`Tokenizer::tokens`].
pub struct Tokens<'s, 't> {
    tokenizer: &'s Tokenizer,
    rest: &'t str,
}

impl<'t> Iterator for Tokens<'_, 't> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        let (token, rest) = self.tokenizer.next_token(self.rest)?;
        self.rest = rest;
        Some(token)
    }
}
