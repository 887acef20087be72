//! Mention converters for members, roles and channels.
//!
//! A mention is the kind's sigil followed by an entity's display name, which
//! may itself contain separators (`@Jo Ann`). Only entities already present
//! in the message's [`KnownEntities`](crate::commands::prefetch::KnownEntities)
//! are considered.

use super::{ConvertContext, Converted, Converter};
use crate::commands::argument::{ArgumentSpec, TokenSpan};
use crate::commands::prefetch::KnownEntity;
use crate::error::ConvertError;
use relaybot_model::MentionKind;
use std::marker::PhantomData;

/// Resolves `@name` / `#name` text against the known table for `E`.
///
/// The longest display name that is a prefix of the text and ends on a token
/// boundary wins; among equal lengths the earliest known entity wins.
pub struct MentionConverter<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E: KnownEntity> MentionConverter<E> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E: KnownEntity> Default for MentionConverter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: KnownEntity> Converter for MentionConverter<E> {
    fn convert<'t>(
        &self,
        text: &'t str,
        cx: &ConvertContext<'_>,
    ) -> Result<Converted<'t>, ConvertError> {
        let sigil = E::KIND.sigil();
        let body = text
            .strip_prefix(sigil)
            .ok_or(ConvertError::NotAMention { sigil })?;

        let mut best: Option<&E> = None;
        for entity in cx.known.get::<E>() {
            let name = entity.display_name();
            if name.is_empty() || !body.starts_with(name) {
                continue;
            }
            if !cx.tokenizer.at_boundary(&body[name.len()..]) {
                continue;
            }
            if best.is_none_or(|b| name.len() > b.display_name().len()) {
                best = Some(entity);
            }
        }

        let entity = best.ok_or_else(|| ConvertError::UnknownMention {
            kind: E::KIND.label(),
            text: cx
                .tokenizer
                .next_token(text)
                .map(|(token, _)| token.to_string())
                .unwrap_or_default(),
        })?;

        let end = sigil.len_utf8() + entity.display_name().len();
        Ok(Converted::new(
            entity.clone(),
            &text[..end],
            cx.tokenizer.skip_separators(&text[end..]),
        ))
    }

    fn span(&self, _spec: &ArgumentSpec) -> TokenSpan {
        TokenSpan::AT_LEAST_ONE
    }

    fn mention(&self) -> Option<MentionKind> {
        Some(E::KIND)
    }
}
