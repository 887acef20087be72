//! Runtime configuration shared by every dispatch.

use super::argument::TokenSpan;
use super::converter::{Converter, ConverterRegistry};
use super::prefetch::MentionNeeds;
use super::tokenizer::{SplitPolicy, Tokenizer};
use super::tree::{CommandNode, CommandTree, Leaf, Names};
use crate::config::CommandsConfig;
use crate::error::TreeError;

/// Prefix, tokenizer and converter table.
///
/// Immutable once built; one instance serves every message of a bot.
#[derive(Debug, Clone)]
pub struct Configuration {
    prefix: String,
    tokenizer: Tokenizer,
    converters: ConverterRegistry,
}

impl Configuration {
    /// Built-in converters, the default tokenizer and `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::builder().prefix(prefix).build()
    }

    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Build from the `[commands]` table of a file configuration.
    ///
    /// Separators that are not exactly one character are skipped; run
    /// [`crate::config::validate`] first to report them.
    pub fn from_config(config: &CommandsConfig) -> Self {
        let mut builder = Self::builder()
            .prefix(config.prefix.clone())
            .split_policy(config.split_policy);
        for sep in &config.separators {
            let mut chars = sep.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                builder = builder.separator(c);
            }
        }
        builder.build()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// The text after the prefix, or `None` if `content` lacks it.
    pub fn strip_prefix<'t>(&self, content: &'t str) -> Option<&'t str> {
        content.strip_prefix(self.prefix.as_str())
    }

    /// Token counts `leaf` can accept.
    pub fn leaf_span(&self, leaf: &Leaf) -> TokenSpan {
        leaf.arguments()
            .iter()
            .fold(TokenSpan::NONE, |span, spec| {
                let next = match self.converters.get(&spec.type_key()) {
                    Some(converter) => converter.span(spec),
                    None => TokenSpan::ANY,
                };
                span.then(next)
            })
    }

    /// How many mentions of each kind `leaf` may consume.
    pub fn mention_needs(&self, leaf: &Leaf) -> MentionNeeds {
        let mut needs = MentionNeeds::default();
        for spec in leaf.arguments() {
            if let Some(kind) = self
                .converters
                .get(&spec.type_key())
                .and_then(|c| c.mention())
            {
                needs.add(kind);
            }
        }
        needs
    }

    /// Check that `tree` can be dispatched under this configuration.
    ///
    /// Every argument type needs a converter; rest-only types must be the
    /// rest argument; pattern converters need a pattern; no name may contain
    /// a separator.
    pub fn validate_tree(&self, tree: &CommandTree) -> Result<(), TreeError> {
        self.validate_level(tree.roots(), "")
    }

    fn validate_level(&self, nodes: &[CommandNode], parent: &str) -> Result<(), TreeError> {
        for node in nodes {
            let path = if parent.is_empty() {
                node.names().name().to_string()
            } else {
                format!("{parent} {}", node.names().name())
            };
            self.validate_names(node.names(), &path)?;
            match node {
                CommandNode::Leaf(leaf) => self.validate_leaf(leaf, &path)?,
                CommandNode::Container(container) => {
                    self.validate_level(container.children(), &path)?
                }
            }
        }
        Ok(())
    }

    fn validate_names(&self, names: &Names, path: &str) -> Result<(), TreeError> {
        for name in names.iter() {
            if let Some(separator) = name.chars().find(|c| self.tokenizer.is_separator(*c)) {
                return Err(TreeError::NameContainsSeparator {
                    command: path.to_string(),
                    separator,
                });
            }
        }
        Ok(())
    }

    fn validate_leaf(&self, leaf: &Leaf, path: &str) -> Result<(), TreeError> {
        for spec in leaf.arguments() {
            let ty = spec.type_key();
            let converter = self
                .converters
                .get(&ty)
                .ok_or_else(|| TreeError::MissingConverter {
                    command: path.to_string(),
                    argument: spec.name().to_string(),
                    type_name: ty.name(),
                })?;
            if converter.rest_only() && !spec.is_rest() {
                return Err(TreeError::RestOnlyType {
                    command: path.to_string(),
                    argument: spec.name().to_string(),
                    type_name: ty.name(),
                });
            }
            if converter.needs_pattern() && spec.pattern().is_none() {
                return Err(TreeError::MissingPattern {
                    command: path.to_string(),
                    argument: spec.name().to_string(),
                    type_name: ty.name(),
                });
            }
        }
        Ok(())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(crate::config::defaults::default_prefix())
    }
}

/// Builder for [`Configuration`].
pub struct ConfigurationBuilder {
    prefix: String,
    separators: Vec<char>,
    policy: SplitPolicy,
    converters: ConverterRegistry,
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self {
            prefix: crate::config::defaults::default_prefix(),
            separators: Vec::new(),
            policy: SplitPolicy::default(),
            converters: ConverterRegistry::with_builtins(),
        }
    }
}

impl ConfigurationBuilder {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Add a separator. Without any, a single space is used.
    pub fn separator(mut self, separator: char) -> Self {
        self.separators.push(separator);
        self
    }

    pub fn split_policy(mut self, policy: SplitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register (or replace) the converter for `T`.
    pub fn converter<T: 'static>(mut self, converter: impl Converter + 'static) -> Self {
        self.converters.register::<T>(converter);
        self
    }

    /// Register (or replace) a single-token converter for `T`.
    pub fn converter_fn<T, F>(mut self, expected: &'static str, parse: F) -> Self
    where
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.converters.register_fn::<T, F>(expected, parse);
        self
    }

    pub fn build(self) -> Configuration {
        let tokenizer = if self.separators.is_empty() {
            Tokenizer::new([' '], self.policy)
        } else {
            Tokenizer::new(self.separators, self.policy)
        };
        Configuration {
            prefix: self.prefix,
            tokenizer,
            converters: self.converters,
        }
    }
}
