//! Command routing and argument conversion.
//!
//! ## Architecture
//!
//! - [`tree`]: declarations ([`Command`], [`Group`], [`Arg`]) and the built
//!   [`CommandTree`]
//! - [`configuration`]: prefix, [`Tokenizer`] and [`ConverterRegistry`]
//! - [`converter`]: per-type converters over a text cursor
//! - [`prefetch`]: need-bounded mention resolution
//! - [`pipeline`]: left-to-right conversion of one candidate
//! - [`dispatch`]: the recursive dispatcher and its [`DispatchOutcome`]
//! - [`failure`]: the failure taxonomy
//! - [`service`]: [`CommandService`], the entry point

pub mod argument;
pub mod arguments;
pub mod configuration;
pub mod converter;
pub mod dispatch;
pub mod failure;
pub mod handler;
pub mod middleware;
pub mod pipeline;
pub mod prefetch;
pub mod service;
pub mod tokenizer;
pub mod tree;

pub use argument::{ArgumentSpec, TokenSpan, TypeKey};
pub use arguments::{Argument, Arguments};
pub use configuration::{Configuration, ConfigurationBuilder};
pub use converter::{
    ConvertContext, Converted, Converter, ConverterRegistry, MentionConverter, PatternMatch,
    PatternMatches,
};
pub use dispatch::DispatchOutcome;
pub use failure::{CommandFailure, FailedArgument, FailedCandidate, FailureKind};
pub use handler::{CommandHandler, FnHandler, Invocation, handler_fn};
pub use middleware::ResponseSink;
pub use prefetch::{KnownEntities, KnownEntity, MentionNeeds, MentionPrefetcher};
pub use service::CommandService;
pub use tokenizer::{SplitPolicy, Tokenizer};
pub use tree::{
    Arg, Command, CommandNode, CommandTree, CommandTreeBuilder, Container, Group, HelpEntry,
    Leaf, Names,
};
