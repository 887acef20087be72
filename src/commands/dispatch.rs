//! Recursive command dispatcher.
//!
//! One call per dispatch level:
//!
//! 1. split the text into `(name, rest)` at the first separator run
//! 2. collect the nodes at this level whose name or alias equals `name`
//! 3. if a group matched, hand `rest` to it and stop (groups shadow leaves)
//! 4. drop leaves whose token span cannot fit `rest`
//! 5. pre-fetch the mentions the hungriest surviving leaf could consume
//! 6. convert each surviving leaf in declaration order; call the first that
//!    converts fully
//!
//! Anything else ends in a [`CommandFailure`].

use super::arguments::Arguments;
use super::configuration::Configuration;
use super::failure::{CommandFailure, FailedCandidate, FailureKind};
use super::handler::{CommandHandler, Invocation};
use super::middleware::ResponseSink;
use super::pipeline::convert_arguments;
use super::prefetch::{KnownEntities, MentionNeeds, MentionPrefetcher};
use super::tree::{CommandNode, CommandTree, Container, Leaf};
use crate::error::HandlerError;
use crate::resolver::EntityResolver;
use crate::telemetry::{CommandTimer, spans};
use futures_util::future::BoxFuture;
use relaybot_model::MessageCreated;
use std::sync::Arc;
use tracing::{Instrument, debug, trace, warn};

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message did not start with the prefix.
    Ignored,
    /// A handler ran to completion.
    Invoked {
        /// Names matched from the root, as typed.
        path: Vec<String>,
    },
    /// No handler ran.
    Failed(CommandFailure),
}

/// State for dispatching one message.
pub(crate) struct Dispatcher<'a> {
    pub(crate) config: &'a Configuration,
    pub(crate) resolver: &'a dyn EntityResolver,
    pub(crate) message: &'a Arc<MessageCreated>,
    pub(crate) sink: &'a ResponseSink,
}

impl<'a> Dispatcher<'a> {
    /// Dispatch the message against `tree`.
    ///
    /// Handler errors propagate; failures are returned as data.
    pub(crate) async fn run(&self, tree: &CommandTree) -> Result<DispatchOutcome, HandlerError> {
        let Some(text) = self.config.strip_prefix(&self.message.content) else {
            trace!("No prefix, ignoring");
            return Ok(DispatchOutcome::Ignored);
        };
        let mut known = KnownEntities::default();
        self.level(tree.roots(), Vec::new(), text, &mut known, 0)
            .await
    }

    fn level<'s>(
        &'s self,
        nodes: &'s [CommandNode],
        mut path: Vec<String>,
        text: &'s str,
        known: &'s mut KnownEntities,
        depth: usize,
    ) -> BoxFuture<'s, Result<DispatchOutcome, HandlerError>> {
        Box::pin(async move {
            let tokenizer = self.config.tokenizer();
            let (name, rest) = tokenizer.split_name(text);
            path.push(name.to_string());

            let matched: Vec<&CommandNode> =
                nodes.iter().filter(|n| n.names().matches(name)).collect();
            debug!(depth, command = name, candidates = matched.len(), "Dispatch level");
            if matched.is_empty() {
                return Ok(self.fail(FailureKind::NoCommandFound, &path, rest));
            }

            let container = matched.iter().find_map(|n| match *n {
                CommandNode::Container(c) => Some(c),
                CommandNode::Leaf(_) => None,
            });
            if let Some(container) = container {
                return self.container(container, path, rest, known, depth).await;
            }

            let count = tokenizer.count(rest);
            let leaves: Vec<&Leaf> = matched
                .iter()
                .filter_map(|n| match *n {
                    CommandNode::Leaf(leaf) => Some(leaf),
                    CommandNode::Container(_) => None,
                })
                .filter(|leaf| self.config.leaf_span(leaf).contains(count))
                .collect();
            if leaves.is_empty() {
                debug!(depth, tokens = count, "No candidate accepts this many tokens");
                return Ok(self.fail(FailureKind::BadArgumentCount, &path, rest));
            }

            let needs = leaves
                .iter()
                .fold(MentionNeeds::default(), |acc, leaf| {
                    acc.max(self.config.mention_needs(leaf))
                });
            MentionPrefetcher::new(self.resolver)
                .prefetch(self.message, needs, known)
                .await;

            let usage_path = path.join(" ");
            let mut failures = Vec::new();
            for leaf in leaves {
                match convert_arguments(leaf.arguments(), rest, self.config, known) {
                    Ok(arguments) => {
                        return self.invoke(leaf.handler(), path, rest, arguments).await;
                    }
                    Err(argument) => {
                        trace!(usage = %leaf.usage(&usage_path), %argument, "Candidate rejected");
                        failures.push(FailedCandidate {
                            usage: leaf.usage(&usage_path),
                            argument,
                        });
                    }
                }
            }
            Ok(self.fail(FailureKind::BadArguments(failures), &path, rest))
        })
    }

    async fn container(
        &self,
        container: &Container,
        path: Vec<String>,
        rest: &str,
        known: &mut KnownEntities,
        depth: usize,
    ) -> Result<DispatchOutcome, HandlerError> {
        if rest.is_empty() {
            return match container.index().or(container.unknown()) {
                Some(fallback) => self.invoke(fallback, path, rest, Arguments::empty()).await,
                None => Ok(self.fail(FailureKind::Unspecified, &path, rest)),
            };
        }

        if let Some(unknown) = container.unknown() {
            let (sub, _) = self.config.tokenizer().split_name(rest);
            if !container.children().iter().any(|c| c.names().matches(sub)) {
                return self.invoke(unknown, path, rest, Arguments::empty()).await;
            }
        }

        self.level(container.children(), path, rest, known, depth + 1)
            .await
    }

    async fn invoke(
        &self,
        handler: &Arc<dyn CommandHandler>,
        path: Vec<String>,
        raw_arguments: &str,
        arguments: Arguments,
    ) -> Result<DispatchOutcome, HandlerError> {
        let command = path.join(" ");
        let invocation = Invocation {
            message: Arc::clone(self.message),
            prefix: self.config.prefix().to_string(),
            path: path.clone(),
            raw_arguments: raw_arguments.to_string(),
            sink: self.sink.clone(),
        };

        debug!(command = %command, arguments = arguments.len(), "Invoking handler");
        let result = {
            let _timer = CommandTimer::new(command.clone());
            handler
                .call(invocation, arguments)
                .instrument(spans::command(&command))
                .await
        };

        match result {
            Ok(()) => Ok(DispatchOutcome::Invoked { path }),
            Err(e) => {
                crate::metrics::record_handler_error(&command, e.error_code());
                warn!(command = %command, error = %e, "Handler failed");
                Err(e)
            }
        }
    }

    fn fail(&self, kind: FailureKind, path: &[String], rest: &str) -> DispatchOutcome {
        let failure = CommandFailure {
            kind,
            command_name: path.join(" "),
            raw_arguments: rest.to_string(),
            prefix: self.config.prefix().to_string(),
        };
        debug!(
            kind = failure.kind.label(),
            command = %failure.command_name,
            "Dispatch failed"
        );
        DispatchOutcome::Failed(failure)
    }
}
