//! Command handlers and their invocation context.

use super::arguments::Arguments;
use super::middleware::ResponseSink;
use crate::error::HandlerResult;
use async_trait::async_trait;
use relaybot_model::{MessageCreated, Reply, UserId};
use std::future::Future;
use std::sync::Arc;

/// Context handed to a matched handler.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The message that triggered the command.
    pub message: Arc<MessageCreated>,
    /// The prefix the message started with.
    pub prefix: String,
    /// Names matched from the root to the invoked node, as typed.
    pub path: Vec<String>,
    /// Argument text the invoked node received, untokenized.
    pub raw_arguments: String,
    /// Where replies go.
    pub sink: ResponseSink,
}

impl Invocation {
    /// The invoked path joined with spaces, e.g. `role give`.
    pub fn command_name(&self) -> String {
        self.path.join(" ")
    }

    pub fn author(&self) -> &UserId {
        &self.message.author_id
    }

    /// Reply in the message's channel.
    pub async fn reply(&self, content: impl Into<String>) -> HandlerResult {
        self.sink.send(Reply::to(&self.message, content)).await
    }

    /// Send an arbitrary reply through this invocation's sink.
    pub async fn send(&self, reply: Reply) -> HandlerResult {
        self.sink.send(reply).await
    }
}

/// An invocable command body.
///
/// Errors returned from a handler are never swallowed by the dispatcher;
/// they propagate to whoever awaited the dispatch.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn call(&self, invocation: Invocation, arguments: Arguments) -> HandlerResult;
}

/// Adapter that lets an async closure act as a [`CommandHandler`].
pub struct FnHandler<F>(F);

/// Wrap an async closure as a handler.
///
/// ```rust
/// use relaybot::commands::{handler_fn, Arguments, Invocation};
///
/// let _ping = handler_fn(|inv: Invocation, _args: Arguments| async move {
///     inv.reply("pong").await
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Invocation, Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(Invocation, Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn call(&self, invocation: Invocation, arguments: Arguments) -> HandlerResult {
        (self.0)(invocation, arguments).await
    }
}
