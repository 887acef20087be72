//! Integration test common infrastructure.
//!
//! Provides a seeded directory, a recorder for handler calls, and helpers
//! that dispatch one message and collect the replies.

#![allow(dead_code)]

use parking_lot::Mutex;
use relaybot::commands::{
    Arguments, CommandHandler, CommandService, CommandTree, Configuration, DispatchOutcome,
    Invocation, ResponseSink, handler_fn,
};
use relaybot::error::HandlerError;
use relaybot::resolver::{Directory, EntityResolver};
use relaybot_model::{Channel, Member, MessageCreated, Reply, Role};
use std::sync::Arc;

/// Directory with four members, one role and one channel.
pub fn directory() -> Arc<Directory> {
    let dir = Directory::new();
    dir.insert_member(Member::new("u1", "alice"));
    dir.insert_member(Member::new("u2", "John"));
    dir.insert_member(Member::new("u3", "Jo"));
    dir.insert_member(Member::new("u4", "Mary Ann"));
    dir.insert_role(Role::new("r1", "mods"));
    dir.insert_channel(Channel::new("c1", "general").in_server("s1"));
    Arc::new(dir)
}

/// A message in `#general` whose mentions are derived from its text.
pub fn message(dir: &Directory, text: &str) -> Arc<MessageCreated> {
    Arc::new(
        MessageCreated::new("m1", "c1", "u9", text)
            .with_mentions(dir.mentions_in(text))
            .in_server("s1"),
    )
}

pub fn build_service(tree: CommandTree, dir: &Arc<Directory>) -> CommandService {
    build_service_with(Configuration::new("/"), tree, dir)
}

pub fn build_service_with(
    config: Configuration,
    tree: CommandTree,
    dir: &Arc<Directory>,
) -> CommandService {
    let resolver: Arc<dyn EntityResolver> = dir.clone();
    CommandService::new(config, tree, resolver).expect("valid tree")
}

/// Dispatch `text` and return the outcome with every captured reply.
pub async fn dispatch(
    service: &CommandService,
    dir: &Directory,
    text: &str,
) -> (Result<DispatchOutcome, HandlerError>, Vec<Reply>) {
    dispatch_message(service, message(dir, text)).await
}

pub async fn dispatch_message(
    service: &CommandService,
    message: Arc<MessageCreated>,
) -> (Result<DispatchOutcome, HandlerError>, Vec<Reply>) {
    let (sink, buf) = ResponseSink::capturing();
    let outcome = service.dispatch(message, sink).await;
    let replies = buf.lock().await.clone();
    (outcome, replies)
}

/// Records which handlers ran and with what argument text.
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<(String, String)>>>);

impl Calls {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that records `label` and the rejoined argument text.
    pub fn handler(&self, label: &'static str) -> impl CommandHandler + 'static {
        let calls = Arc::clone(&self.0);
        handler_fn(move |_inv: Invocation, args: Arguments| {
            let calls = Arc::clone(&calls);
            async move {
                calls.lock().push((label.to_string(), args.rejoin(" ")));
                Ok(())
            }
        })
    }

    /// A handler that records `label` and the raw argument text it received.
    pub fn fallback(&self, label: &'static str) -> impl CommandHandler + 'static {
        let calls = Arc::clone(&self.0);
        handler_fn(move |inv: Invocation, _args: Arguments| {
            let calls = Arc::clone(&calls);
            async move {
                calls.lock().push((label.to_string(), inv.raw_arguments.clone()));
                Ok(())
            }
        })
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.lock().iter().map(|(label, _)| label.clone()).collect()
    }

    pub fn all(&self) -> Vec<(String, String)> {
        self.0.lock().clone()
    }
}
