//! The command service: configuration, tree and resolver bundled for use.

use super::configuration::Configuration;
use super::dispatch::{DispatchOutcome, Dispatcher};
use super::failure::CommandFailure;
use super::middleware::ResponseSink;
use super::tree::CommandTree;
use crate::error::{HandlerError, TreeError};
use crate::resolver::EntityResolver;
use crate::telemetry::spans;
use parking_lot::Mutex;
use relaybot_model::{MessageCreated, Reply};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{Instrument, error, info, warn};

/// Buffered failure events per subscriber.
pub const FAILURE_QUEUE_CAPACITY: usize = 64;

/// Dispatches inbound messages against a command tree.
///
/// Cheap to clone; clones share the tree, configuration, resolver and
/// failure subscribers.
#[derive(Clone)]
pub struct CommandService {
    config: Arc<Configuration>,
    tree: Arc<CommandTree>,
    resolver: Arc<dyn EntityResolver>,
    subscribers: Arc<Mutex<Vec<mpsc::Sender<CommandFailure>>>>,
}

impl CommandService {
    /// Check `tree` against `config` and assemble the service.
    pub fn new(
        config: Configuration,
        tree: CommandTree,
        resolver: Arc<dyn EntityResolver>,
    ) -> Result<Self, TreeError> {
        config.validate_tree(&tree)?;
        let mut leaves = 0usize;
        tree.for_each_leaf(|_, _| leaves += 1);
        info!(
            prefix = config.prefix(),
            roots = tree.roots().len(),
            leaves,
            "Command service ready"
        );
        Ok(Self {
            config: Arc::new(config),
            tree: Arc::new(tree),
            resolver,
            subscribers: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// Receive every future dispatch failure.
    ///
    /// A subscriber that falls more than [`FAILURE_QUEUE_CAPACITY`] events
    /// behind misses events; a dropped receiver is forgotten.
    pub fn subscribe_failures(&self) -> mpsc::Receiver<CommandFailure> {
        let (tx, rx) = mpsc::channel(FAILURE_QUEUE_CAPACITY);
        self.subscribers.lock().push(tx);
        rx
    }

    /// Dispatch one message.
    ///
    /// Failures are returned in the outcome and published to subscribers.
    /// An error from a matched handler is returned as `Err`.
    pub async fn dispatch(
        &self,
        message: Arc<MessageCreated>,
        sink: ResponseSink,
    ) -> Result<DispatchOutcome, HandlerError> {
        let span = spans::dispatch(&message);
        async {
            let dispatcher = Dispatcher {
                config: &self.config,
                resolver: self.resolver.as_ref(),
                message: &message,
                sink: &sink,
            };
            let outcome = dispatcher.run(&self.tree).await?;
            match &outcome {
                DispatchOutcome::Ignored => crate::metrics::record_ignored(),
                DispatchOutcome::Failed(failure) => {
                    crate::metrics::record_failure(failure.kind.label());
                    self.publish(failure);
                }
                DispatchOutcome::Invoked { .. } => {}
            }
            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    /// Dispatch every message from `inbound` on its own task until the
    /// channel closes. Replies go to `outbound`.
    pub async fn serve(self, mut inbound: mpsc::Receiver<MessageCreated>, outbound: mpsc::Sender<Reply>) {
        while let Some(message) = inbound.recv().await {
            let service = self.clone();
            let sink = ResponseSink::direct(outbound.clone());
            tokio::spawn(async move {
                if let Err(e) = service.dispatch(Arc::new(message), sink).await {
                    error!(error = %e, code = e.error_code(), "Command handler failed");
                }
            });
        }
        info!("Inbound message stream closed");
    }

    fn publish(&self, failure: &CommandFailure) {
        self.subscribers
            .lock()
            .retain(|tx| match tx.try_send(failure.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!("Failure subscriber lagging, dropping event");
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            });
    }
}

impl std::fmt::Debug for CommandService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandService")
            .field("config", &self.config)
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}
