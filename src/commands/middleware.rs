//! Response routing for command handlers.
//!
//! Handlers never talk to the chat service. They hand [`Reply`] values to a
//! [`ResponseSink`], which either forwards them to the outbound queue or
//! buffers them (tests, help rendering, dry runs).

use crate::error::HandlerError;
use relaybot_model::Reply;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

/// Default time to wait on a full outbound queue before giving up.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Where handler replies go.
#[derive(Clone)]
pub enum ResponseSink {
    /// Forward to the outbound queue, waiting at most the given duration.
    Direct(mpsc::Sender<Reply>, Duration),
    /// Buffer replies in memory.
    Capturing(Arc<Mutex<Vec<Reply>>>),
}

impl ResponseSink {
    /// A direct sink with [`DEFAULT_SEND_TIMEOUT`].
    pub fn direct(tx: mpsc::Sender<Reply>) -> Self {
        Self::Direct(tx, DEFAULT_SEND_TIMEOUT)
    }

    /// A capturing sink and a handle to its buffer.
    pub fn capturing() -> (Self, Arc<Mutex<Vec<Reply>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        (Self::Capturing(Arc::clone(&buf)), buf)
    }

    /// Send or buffer a reply.
    ///
    /// A direct send that cannot enqueue within the timeout fails with
    /// [`HandlerError::SendTimeout`]; the reply is dropped.
    pub async fn send(&self, reply: Reply) -> Result<(), HandlerError> {
        match self {
            Self::Direct(tx, timeout) => match tokio::time::timeout(*timeout, tx.send(reply)).await {
                Ok(result) => result.map_err(HandlerError::from),
                Err(_elapsed) => {
                    tracing::warn!(
                        capacity = tx.max_capacity(),
                        "Outbound queue full (timeout after {:?})",
                        timeout
                    );
                    Err(HandlerError::SendTimeout)
                }
            },
            Self::Capturing(buf) => {
                buf.lock().await.push(reply);
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for ResponseSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(_, timeout) => f.debug_tuple("Direct").field(timeout).finish(),
            Self::Capturing(_) => f.write_str("Capturing"),
        }
    }
}
