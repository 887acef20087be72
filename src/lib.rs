//! Relaybot - typed, hierarchical text commands for chat bots.
//!
//! Declare commands and groups with a builder, hand the tree to a
//! [`CommandService`](commands::CommandService), and feed it
//! [`MessageCreated`](relaybot_model::MessageCreated) notifications. The
//! service recognizes the prefix, walks the tree, resolves `@member`,
//! `@role` and `#channel` mentions on demand, converts arguments into typed
//! values and calls the first fully matching handler. Everything else is
//! reported as a [`CommandFailure`](commands::CommandFailure).
//!
//! ```rust
//! use relaybot::commands::{
//!     handler_fn, Arg, Arguments, Command, CommandService, CommandTree, Configuration,
//!     DispatchOutcome, Invocation, ResponseSink,
//! };
//! use relaybot::resolver::Directory;
//! use relaybot_model::MessageCreated;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let tree = CommandTree::builder()
//!     .command(
//!         Command::new("add", handler_fn(|inv: Invocation, args: Arguments| async move {
//!             let a = args.require::<i64>("a")?;
//!             let b = args.require::<i64>("b")?;
//!             inv.reply((a + b).to_string()).await
//!         }))
//!         .arg(Arg::new::<i64>("a"))
//!         .arg(Arg::new::<i64>("b")),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let service =
//!     CommandService::new(Configuration::new("/"), tree, Arc::new(Directory::new())).unwrap();
//! let (sink, replies) = ResponseSink::capturing();
//! let message = Arc::new(MessageCreated::new("m1", "c1", "u1", "/add 2 40"));
//!
//! let outcome = service.dispatch(message, sink).await.unwrap();
//! assert!(matches!(outcome, DispatchOutcome::Invoked { .. }));
//! assert_eq!(replies.lock().await[0].content, "42");
//! # }
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod resolver;
pub mod telemetry;

pub use relaybot_model as model;
