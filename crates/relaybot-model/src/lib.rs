//! # relaybot-model
//!
//! Data types for the chat surface consumed by the relaybot command engine.
//!
//! The engine never talks to a chat service directly. It receives a
//! [`MessageCreated`] notification, resolves `@member`, `@role` and
//! `#channel` mentions through a lookup collaborator, and hands handlers a way
//! to produce a [`Reply`]. Everything in this crate is plain data.
//!
//! ## Quick Start
//!
//! ```rust
//! use relaybot_model::{ChannelId, Mentions, MessageCreated, UserId};
//!
//! let msg = MessageCreated::new("m1", ChannelId::from("general"), UserId::from("u1"), "/ping")
//!     .with_mentions(Mentions::default().with_user("u2"));
//!
//! assert_eq!(msg.content, "/ping");
//! assert_eq!(msg.mentions.users.len(), 1);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod entity;
pub mod error;
pub mod id;
pub mod mention;
pub mod message;

pub use entity::{Channel, Member, Role};
pub use error::LookupError;
pub use id::{ChannelId, MessageId, RoleId, ServerId, UserId};
pub use mention::{MentionKind, Mentionable, Mentions};
pub use message::{MessageCreated, Reply};
