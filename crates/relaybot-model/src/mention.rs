//! Mention references and the mentionable-entity trait.

use crate::id::{ChannelId, RoleId, UserId};
use std::fmt;
use std::hash::Hash;

/// The three kinds of entity a chat message can mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MentionKind {
    /// A server member, written `@name`.
    Member,
    /// A server role, written `@name`.
    Role,
    /// A channel, written `#name`.
    Channel,
}

impl MentionKind {
    /// All kinds, in table order.
    pub const ALL: [MentionKind; 3] = [MentionKind::Member, MentionKind::Role, MentionKind::Channel];

    /// The sigil that introduces a mention of this kind in message text.
    pub fn sigil(self) -> char {
        match self {
            Self::Member | Self::Role => '@',
            Self::Channel => '#',
        }
    }

    /// Lowercase label, suitable for logs and metric labels.
    pub fn label(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Role => "role",
            Self::Channel => "channel",
        }
    }
}

impl fmt::Display for MentionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An entity that can be referenced by a mention token.
pub trait Mentionable {
    /// Identifier type of the entity.
    type Id: Clone + Eq + Hash + fmt::Display + Send + Sync;

    /// Which mention table the entity lives in.
    const KIND: MentionKind;

    /// The entity's identifier.
    fn id(&self) -> &Self::Id;

    /// The name a mention token spells out after the sigil.
    fn display_name(&self) -> &str;
}

/// Mention references attached to a message by the chat service.
///
/// Each list keeps the order in which the service reported the references.
/// Duplicates are allowed; consumers decide whether to collapse them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mentions {
    /// Mentioned users.
    #[cfg_attr(feature = "serde", serde(default))]
    pub users: Vec<UserId>,
    /// Mentioned roles.
    #[cfg_attr(feature = "serde", serde(default))]
    pub roles: Vec<RoleId>,
    /// Mentioned channels.
    #[cfg_attr(feature = "serde", serde(default))]
    pub channels: Vec<ChannelId>,
}

impl Mentions {
    /// Append a user reference.
    pub fn with_user(mut self, id: impl Into<UserId>) -> Self {
        self.users.push(id.into());
        self
    }

    /// Append a role reference.
    pub fn with_role(mut self, id: impl Into<RoleId>) -> Self {
        self.roles.push(id.into());
        self
    }

    /// Append a channel reference.
    pub fn with_channel(mut self, id: impl Into<ChannelId>) -> Self {
        self.channels.push(id.into());
        self
    }

    /// Number of references of the given kind.
    pub fn count(&self, kind: MentionKind) -> usize {
        match kind {
            MentionKind::Member => self.users.len(),
            MentionKind::Role => self.roles.len(),
            MentionKind::Channel => self.channels.len(),
        }
    }

    /// True when the message mentions nothing.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.roles.is_empty() && self.channels.is_empty()
    }
}
