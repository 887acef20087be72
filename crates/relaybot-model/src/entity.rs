//! Mentionable entities: members, roles and channels.

use crate::id::{ChannelId, RoleId, ServerId, UserId};
use crate::mention::{MentionKind, Mentionable};

/// A member of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Member {
    /// The member's user id.
    pub id: UserId,
    /// Account name.
    pub name: String,
    /// Server-specific nickname, shown instead of the account name when set.
    #[cfg_attr(feature = "serde", serde(default))]
    pub nickname: Option<String>,
    /// Roles held by the member.
    #[cfg_attr(feature = "serde", serde(default))]
    pub roles: Vec<RoleId>,
}

impl Member {
    /// Create a member with no nickname and no roles.
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nickname: None,
            roles: Vec::new(),
        }
    }

    /// Set the server nickname.
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Grant a role.
    pub fn with_role(mut self, role: impl Into<RoleId>) -> Self {
        self.roles.push(role.into());
        self
    }
}

impl Mentionable for Member {
    type Id = UserId;
    const KIND: MentionKind = MentionKind::Member;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.name)
    }
}

/// A server role.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Role {
    /// Role id.
    pub id: RoleId,
    /// Role name.
    pub name: String,
}

impl Role {
    /// Create a role.
    pub fn new(id: impl Into<RoleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Mentionable for Role {
    type Id = RoleId;
    const KIND: MentionKind = MentionKind::Role;

    fn id(&self) -> &RoleId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// A channel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    /// Channel id.
    pub id: ChannelId,
    /// Channel name, without the `#` sigil.
    pub name: String,
    /// Server the channel belongs to, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub server_id: Option<ServerId>,
}

impl Channel {
    /// Create a channel that belongs to no particular server.
    pub fn new(id: impl Into<ChannelId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            server_id: None,
        }
    }

    /// Attach the channel to a server.
    pub fn in_server(mut self, server: impl Into<ServerId>) -> Self {
        self.server_id = Some(server.into());
        self
    }
}

impl Mentionable for Channel {
    type Id = ChannelId;
    const KIND: MentionKind = MentionKind::Channel;

    fn id(&self) -> &ChannelId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}
