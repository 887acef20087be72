//! Entity lookup collaborator.
//!
//! The dispatcher resolves mention references through an [`EntityResolver`].
//! A real deployment backs it with the chat service's API; [`Directory`] is an
//! in-memory implementation used by the demo bot and the tests.

use async_trait::async_trait;
use dashmap::DashMap;
use relaybot_model::{
    Channel, ChannelId, LookupError, Member, MentionKind, Mentionable, Mentions, Role, RoleId,
    ServerId, UserId,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

/// Looks up mentioned entities by id.
///
/// Implementations may be slow (a network round trip each); the dispatcher
/// only calls them for references a candidate could actually consume, and
/// issues independent lookups concurrently.
#[async_trait]
pub trait EntityResolver: Send + Sync {
    /// Look up a member of `server` (or a direct-message participant when
    /// `server` is `None`).
    async fn member(&self, server: Option<&ServerId>, id: &UserId) -> Result<Member, LookupError>;

    /// Look up a role of `server`.
    async fn role(&self, server: Option<&ServerId>, id: &RoleId) -> Result<Role, LookupError>;

    /// Look up a channel.
    async fn channel(&self, id: &ChannelId) -> Result<Channel, LookupError>;
}

/// In-memory entity directory.
///
/// Counts every lookup per kind so callers can observe how many round trips a
/// dispatch cost.
#[derive(Default)]
pub struct Directory {
    members: DashMap<UserId, Member>,
    roles: DashMap<RoleId, Role>,
    channels: DashMap<ChannelId, Channel>,
    member_lookups: AtomicU64,
    role_lookups: AtomicU64,
    channel_lookups: AtomicU64,
    latency: Option<Duration>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every lookup by `latency`, as a remote service would.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert_member(&self, member: Member) {
        self.members.insert(member.id.clone(), member);
    }

    pub fn insert_role(&self, role: Role) {
        self.roles.insert(role.id.clone(), role);
    }

    pub fn insert_channel(&self, channel: Channel) {
        self.channels.insert(channel.id.clone(), channel);
    }

    /// Build the mention reference lists for plain `text`, the way a chat
    /// service reports them alongside a message.
    ///
    /// Every `@` or `#` followed by a known display name yields a reference,
    /// in order of appearance, without duplicates. Does not count as a lookup.
    pub fn mentions_in(&self, text: &str) -> Mentions {
        let mut mentions = Mentions::default();
        for (at, sigil) in text.char_indices().filter(|(_, c)| *c == '@' || *c == '#') {
            let body = &text[at + sigil.len_utf8()..];
            if sigil == '#' {
                if let Some(id) = longest_prefix(body, self.channels.iter().map(|c| (c.id.clone(), c.name.clone())))
                    && !mentions.channels.contains(&id)
                {
                    mentions.channels.push(id);
                }
                continue;
            }
            let members = self
                .members
                .iter()
                .map(|m| (m.id.clone(), m.display_name().to_string()));
            if let Some(id) = longest_prefix(body, members)
                && !mentions.users.contains(&id)
            {
                mentions.users.push(id);
            }
            if let Some(id) = longest_prefix(body, self.roles.iter().map(|r| (r.id.clone(), r.name.clone())))
                && !mentions.roles.contains(&id)
            {
                mentions.roles.push(id);
            }
        }
        mentions
    }

    /// Lookups served so far for `kind`.
    pub fn lookups(&self, kind: MentionKind) -> u64 {
        self.counter(kind).load(Ordering::Relaxed)
    }

    pub fn total_lookups(&self) -> u64 {
        MentionKind::ALL.iter().map(|k| self.lookups(*k)).sum()
    }

    fn counter(&self, kind: MentionKind) -> &AtomicU64 {
        match kind {
            MentionKind::Member => &self.member_lookups,
            MentionKind::Role => &self.role_lookups,
            MentionKind::Channel => &self.channel_lookups,
        }
    }

    async fn begin(&self, kind: MentionKind, id: &str) {
        self.counter(kind).fetch_add(1, Ordering::Relaxed);
        trace!(%kind, id, "Directory lookup");
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

/// Id of the longest name that prefixes `body`.
fn longest_prefix<I>(body: &str, entries: impl Iterator<Item = (I, String)>) -> Option<I> {
    entries
        .filter(|(_, name)| !name.is_empty() && body.starts_with(name.as_str()))
        .max_by_key(|(_, name)| name.len())
        .map(|(id, _)| id)
}

fn not_found(kind: MentionKind, id: impl ToString) -> LookupError {
    LookupError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[async_trait]
impl EntityResolver for Directory {
    async fn member(&self, _server: Option<&ServerId>, id: &UserId) -> Result<Member, LookupError> {
        self.begin(MentionKind::Member, id.as_str()).await;
        self.members
            .get(id)
            .map(|m| m.value().clone())
            .ok_or_else(|| not_found(MentionKind::Member, id))
    }

    async fn role(&self, _server: Option<&ServerId>, id: &RoleId) -> Result<Role, LookupError> {
        self.begin(MentionKind::Role, id.as_str()).await;
        self.roles
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| not_found(MentionKind::Role, id))
    }

    async fn channel(&self, id: &ChannelId) -> Result<Channel, LookupError> {
        self.begin(MentionKind::Channel, id.as_str()).await;
        self.channels
            .get(id)
            .map(|c| c.value().clone())
            .ok_or_else(|| not_found(MentionKind::Channel, id))
    }
}
