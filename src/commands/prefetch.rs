//! Mention pre-fetching.
//!
//! Mention converters never perform I/O. Before candidates at a dispatch
//! level are tried, the dispatcher computes how many members, roles and
//! channels the hungriest surviving candidate could consume, and the
//! [`MentionPrefetcher`] resolves exactly the missing number of the message's
//! mention references into the per-message [`KnownEntities`] tables.

use crate::metrics;
use crate::resolver::EntityResolver;
use futures_util::future::{BoxFuture, join_all};
use relaybot_model::{Channel, LookupError, Member, MentionKind, Mentionable, MessageCreated, Role};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Append-only tables of entities resolved for one message.
///
/// Tables only grow: entries are never replaced or removed while the message
/// is being dispatched.
#[derive(Debug, Clone, Default)]
pub struct KnownEntities {
    members: Vec<Member>,
    roles: Vec<Role>,
    channels: Vec<Channel>,
    /// `(kind, id)` pairs already looked up, successfully or not.
    attempted: HashSet<(MentionKind, String)>,
}

impl KnownEntities {
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// The table for `E`.
    pub fn get<E: KnownEntity>(&self) -> &[E] {
        E::table(self)
    }

    pub fn count(&self, kind: MentionKind) -> usize {
        match kind {
            MentionKind::Member => self.members.len(),
            MentionKind::Role => self.roles.len(),
            MentionKind::Channel => self.channels.len(),
        }
    }

    /// Append `entity` unless an entity with the same id is already known.
    pub fn insert<E: KnownEntity>(&mut self, entity: E) -> bool {
        let table = E::table_mut(self);
        if table.iter().any(|e| e.id() == entity.id()) {
            return false;
        }
        table.push(entity);
        true
    }

    fn was_attempted(&self, kind: MentionKind, id: &str) -> bool {
        self.attempted.contains(&(kind, id.to_string()))
    }

    /// References of `kind` looked up so far, failed ones included.
    fn attempted_count(&self, kind: MentionKind) -> usize {
        self.attempted.iter().filter(|(k, _)| *k == kind).count()
    }
}

/// Entity types that have a mention table and a lookup.
pub trait KnownEntity: Mentionable + Clone + Send + Sync + 'static {
    fn table(known: &KnownEntities) -> &Vec<Self>;
    fn table_mut(known: &mut KnownEntities) -> &mut Vec<Self>;
    /// The message's references to entities of this type, in reported order.
    fn references(message: &MessageCreated) -> &[Self::Id];
    fn fetch<'a>(
        resolver: &'a dyn EntityResolver,
        message: &'a MessageCreated,
        id: &'a Self::Id,
    ) -> BoxFuture<'a, Result<Self, LookupError>>;
}

impl KnownEntity for Member {
    fn table(known: &KnownEntities) -> &Vec<Self> {
        &known.members
    }

    fn table_mut(known: &mut KnownEntities) -> &mut Vec<Self> {
        &mut known.members
    }

    fn references(message: &MessageCreated) -> &[Self::Id] {
        &message.mentions.users
    }

    fn fetch<'a>(
        resolver: &'a dyn EntityResolver,
        message: &'a MessageCreated,
        id: &'a Self::Id,
    ) -> BoxFuture<'a, Result<Self, LookupError>> {
        resolver.member(message.server_id.as_ref(), id)
    }
}

impl KnownEntity for Role {
    fn table(known: &KnownEntities) -> &Vec<Self> {
        &known.roles
    }

    fn table_mut(known: &mut KnownEntities) -> &mut Vec<Self> {
        &mut known.roles
    }

    fn references(message: &MessageCreated) -> &[Self::Id] {
        &message.mentions.roles
    }

    fn fetch<'a>(
        resolver: &'a dyn EntityResolver,
        message: &'a MessageCreated,
        id: &'a Self::Id,
    ) -> BoxFuture<'a, Result<Self, LookupError>> {
        resolver.role(message.server_id.as_ref(), id)
    }
}

impl KnownEntity for Channel {
    fn table(known: &KnownEntities) -> &Vec<Self> {
        &known.channels
    }

    fn table_mut(known: &mut KnownEntities) -> &mut Vec<Self> {
        &mut known.channels
    }

    fn references(message: &MessageCreated) -> &[Self::Id] {
        &message.mentions.channels
    }

    fn fetch<'a>(
        resolver: &'a dyn EntityResolver,
        _message: &'a MessageCreated,
        id: &'a Self::Id,
    ) -> BoxFuture<'a, Result<Self, LookupError>> {
        resolver.channel(id)
    }
}

/// Per-kind number of mentions a candidate (or candidate set) may consume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MentionNeeds {
    pub members: usize,
    pub roles: usize,
    pub channels: usize,
}

impl MentionNeeds {
    pub fn get(&self, kind: MentionKind) -> usize {
        match kind {
            MentionKind::Member => self.members,
            MentionKind::Role => self.roles,
            MentionKind::Channel => self.channels,
        }
    }

    /// Count one more argument of `kind`.
    pub fn add(&mut self, kind: MentionKind) {
        match kind {
            MentionKind::Member => self.members += 1,
            MentionKind::Role => self.roles += 1,
            MentionKind::Channel => self.channels += 1,
        }
    }

    /// Per-kind maximum of two needs.
    pub fn max(self, other: MentionNeeds) -> MentionNeeds {
        MentionNeeds {
            members: self.members.max(other.members),
            roles: self.roles.max(other.roles),
            channels: self.channels.max(other.channels),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members == 0 && self.roles == 0 && self.channels == 0
    }
}

/// Resolves mention references on demand, bounded by [`MentionNeeds`].
pub struct MentionPrefetcher<'a> {
    resolver: &'a dyn EntityResolver,
}

impl<'a> MentionPrefetcher<'a> {
    pub fn new(resolver: &'a dyn EntityResolver) -> Self {
        Self { resolver }
    }

    /// Top up `known` so each table holds at least `needs` entries, if the
    /// message has enough references. Returns the number of lookups issued.
    ///
    /// References already known or already attempted are skipped, so calling
    /// this again with the same needs issues no lookups.
    pub async fn prefetch(
        &self,
        message: &MessageCreated,
        needs: MentionNeeds,
        known: &mut KnownEntities,
    ) -> usize {
        if needs.is_empty() {
            return 0;
        }

        let members = plan::<Member>(message, needs.members, known);
        let roles = plan::<Role>(message, needs.roles, known);
        let channels = plan::<Channel>(message, needs.channels, known);
        let issued = members.len() + roles.len() + channels.len();
        if issued == 0 {
            return 0;
        }
        debug!(
            members = members.len(),
            roles = roles.len(),
            channels = channels.len(),
            "Pre-fetching mentions"
        );

        mark_attempted::<Member>(known, &members);
        mark_attempted::<Role>(known, &roles);
        mark_attempted::<Channel>(known, &channels);

        let (members, roles, channels) = tokio::join!(
            self.fetch_all::<Member>(message, &members),
            self.fetch_all::<Role>(message, &roles),
            self.fetch_all::<Channel>(message, &channels),
        );

        store(known, members);
        store(known, roles);
        store(known, channels);

        issued
    }

    async fn fetch_all<E: KnownEntity>(
        &self,
        message: &MessageCreated,
        ids: &[E::Id],
    ) -> Vec<(E::Id, Result<E, LookupError>)> {
        join_all(ids.iter().map(|id| async move {
            (id.clone(), E::fetch(self.resolver, message, id).await)
        }))
        .await
    }
}

/// Pick the references to look up: the first `need - attempted` ones that
/// are neither known nor already attempted.
///
/// A failed lookup still fills its slot, so the total number of lookups per
/// kind never exceeds `need`.
fn plan<E: KnownEntity>(message: &MessageCreated, need: usize, known: &KnownEntities) -> Vec<E::Id> {
    let table = E::table(known);
    let spent = table.len().max(known.attempted_count(E::KIND));
    let missing = need.saturating_sub(spent);
    let mut picked: Vec<E::Id> = Vec::new();
    if missing == 0 {
        return picked;
    }

    for id in E::references(message) {
        if picked.len() == missing {
            break;
        }
        let already = picked.contains(id)
            || table.iter().any(|e| e.id() == id)
            || known.was_attempted(E::KIND, &id.to_string());
        if !already {
            picked.push(id.clone());
        }
    }
    picked
}

fn mark_attempted<E: KnownEntity>(known: &mut KnownEntities, ids: &[E::Id]) {
    for id in ids {
        known.attempted.insert((E::KIND, id.to_string()));
    }
}

fn store<E: KnownEntity>(known: &mut KnownEntities, results: Vec<(E::Id, Result<E, LookupError>)>) {
    for (id, result) in results {
        match result {
            Ok(entity) => {
                metrics::record_mention_lookup(E::KIND, "ok");
                known.insert(entity);
            }
            Err(e) => {
                metrics::record_mention_lookup(E::KIND, e.error_code());
                warn!(kind = %E::KIND, id = %id, error = %e, "Mention lookup failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Directory;
    use relaybot_model::Mentions;
    use std::time::Duration;
    use tokio::time::Instant;

    fn directory() -> Directory {
        let dir = Directory::new();
        dir.insert_member(Member::new("u1", "alice"));
        dir.insert_member(Member::new("u2", "bob"));
        dir.insert_member(Member::new("u3", "carol"));
        dir.insert_role(relaybot_model::Role::new("r1", "mods"));
        dir.insert_channel(Channel::new("c1", "general"));
        dir
    }

    fn message() -> MessageCreated {
        MessageCreated::new("m1", "c1", "u0", "/x").with_mentions(
            Mentions::default()
                .with_user("u1")
                .with_user("u2")
                .with_user("u3")
                .with_role("r1")
                .with_channel("c1"),
        )
    }

    #[tokio::test]
    async fn test_fetches_only_the_delta() {
        let dir = directory();
        let msg = message();
        let mut known = KnownEntities::default();
        let prefetcher = MentionPrefetcher::new(&dir);

        let needs = MentionNeeds {
            members: 2,
            ..Default::default()
        };
        assert_eq!(prefetcher.prefetch(&msg, needs, &mut known).await, 2);
        assert_eq!(known.members().len(), 2);
        assert_eq!(known.roles().len(), 0);
        assert_eq!(dir.lookups(MentionKind::Member), 2);

        let needs = MentionNeeds {
            members: 3,
            roles: 1,
            channels: 0,
        };
        assert_eq!(prefetcher.prefetch(&msg, needs, &mut known).await, 2);
        assert_eq!(known.members()[2].id.as_str(), "u3");
        assert_eq!(dir.lookups(MentionKind::Member), 3);
        assert_eq!(dir.lookups(MentionKind::Role), 1);
        assert_eq!(dir.lookups(MentionKind::Channel), 0);
    }

    #[tokio::test]
    async fn test_second_call_is_free() {
        let dir = directory();
        let msg = message();
        let mut known = KnownEntities::default();
        let prefetcher = MentionPrefetcher::new(&dir);
        let needs = MentionNeeds {
            members: 1,
            roles: 1,
            channels: 1,
        };

        assert_eq!(prefetcher.prefetch(&msg, needs, &mut known).await, 3);
        assert_eq!(prefetcher.prefetch(&msg, needs, &mut known).await, 0);
        assert_eq!(dir.total_lookups(), 3);
    }

    #[tokio::test]
    async fn test_failed_lookups_are_not_retried() {
        let dir = directory();
        let msg = MessageCreated::new("m1", "c1", "u0", "/x")
            .with_mentions(Mentions::default().with_user("ghost").with_user("u1"));
        let mut known = KnownEntities::default();
        let prefetcher = MentionPrefetcher::new(&dir);
        let needs = MentionNeeds {
            members: 1,
            ..Default::default()
        };

        assert_eq!(prefetcher.prefetch(&msg, needs, &mut known).await, 1);
        assert!(known.members().is_empty());

        // The failed reference used up the only member slot.
        assert_eq!(prefetcher.prefetch(&msg, needs, &mut known).await, 0);
        assert_eq!(dir.lookups(MentionKind::Member), 1);

        // A larger need moves on to the next reference.
        let needs = MentionNeeds {
            members: 2,
            ..Default::default()
        };
        assert_eq!(prefetcher.prefetch(&msg, needs, &mut known).await, 1);
        assert_eq!(known.members()[0].id.as_str(), "u1");
        assert_eq!(dir.lookups(MentionKind::Member), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_kinds_are_fetched_concurrently() {
        let dir = directory().with_latency(Duration::from_millis(100));
        let msg = message();
        let mut known = KnownEntities::default();
        let needs = MentionNeeds {
            members: 1,
            roles: 1,
            channels: 1,
        };

        let start = Instant::now();
        let issued = MentionPrefetcher::new(&dir)
            .prefetch(&msg, needs, &mut known)
            .await;
        let elapsed = start.elapsed();

        assert_eq!(issued, 3);
        assert_eq!(known.members().len(), 1);
        assert_eq!(known.roles().len(), 1);
        assert_eq!(known.channels().len(), 1);
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(200), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_never_exceeds_references() {
        let dir = directory();
        let msg = MessageCreated::new("m1", "c1", "u0", "/x")
            .with_mentions(Mentions::default().with_user("u1").with_user("u1"));
        let mut known = KnownEntities::default();
        let needs = MentionNeeds {
            members: 5,
            ..Default::default()
        };
        assert_eq!(
            MentionPrefetcher::new(&dir).prefetch(&msg, needs, &mut known).await,
            1
        );
    }

    #[test]
    fn test_needs_max() {
        let mut a = MentionNeeds::default();
        a.add(MentionKind::Member);
        a.add(MentionKind::Member);
        let mut b = MentionNeeds::default();
        b.add(MentionKind::Member);
        b.add(MentionKind::Channel);
        assert_eq!(
            a.max(b),
            MentionNeeds {
                members: 2,
                roles: 0,
                channels: 1
            }
        );
    }
}
