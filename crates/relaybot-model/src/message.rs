//! Inbound message notifications and outbound replies.

use crate::id::{ChannelId, MessageId, ServerId, UserId};
use crate::mention::Mentions;
use chrono::{DateTime, Utc};

/// A "message created" notification from the chat service.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageCreated {
    /// Message id.
    pub id: MessageId,
    /// Channel the message was posted in.
    pub channel_id: ChannelId,
    /// Server the channel belongs to. `None` for direct messages.
    #[cfg_attr(feature = "serde", serde(default))]
    pub server_id: Option<ServerId>,
    /// Author of the message.
    pub author_id: UserId,
    /// Raw message text.
    pub content: String,
    /// Mention references reported by the service.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mentions: Mentions,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl MessageCreated {
    /// Create a message stamped with the current time and no mentions.
    pub fn new(
        id: impl Into<MessageId>,
        channel_id: impl Into<ChannelId>,
        author_id: impl Into<UserId>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            server_id: None,
            author_id: author_id.into(),
            content: content.into(),
            mentions: Mentions::default(),
            created_at: Utc::now(),
        }
    }

    /// Attach mention references.
    pub fn with_mentions(mut self, mentions: Mentions) -> Self {
        self.mentions = mentions;
        self
    }

    /// Attach the owning server.
    pub fn in_server(mut self, server: impl Into<ServerId>) -> Self {
        self.server_id = Some(server.into());
        self
    }
}

/// A message the bot wants to post.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reply {
    /// Target channel.
    pub channel_id: ChannelId,
    /// Message being replied to, if the reply should thread under it.
    pub reply_to: Option<MessageId>,
    /// Text to post.
    pub content: String,
}

impl Reply {
    /// Reply in the same channel, threaded under `message`.
    pub fn to(message: &MessageCreated, content: impl Into<String>) -> Self {
        Self {
            channel_id: message.channel_id.clone(),
            reply_to: Some(message.id.clone()),
            content: content.into(),
        }
    }

    /// Post into `channel_id` without threading.
    pub fn in_channel(channel_id: impl Into<ChannelId>, content: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            reply_to: None,
            content: content.into(),
        }
    }
}
