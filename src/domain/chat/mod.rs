//! Chat domain
//!
//! Per-team message log with read receipts and emoji reactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::id::entity_id;
use crate::domain::storage::StorageEntity;
use crate::domain::team::TeamId;
use crate::domain::user::UserId;

entity_id!(
    /// Team message identifier
    MessageId
);

entity_id!(
    /// Read receipt identifier
    MessageReadId
);

entity_id!(
    /// Reaction identifier
    ReactionId
);

const MAX_MESSAGE_LENGTH: usize = 1000;
const MAX_EMOJI_LENGTH: usize = 10;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChatValidationError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Message too long (max {0} characters)")]
    MessageTooLong(usize),

    #[error("Emoji cannot be empty")]
    EmptyEmoji,

    #[error("Emoji cannot exceed {0} characters")]
    EmojiTooLong(usize),
}

/// Trims and checks message content, returning the text to store
pub fn normalize_message(content: &str) -> Result<String, ChatValidationError> {
    let content = content.trim();

    if content.is_empty() {
        return Err(ChatValidationError::EmptyMessage);
    }

    if content.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ChatValidationError::MessageTooLong(MAX_MESSAGE_LENGTH));
    }

    Ok(content.to_string())
}

pub fn validate_emoji(emoji: &str) -> Result<(), ChatValidationError> {
    let emoji = emoji.trim();
    if emoji.is_empty() {
        return Err(ChatValidationError::EmptyEmoji);
    }

    if emoji.chars().count() > MAX_EMOJI_LENGTH {
        return Err(ChatValidationError::EmojiTooLong(MAX_EMOJI_LENGTH));
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMessage {
    id: MessageId,
    team_id: TeamId,
    sender_id: UserId,
    content: String,
    message_type: MessageType,
    timestamp: DateTime<Utc>,
    is_edited: bool,
    edited_at: Option<DateTime<Utc>>,
}

impl TeamMessage {
    pub fn text(team_id: TeamId, sender_id: UserId, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            team_id,
            sender_id,
            content: content.into(),
            message_type: MessageType::Text,
            timestamp: Utc::now(),
            is_edited: false,
            edited_at: None,
        }
    }

    pub fn system(team_id: TeamId, sender_id: UserId, content: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::System,
            ..Self::text(team_id, sender_id, content)
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn sender_id(&self) -> &UserId {
        &self.sender_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_edited(&self) -> bool {
        self.is_edited
    }

    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        self.edited_at
    }

    pub fn edit(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.is_edited = true;
        self.edited_at = Some(Utc::now());
    }
}

impl StorageEntity for TeamMessage {
    type Key = MessageId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

/// Read receipt; one per (message, user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRead {
    id: MessageReadId,
    message_id: MessageId,
    team_id: TeamId,
    user_id: UserId,
    read_at: DateTime<Utc>,
}

impl MessageRead {
    pub fn new(message: &TeamMessage, user_id: UserId) -> Self {
        Self {
            id: MessageReadId::generate(),
            message_id: message.id().clone(),
            team_id: message.team_id().clone(),
            user_id,
            read_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &MessageReadId {
        &self.id
    }

    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn read_at(&self) -> DateTime<Utc> {
        self.read_at
    }
}

impl StorageEntity for MessageRead {
    type Key = MessageReadId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

/// Emoji reaction; one per (message, user, emoji)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReaction {
    id: ReactionId,
    message_id: MessageId,
    user_id: UserId,
    emoji: String,
    created_at: DateTime<Utc>,
}

impl MessageReaction {
    pub fn new(message_id: MessageId, user_id: UserId, emoji: impl Into<String>) -> Self {
        Self {
            id: ReactionId::generate(),
            message_id,
            user_id,
            emoji: emoji.into(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &ReactionId {
        &self.id
    }

    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl StorageEntity for MessageReaction {
    type Key = ReactionId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
