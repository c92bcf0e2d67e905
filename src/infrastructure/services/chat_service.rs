//! Team chat service
//!
//! Every operation first checks that the caller is an accepted member of the
//! team that owns the conversation.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::info;

use crate::domain::chat::{
    normalize_message, validate_emoji, MessageId, MessageRead, MessageReaction, TeamMessage,
};
use crate::domain::team::{Team, TeamId};
use crate::domain::user::UserId;
use crate::domain::{DomainError, StorageExt};
use crate::infrastructure::storage::Stores;

use super::queries::accepted_membership;

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 200;

/// Reactions of one emoji on a message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: usize,
    pub reacted_by_me: bool,
}

/// A message as shown to a team member
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessageView {
    #[serde(flatten)]
    pub message: TeamMessage,
    pub sender_username: String,
    pub reactions: Vec<ReactionCount>,
    pub read_count: usize,
}

/// Team chat service
#[derive(Debug, Clone)]
pub struct ChatService {
    stores: Stores,
}

impl ChatService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn post(
        &self,
        user_id: &UserId,
        team_id: &TeamId,
        content: &str,
    ) -> Result<TeamMessage, DomainError> {
        self.require_member(user_id, team_id).await?;
        let content = normalize_message(content).map_err(|e| DomainError::validation(e.to_string()))?;

        let message = self
            .stores
            .messages
            .create(TeamMessage::text(team_id.clone(), user_id.clone(), content))
            .await?;

        info!(team_id = %team_id, message_id = %message.id(), "Team message posted");
        Ok(message)
    }

    /// The latest `limit` messages in chronological order
    pub async fn list(
        &self,
        user_id: &UserId,
        team_id: &TeamId,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessageView>, DomainError> {
        self.require_member(user_id, team_id).await?;

        let key = team_id.clone();
        let mut messages = self
            .stores
            .messages
            .find_all(move |m| m.team_id() == &key)
            .await?;
        messages.sort_by_key(|m| m.timestamp());

        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let messages = messages.split_off(messages.len().saturating_sub(limit));

        let key = team_id.clone();
        let mut read_counts: HashMap<MessageId, usize> = HashMap::new();
        for read in self
            .stores
            .message_reads
            .find_all(move |r| r.team_id() == &key)
            .await?
        {
            *read_counts.entry(read.message_id().clone()).or_default() += 1;
        }

        let usernames: HashMap<UserId, String> = self
            .stores
            .users
            .list()
            .await?
            .into_iter()
            .map(|u| (u.id().clone(), u.username().to_string()))
            .collect();

        let mut views = Vec::with_capacity(messages.len());
        for message in messages {
            let reactions = self.reaction_counts(message.id(), user_id).await?;
            views.push(ChatMessageView {
                sender_username: usernames
                    .get(message.sender_id())
                    .cloned()
                    .unwrap_or_default(),
                read_count: read_counts.get(message.id()).copied().unwrap_or(0),
                reactions,
                message,
            });
        }

        Ok(views)
    }

    /// Replace the text of one of the caller's own messages
    pub async fn edit(
        &self,
        user_id: &UserId,
        message_id: &MessageId,
        content: &str,
    ) -> Result<TeamMessage, DomainError> {
        let mut message = self.member_message(user_id, message_id).await?.0;
        if message.sender_id() != user_id {
            return Err(DomainError::forbidden("You can only edit your own messages"));
        }

        let content = normalize_message(content).map_err(|e| DomainError::validation(e.to_string()))?;
        message.edit(content);

        info!(message_id = %message_id, "Team message edited");
        self.stores.messages.update(message).await
    }

    /// Delete a message; allowed for its sender and the team captain
    pub async fn delete(&self, user_id: &UserId, message_id: &MessageId) -> Result<(), DomainError> {
        let (message, team) = self.member_message(user_id, message_id).await?;
        if message.sender_id() != user_id && !team.is_captain(user_id) {
            return Err(DomainError::forbidden(
                "Only the sender or the team captain can delete this message",
            ));
        }

        let key = message_id.clone();
        for read in self
            .stores
            .message_reads
            .find_all(move |r| r.message_id() == &key)
            .await?
        {
            self.stores.message_reads.delete(read.id()).await?;
        }

        let key = message_id.clone();
        for reaction in self
            .stores
            .reactions
            .find_all(move |r| r.message_id() == &key)
            .await?
        {
            self.stores.reactions.delete(reaction.id()).await?;
        }

        self.stores.messages.delete(message_id).await?;
        info!(message_id = %message_id, user_id = %user_id, "Team message deleted");
        Ok(())
    }

    /// Record that the caller has read a message; repeated calls are no-ops
    pub async fn mark_read(&self, user_id: &UserId, message_id: &MessageId) -> Result<(), DomainError> {
        let _guard = self.stores.lock_writes().await;

        let (message, _) = self.member_message(user_id, message_id).await?;
        if self.read_receipt_exists(user_id, message_id).await? {
            return Ok(());
        }

        self.stores
            .message_reads
            .create(MessageRead::new(&message, user_id.clone()))
            .await?;
        Ok(())
    }

    /// Mark every message of the team as read; returns how many were new
    pub async fn mark_all_read(&self, user_id: &UserId, team_id: &TeamId) -> Result<usize, DomainError> {
        let _guard = self.stores.lock_writes().await;
        self.require_member(user_id, team_id).await?;

        let mut marked = 0;
        for message in self.unread_messages(user_id, team_id).await? {
            self.stores
                .message_reads
                .create(MessageRead::new(&message, user_id.clone()))
                .await?;
            marked += 1;
        }

        Ok(marked)
    }

    /// Add a reaction; reacting twice with the same emoji keeps one reaction
    pub async fn react(
        &self,
        user_id: &UserId,
        message_id: &MessageId,
        emoji: &str,
    ) -> Result<MessageReaction, DomainError> {
        let _guard = self.stores.lock_writes().await;

        self.member_message(user_id, message_id).await?;
        validate_emoji(emoji).map_err(|e| DomainError::validation(e.to_string()))?;
        let emoji = emoji.trim().to_string();

        if let Some(existing) = self.find_reaction(user_id, message_id, &emoji).await? {
            return Ok(existing);
        }

        self.stores
            .reactions
            .create(MessageReaction::new(message_id.clone(), user_id.clone(), emoji))
            .await
    }

    /// Remove a reaction; returns whether one existed
    pub async fn unreact(
        &self,
        user_id: &UserId,
        message_id: &MessageId,
        emoji: &str,
    ) -> Result<bool, DomainError> {
        let _guard = self.stores.lock_writes().await;

        self.member_message(user_id, message_id).await?;
        match self.find_reaction(user_id, message_id, emoji.trim()).await? {
            Some(reaction) => self.stores.reactions.delete(reaction.id()).await,
            None => Ok(false),
        }
    }

    /// Messages from teammates the caller has not read yet
    pub async fn unread_count(&self, user_id: &UserId, team_id: &TeamId) -> Result<usize, DomainError> {
        self.require_member(user_id, team_id).await?;
        Ok(self.unread_messages(user_id, team_id).await?.len())
    }

    async fn unread_messages(
        &self,
        user_id: &UserId,
        team_id: &TeamId,
    ) -> Result<Vec<TeamMessage>, DomainError> {
        let (reader, team) = (user_id.clone(), team_id.clone());
        let read: Vec<MessageId> = self
            .stores
            .message_reads
            .find_all(move |r| r.user_id() == &reader && r.team_id() == &team)
            .await?
            .into_iter()
            .map(|r| r.message_id().clone())
            .collect();

        let (reader, team) = (user_id.clone(), team_id.clone());
        self.stores
            .messages
            .find_all(move |m| {
                m.team_id() == &team && m.sender_id() != &reader && !read.contains(m.id())
            })
            .await
    }

    async fn reaction_counts(
        &self,
        message_id: &MessageId,
        viewer: &UserId,
    ) -> Result<Vec<ReactionCount>, DomainError> {
        let key = message_id.clone();
        let reactions = self
            .stores
            .reactions
            .find_all(move |r| r.message_id() == &key)
            .await?;

        let mut grouped: BTreeMap<String, ReactionCount> = BTreeMap::new();
        for reaction in &reactions {
            let entry = grouped
                .entry(reaction.emoji().to_string())
                .or_insert_with(|| ReactionCount {
                    emoji: reaction.emoji().to_string(),
                    count: 0,
                    reacted_by_me: false,
                });
            entry.count += 1;
            entry.reacted_by_me |= reaction.user_id() == viewer;
        }

        Ok(grouped.into_values().collect())
    }

    async fn find_reaction(
        &self,
        user_id: &UserId,
        message_id: &MessageId,
        emoji: &str,
    ) -> Result<Option<MessageReaction>, DomainError> {
        let (user, message, emoji) = (user_id.clone(), message_id.clone(), emoji.to_string());
        self.stores
            .reactions
            .find_one(move |r| r.user_id() == &user && r.message_id() == &message && r.emoji() == emoji)
            .await
    }

    async fn read_receipt_exists(
        &self,
        user_id: &UserId,
        message_id: &MessageId,
    ) -> Result<bool, DomainError> {
        let (user, message) = (user_id.clone(), message_id.clone());
        Ok(self
            .stores
            .message_reads
            .find_one(move |r| r.user_id() == &user && r.message_id() == &message)
            .await?
            .is_some())
    }

    /// The message with its team, provided the caller belongs to that team
    async fn member_message(
        &self,
        user_id: &UserId,
        message_id: &MessageId,
    ) -> Result<(TeamMessage, Team), DomainError> {
        let message = self.stores.messages.require(message_id, "Message").await?;
        let team = self.require_member(user_id, message.team_id()).await?;
        Ok((message, team))
    }

    async fn require_member(&self, user_id: &UserId, team_id: &TeamId) -> Result<Team, DomainError> {
        let team = self.stores.teams.require(team_id, "Team").await?;

        match accepted_membership(&self.stores, user_id).await? {
            Some(membership) if membership.team_id() == team_id => Ok(team),
            _ => Err(DomainError::forbidden("You are not a member of this team")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::User;
    use crate::infrastructure::services::team_service::tests::{team_with_members, user};

    struct Fixture {
        service: ChatService,
        team: Team,
        roster: Vec<User>,
        outsider: User,
    }

    async fn fixture() -> Fixture {
        let stores = Stores::in_memory();
        let (team, roster) = team_with_members(&stores, "Chatters", 3).await;
        let outsider = user(&stores, "outsider").await;

        Fixture {
            service: ChatService::new(stores),
            team,
            roster,
            outsider,
        }
    }

    #[tokio::test]
    async fn test_post_and_list_in_order() {
        let f = fixture().await;

        f.service
            .post(f.roster[0].id(), f.team.id(), "  first  ")
            .await
            .unwrap();
        f.service
            .post(f.roster[1].id(), f.team.id(), "second")
            .await
            .unwrap();

        let messages = f.service.list(f.roster[2].id(), f.team.id(), None).await.unwrap();
        let contents: Vec<_> = messages.iter().map(|m| m.message.content()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(messages[0].sender_username, "Chatters_cap");

        let latest = f.service.list(f.roster[2].id(), f.team.id(), Some(1)).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].message.content(), "second");
    }

    #[tokio::test]
    async fn test_outsider_cannot_read_or_write() {
        let f = fixture().await;

        let post = f.service.post(f.outsider.id(), f.team.id(), "hi").await;
        assert!(matches!(post, Err(DomainError::Forbidden { .. })));

        let list = f.service.list(f.outsider.id(), f.team.id(), None).await;
        assert!(matches!(list, Err(DomainError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_content_validation() {
        let f = fixture().await;

        let empty = f.service.post(f.roster[0].id(), f.team.id(), "   ").await;
        assert_eq!(empty.unwrap_err().message(), "Message cannot be empty");

        let long = "x".repeat(1001);
        let too_long = f.service.post(f.roster[0].id(), f.team.id(), &long).await;
        assert_eq!(
            too_long.unwrap_err().message(),
            "Message too long (max 1000 characters)"
        );
    }

    #[tokio::test]
    async fn test_only_sender_edits() {
        let f = fixture().await;
        let message = f
            .service
            .post(f.roster[1].id(), f.team.id(), "draft")
            .await
            .unwrap();

        let other = f.service.edit(f.roster[2].id(), message.id(), "hijack").await;
        assert!(matches!(other, Err(DomainError::Forbidden { .. })));

        let edited = f
            .service
            .edit(f.roster[1].id(), message.id(), "final")
            .await
            .unwrap();
        assert_eq!(edited.content(), "final");
        assert!(edited.is_edited());
        assert!(edited.edited_at().is_some());
    }

    #[tokio::test]
    async fn test_sender_or_captain_deletes() {
        let f = fixture().await;
        let first = f
            .service
            .post(f.roster[1].id(), f.team.id(), "one")
            .await
            .unwrap();
        let second = f
            .service
            .post(f.roster[1].id(), f.team.id(), "two")
            .await
            .unwrap();

        let denied = f.service.delete(f.roster[2].id(), first.id()).await;
        assert!(matches!(denied, Err(DomainError::Forbidden { .. })));

        f.service.delete(f.roster[1].id(), first.id()).await.unwrap();
        f.service.delete(f.roster[0].id(), second.id()).await.unwrap();

        assert!(f.service.list(f.roster[0].id(), f.team.id(), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_receipts_and_unread_count() {
        let f = fixture().await;
        let message = f
            .service
            .post(f.roster[0].id(), f.team.id(), "hello")
            .await
            .unwrap();
        f.service
            .post(f.roster[0].id(), f.team.id(), "again")
            .await
            .unwrap();

        assert_eq!(f.service.unread_count(f.roster[1].id(), f.team.id()).await.unwrap(), 2);
        assert_eq!(f.service.unread_count(f.roster[0].id(), f.team.id()).await.unwrap(), 0);

        f.service.mark_read(f.roster[1].id(), message.id()).await.unwrap();
        f.service.mark_read(f.roster[1].id(), message.id()).await.unwrap();
        assert_eq!(f.service.unread_count(f.roster[1].id(), f.team.id()).await.unwrap(), 1);

        let views = f.service.list(f.roster[1].id(), f.team.id(), None).await.unwrap();
        assert_eq!(views[0].read_count, 1);

        assert_eq!(f.service.mark_all_read(f.roster[1].id(), f.team.id()).await.unwrap(), 1);
        assert_eq!(f.service.unread_count(f.roster[1].id(), f.team.id()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reactions_are_idempotent() {
        let f = fixture().await;
        let message = f
            .service
            .post(f.roster[0].id(), f.team.id(), "gg")
            .await
            .unwrap();

        let first = f.service.react(f.roster[1].id(), message.id(), "🔥").await.unwrap();
        let again = f.service.react(f.roster[1].id(), message.id(), "🔥").await.unwrap();
        assert_eq!(first.id(), again.id());
        f.service.react(f.roster[2].id(), message.id(), "🔥").await.unwrap();

        let views = f.service.list(f.roster[1].id(), f.team.id(), None).await.unwrap();
        assert_eq!(
            views[0].reactions,
            vec![ReactionCount {
                emoji: "🔥".to_string(),
                count: 2,
                reacted_by_me: true,
            }]
        );

        assert!(f.service.unreact(f.roster[1].id(), message.id(), "🔥").await.unwrap());
        assert!(!f.service.unreact(f.roster[1].id(), message.id(), "🔥").await.unwrap());

        let blank = f.service.react(f.roster[1].id(), message.id(), " ").await;
        assert_eq!(blank.unwrap_err().message(), "Emoji cannot be empty");
    }

    #[tokio::test]
    async fn test_padded_emoji_is_stored_trimmed() {
        let f = fixture().await;
        let message = f
            .service
            .post(f.roster[0].id(), f.team.id(), "gg")
            .await
            .unwrap();

        let padded = format!("      {}      ", "🔥");
        let reaction = f
            .service
            .react(f.roster[1].id(), message.id(), &padded)
            .await
            .unwrap();
        assert_eq!(reaction.emoji(), "🔥");

        let again = f.service.react(f.roster[1].id(), message.id(), "🔥").await.unwrap();
        assert_eq!(reaction.id(), again.id());
    }
}
