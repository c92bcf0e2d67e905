//! Broadcast domain
//!
//! Announcement drafts produced when challenges are published. Delivery is
//! handled outside this service; records only track who they are meant for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::challenge::{Challenge, ChallengeId, ChallengeType};
use crate::domain::id::entity_id;
use crate::domain::storage::StorageEntity;

entity_id!(
    /// Broadcast identifier
    BroadcastId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    AllUsers,
    TeamMembers,
    IndividualUsers,
}

impl From<ChallengeType> for RecipientType {
    fn from(challenge_type: ChallengeType) -> Self {
        match challenge_type {
            ChallengeType::Team => Self::TeamMembers,
            ChallengeType::Individual => Self::IndividualUsers,
            ChallengeType::Both => Self::AllUsers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastStatus {
    Draft,
    Sent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broadcast {
    id: BroadcastId,
    title: String,
    content: String,
    recipient_type: RecipientType,
    status: BroadcastStatus,
    challenge_id: Option<ChallengeId>,
    created_at: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
}

impl Broadcast {
    /// Draft announcing a newly published challenge
    pub fn new_challenge(challenge: &Challenge) -> Self {
        let mut content = format!(
            "A new {} {} challenge is live: {}\n\nPoints: {}",
            challenge.difficulty().as_str(),
            challenge.category().as_str(),
            challenge.title(),
            challenge.points(),
        );

        if challenge.challenge_type() != ChallengeType::Individual {
            content.push_str(&format!(
                "\nTeam points: {} (teams of {}-{})",
                challenge.team_points(),
                challenge.min_team_size(),
                challenge.max_team_size(),
            ));
        }

        Self {
            id: BroadcastId::generate(),
            title: format!("🚩 New Challenge: {}", challenge.title()),
            content,
            recipient_type: challenge.challenge_type().into(),
            status: BroadcastStatus::Draft,
            challenge_id: Some(challenge.id().clone()),
            created_at: Utc::now(),
            sent_at: None,
        }
    }

    pub fn id(&self) -> &BroadcastId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn recipient_type(&self) -> RecipientType {
        self.recipient_type
    }

    pub fn status(&self) -> BroadcastStatus {
        self.status
    }

    pub fn challenge_id(&self) -> Option<&ChallengeId> {
        self.challenge_id.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    pub fn is_draft(&self) -> bool {
        self.status == BroadcastStatus::Draft
    }

    /// Records that an external mailer delivered this broadcast
    pub fn mark_sent(&mut self) {
        self.status = BroadcastStatus::Sent;
        self.sent_at = Some(Utc::now());
    }
}

impl StorageEntity for Broadcast {
    type Key = BroadcastId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::challenge::{Category, Difficulty};

    fn challenge(challenge_type: ChallengeType) -> Challenge {
        Challenge::new("Padding Oracle", "d", Category::Crypto, Difficulty::Hard, 300, "f")
            .with_type(challenge_type)
            .with_team_points_multiplier(1.5)
    }

    #[test]
    fn test_recipient_type_follows_challenge_type() {
        assert_eq!(
            Broadcast::new_challenge(&challenge(ChallengeType::Team)).recipient_type(),
            RecipientType::TeamMembers
        );
        assert_eq!(
            Broadcast::new_challenge(&challenge(ChallengeType::Individual)).recipient_type(),
            RecipientType::IndividualUsers
        );
        assert_eq!(
            Broadcast::new_challenge(&challenge(ChallengeType::Both)).recipient_type(),
            RecipientType::AllUsers
        );
    }

    #[test]
    fn test_draft_content() {
        let broadcast = Broadcast::new_challenge(&challenge(ChallengeType::Both));

        assert_eq!(broadcast.title(), "🚩 New Challenge: Padding Oracle");
        assert_eq!(broadcast.status(), BroadcastStatus::Draft);
        assert!(broadcast.content().contains("Points: 300"));
        assert!(broadcast.content().contains("Team points: 450"));
    }

    #[test]
    fn test_individual_draft_omits_team_points() {
        let broadcast = Broadcast::new_challenge(&challenge(ChallengeType::Individual));
        assert!(!broadcast.content().contains("Team points"));
    }
}
