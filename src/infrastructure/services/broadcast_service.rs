//! Broadcast service - announcement drafts and their audiences

use std::collections::HashSet;

use serde::Serialize;
use tracing::info;

use crate::domain::broadcast::{Broadcast, BroadcastId, RecipientType};
use crate::domain::user::UserId;
use crate::domain::{DomainError, StorageExt};
use crate::infrastructure::storage::Stores;

/// Someone a broadcast should reach
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipient {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct BroadcastService {
    stores: Stores,
}

impl BroadcastService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Every broadcast, newest first
    pub async fn list(&self) -> Result<Vec<Broadcast>, DomainError> {
        let mut broadcasts = self.stores.broadcasts.list().await?;
        broadcasts.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(broadcasts)
    }

    pub async fn get(&self, broadcast_id: &BroadcastId) -> Result<Broadcast, DomainError> {
        self.stores.broadcasts.require(broadcast_id, "Broadcast").await
    }

    /// Active players matching the broadcast's recipient type
    pub async fn recipients(&self, broadcast_id: &BroadcastId) -> Result<Vec<Recipient>, DomainError> {
        let broadcast = self.get(broadcast_id).await?;

        let in_team: HashSet<UserId> = self
            .stores
            .memberships
            .find_all(|m| m.is_accepted())
            .await?
            .into_iter()
            .map(|m| m.user_id().clone())
            .collect();

        let wanted = move |user_id: &UserId| match broadcast.recipient_type() {
            RecipientType::AllUsers => true,
            RecipientType::TeamMembers => in_team.contains(user_id),
            RecipientType::IndividualUsers => !in_team.contains(user_id),
        };

        let mut recipients: Vec<Recipient> = self
            .stores
            .users
            .find_all(|u| u.can_score() && u.is_active())
            .await?
            .into_iter()
            .filter(|u| wanted(u.id()))
            .map(|u| Recipient {
                user_id: u.id().clone(),
                username: u.username().to_string(),
                email: u.email().to_string(),
            })
            .collect();
        recipients.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(recipients)
    }

    /// Record that a draft was delivered
    pub async fn mark_sent(&self, broadcast_id: &BroadcastId) -> Result<Broadcast, DomainError> {
        let mut broadcast = self.get(broadcast_id).await?;
        if !broadcast.is_draft() {
            return Err(DomainError::conflict("Broadcast has already been sent"));
        }

        broadcast.mark_sent();
        info!(broadcast_id = %broadcast_id, "Broadcast marked as sent");
        self.stores.broadcasts.update(broadcast).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::challenge::{Category, Challenge, ChallengeType, Difficulty};
    use crate::domain::user::{User, UserRole};
    use crate::infrastructure::services::team_service::tests::{team_with_members, user};

    async fn draft(stores: &Stores, challenge_type: ChallengeType) -> Broadcast {
        let challenge = Challenge::new(
            "Relay",
            "desc",
            Category::Web,
            Difficulty::Easy,
            100,
            "flag{relay}",
        )
        .with_type(challenge_type);
        stores
            .broadcasts
            .create(Broadcast::new_challenge(&challenge))
            .await
            .unwrap()
    }

    async fn population(stores: &Stores) {
        team_with_members(stores, "Squad", 2).await;
        user(stores, "solo").await;

        let mut suspended = User::new("gone", "gone@ctf.local", "hash");
        suspended.suspend();
        stores.users.create(suspended).await.unwrap();
        stores
            .users
            .create(User::new("root", "root@ctf.local", "hash").with_role(UserRole::Admin))
            .await
            .unwrap();
    }

    fn names(recipients: &[Recipient]) -> Vec<&str> {
        recipients.iter().map(|r| r.username.as_str()).collect()
    }

    #[tokio::test]
    async fn test_recipients_by_type() {
        let stores = Stores::in_memory();
        population(&stores).await;
        let service = BroadcastService::new(stores.clone());

        let all = draft(&stores, ChallengeType::Both).await;
        assert_eq!(
            names(&service.recipients(all.id()).await.unwrap()),
            vec!["Squad_cap", "Squad_m1", "solo"]
        );

        let team = draft(&stores, ChallengeType::Team).await;
        assert_eq!(
            names(&service.recipients(team.id()).await.unwrap()),
            vec!["Squad_cap", "Squad_m1"]
        );

        let individual = draft(&stores, ChallengeType::Individual).await;
        assert_eq!(
            names(&service.recipients(individual.id()).await.unwrap()),
            vec!["solo"]
        );
    }

    #[tokio::test]
    async fn test_mark_sent_once() {
        let stores = Stores::in_memory();
        let service = BroadcastService::new(stores.clone());
        let broadcast = draft(&stores, ChallengeType::Both).await;

        let sent = service.mark_sent(broadcast.id()).await.unwrap();
        assert!(!sent.is_draft());
        assert!(sent.sent_at().is_some());

        let again = service.mark_sent(broadcast.id()).await;
        assert!(matches!(again, Err(DomainError::Conflict { .. })));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
