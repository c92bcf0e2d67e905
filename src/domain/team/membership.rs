//! Team membership and invitation records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::TeamId;
use crate::domain::id::entity_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;

entity_id!(
    /// Membership identifier
    MembershipId
);

entity_id!(
    /// Invitation identifier
    InvitationId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Link between a user and a team; one record per (team, user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMembership {
    id: MembershipId,
    team_id: TeamId,
    user_id: UserId,
    status: MembershipStatus,
    requested_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
}

impl TeamMembership {
    /// A join request awaiting the captain
    pub fn pending(team_id: TeamId, user_id: UserId) -> Self {
        Self {
            id: MembershipId::generate(),
            team_id,
            user_id,
            status: MembershipStatus::Pending,
            requested_at: Utc::now(),
            decided_at: None,
        }
    }

    /// An already accepted member (captains, accepted invitations)
    pub fn accepted(team_id: TeamId, user_id: UserId) -> Self {
        let now = Utc::now();

        Self {
            id: MembershipId::generate(),
            team_id,
            user_id,
            status: MembershipStatus::Accepted,
            requested_at: now,
            decided_at: Some(now),
        }
    }

    pub fn id(&self) -> &MembershipId {
        &self.id
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn status(&self) -> MembershipStatus {
        self.status
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == MembershipStatus::Pending
    }

    pub fn is_accepted(&self) -> bool {
        self.status == MembershipStatus::Accepted
    }

    pub fn accept(&mut self) {
        self.status = MembershipStatus::Accepted;
        self.decided_at = Some(Utc::now());
    }

    pub fn reject(&mut self) {
        self.status = MembershipStatus::Rejected;
        self.decided_at = Some(Utc::now());
    }

    /// Turns a previously rejected record back into a fresh request
    pub fn reopen(&mut self) {
        self.status = MembershipStatus::Pending;
        self.requested_at = Utc::now();
        self.decided_at = None;
    }
}

impl StorageEntity for TeamMembership {
    type Key = MembershipId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

/// Captain-initiated invitation; one record per (team, invited user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInvitation {
    id: InvitationId,
    team_id: TeamId,
    from_user_id: UserId,
    to_user_id: UserId,
    message: String,
    status: InvitationStatus,
    created_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
}

impl TeamInvitation {
    pub fn new(
        team_id: TeamId,
        from_user_id: UserId,
        to_user_id: UserId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: InvitationId::generate(),
            team_id,
            from_user_id,
            to_user_id,
            message: message.into(),
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    pub fn id(&self) -> &InvitationId {
        &self.id
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn from_user_id(&self) -> &UserId {
        &self.from_user_id
    }

    pub fn to_user_id(&self) -> &UserId {
        &self.to_user_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> InvitationStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn responded_at(&self) -> Option<DateTime<Utc>> {
        self.responded_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    pub fn accept(&mut self) {
        self.respond(InvitationStatus::Accepted);
    }

    pub fn decline(&mut self) {
        self.respond(InvitationStatus::Rejected);
    }

    pub fn cancel(&mut self) {
        self.respond(InvitationStatus::Cancelled);
    }

    /// Re-sends an invitation that was previously answered
    pub fn renew(&mut self, from_user_id: UserId, message: impl Into<String>) {
        self.from_user_id = from_user_id;
        self.message = message.into();
        self.status = InvitationStatus::Pending;
        self.created_at = Utc::now();
        self.responded_at = None;
    }

    fn respond(&mut self, status: InvitationStatus) {
        self.status = status;
        self.responded_at = Some(Utc::now());
    }
}

impl StorageEntity for TeamInvitation {
    type Key = InvitationId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_workflow() {
        let mut membership = TeamMembership::pending(TeamId::generate(), UserId::generate());
        assert!(membership.is_pending());
        assert!(membership.decided_at().is_none());

        membership.reject();
        assert_eq!(membership.status(), MembershipStatus::Rejected);

        membership.reopen();
        assert!(membership.is_pending());

        membership.accept();
        assert!(membership.is_accepted());
        assert!(membership.decided_at().is_some());
    }

    #[test]
    fn test_invitation_responses() {
        let mut invitation = TeamInvitation::new(
            TeamId::generate(),
            UserId::generate(),
            UserId::generate(),
            "join us",
        );
        assert!(invitation.is_pending());

        invitation.cancel();
        assert_eq!(invitation.status(), InvitationStatus::Cancelled);
        assert!(invitation.responded_at().is_some());

        let captain = UserId::generate();
        invitation.renew(captain.clone(), "second try");
        assert!(invitation.is_pending());
        assert_eq!(invitation.from_user_id(), &captain);
        assert_eq!(invitation.message(), "second try");
    }
}
