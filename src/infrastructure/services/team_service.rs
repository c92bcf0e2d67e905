//! Team service - team registry, join requests, invitations and captaincy

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::leaderboard::{rank, Ranked, Standing};
use crate::domain::team::{
    validate_invitation_message, validate_team_description, validate_team_name, InvitationId,
    MembershipId, Team, TeamId, TeamInvitation, TeamMembership,
};
use crate::domain::user::UserId;
use crate::domain::{DomainError, StorageExt};
use crate::infrastructure::storage::Stores;

use super::queries::{accepted_members, accepted_membership, member_count};

/// Request for creating a team
#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Request for updating team settings; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateTeamRequest {
    pub description: Option<String>,
    pub is_open: Option<bool>,
}

/// A team with its size-derived flags
#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    pub team: Team,
    pub member_count: usize,
    pub can_compete: bool,
    pub is_full: bool,
}

impl TeamSummary {
    fn new(team: Team, member_count: usize) -> Self {
        Self {
            can_compete: team.can_compete(member_count),
            is_full: team.is_full(member_count),
            team,
            member_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamMember {
    pub membership_id: MembershipId,
    pub user_id: UserId,
    pub username: String,
    pub is_captain: bool,
    pub joined_at: Option<DateTime<Utc>>,
}

/// Team detail with its roster
#[derive(Debug, Clone, Serialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub summary: TeamSummary,
    pub members: Vec<TeamMember>,
}

/// A team on the team leaderboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamEntry {
    pub team_id: TeamId,
    pub name: String,
    pub member_count: usize,
}

/// Team service for the team registry
#[derive(Debug, Clone)]
pub struct TeamService {
    stores: Stores,
    default_max_members: u32,
}

impl TeamService {
    pub fn new(stores: Stores, default_max_members: u32) -> Self {
        Self {
            stores,
            default_max_members,
        }
    }

    /// Create a team captained by the caller
    pub async fn create_team(
        &self,
        user_id: &UserId,
        request: CreateTeamRequest,
    ) -> Result<Team, DomainError> {
        let name = request.name.trim().to_string();
        let description = request.description.unwrap_or_default().trim().to_string();

        validate_team_name(&name).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_team_description(&description)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let _guard = self.stores.lock_writes().await;

        self.ensure_teamless(user_id, "You are already in a team").await?;
        if !self.pending_requests_of(user_id).await?.is_empty() {
            return Err(DomainError::validation(
                "You have pending join requests. Cancel them before creating a team",
            ));
        }

        let lowered = name.to_lowercase();
        if self
            .stores
            .teams
            .find_one(move |t| t.name().to_lowercase() == lowered)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(format!(
                "A team named '{}' already exists",
                name
            )));
        }

        let team = Team::new(&name, description, user_id.clone(), self.default_max_members);
        info!(team_id = %team.id(), name = %name, captain_id = %user_id, "Creating team");

        let team = self.stores.teams.create(team).await?;
        self.stores
            .memberships
            .create(TeamMembership::accepted(team.id().clone(), user_id.clone()))
            .await?;
        self.settle_user(user_id, None, None).await?;

        Ok(team)
    }

    /// Captain-only settings update
    pub async fn update_team(
        &self,
        captain_id: &UserId,
        team_id: &TeamId,
        request: UpdateTeamRequest,
    ) -> Result<Team, DomainError> {
        let mut team = self.captained_team(captain_id, team_id).await?;

        if let Some(description) = request.description {
            let description = description.trim().to_string();
            validate_team_description(&description)
                .map_err(|e| DomainError::validation(e.to_string()))?;
            team.set_description(description);
        }
        if let Some(is_open) = request.is_open {
            team.set_open(is_open);
        }

        info!(team_id = %team_id, "Updating team");
        self.stores.teams.update(team).await
    }

    /// Ask to join a team; a previously rejected request is re-opened
    pub async fn request_join(
        &self,
        user_id: &UserId,
        team_id: &TeamId,
    ) -> Result<TeamMembership, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let team = self.stores.teams.require(team_id, "Team").await?;
        if !team.is_active() {
            return Err(DomainError::validation("This team is not active"));
        }
        if !team.is_open() {
            return Err(DomainError::validation(
                "This team is not accepting join requests",
            ));
        }
        if team.is_captain(user_id) {
            return Err(DomainError::validation(
                "You are already the captain of this team",
            ));
        }
        self.ensure_teamless(user_id, "You are already in a team").await?;
        if team.is_full(member_count(&self.stores, team_id).await?) {
            return Err(DomainError::validation("This team is full"));
        }

        let membership = match self.membership_record(team_id, user_id).await? {
            Some(existing) if existing.is_pending() => {
                return Err(DomainError::conflict(
                    "You already have a pending request to join this team",
                ));
            }
            Some(mut existing) => {
                existing.reopen();
                self.stores.memberships.update(existing).await?
            }
            None => {
                self.stores
                    .memberships
                    .create(TeamMembership::pending(team_id.clone(), user_id.clone()))
                    .await?
            }
        };

        info!(team_id = %team_id, user_id = %user_id, "Join request submitted");
        Ok(membership)
    }

    /// Accept a pending join request
    pub async fn approve(
        &self,
        captain_id: &UserId,
        membership_id: &MembershipId,
    ) -> Result<TeamMembership, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let (mut membership, team) = self.pending_request_for(captain_id, membership_id).await?;

        if team.is_full(member_count(&self.stores, team.id()).await?) {
            return Err(DomainError::validation("This team is full"));
        }
        if accepted_membership(&self.stores, membership.user_id())
            .await?
            .is_some()
        {
            return Err(DomainError::validation(
                "This user is already a member of another team",
            ));
        }

        membership.accept();
        let membership = self.stores.memberships.update(membership).await?;
        self.settle_user(membership.user_id(), Some(membership.id()), None)
            .await?;

        info!(
            team_id = %team.id(),
            user_id = %membership.user_id(),
            "Join request approved"
        );
        Ok(membership)
    }

    pub async fn reject(
        &self,
        captain_id: &UserId,
        membership_id: &MembershipId,
    ) -> Result<TeamMembership, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let (mut membership, team) = self.pending_request_for(captain_id, membership_id).await?;
        membership.reject();

        info!(team_id = %team.id(), user_id = %membership.user_id(), "Join request rejected");
        self.stores.memberships.update(membership).await
    }

    /// Captain removes an accepted member
    pub async fn remove_member(
        &self,
        captain_id: &UserId,
        membership_id: &MembershipId,
    ) -> Result<(), DomainError> {
        let _guard = self.stores.lock_writes().await;

        let membership = self
            .stores
            .memberships
            .require(membership_id, "Membership")
            .await?;
        let team = self.captained_team(captain_id, membership.team_id()).await?;

        if !membership.is_accepted() {
            return Err(DomainError::validation("This user is not a team member"));
        }
        if team.is_captain(membership.user_id()) {
            return Err(DomainError::validation(
                "The captain cannot be removed from the team",
            ));
        }

        self.stores.memberships.delete(membership_id).await?;
        info!(team_id = %team.id(), user_id = %membership.user_id(), "Member removed");
        Ok(())
    }

    pub async fn transfer_captaincy(
        &self,
        captain_id: &UserId,
        team_id: &TeamId,
        new_captain_id: &UserId,
    ) -> Result<Team, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let mut team = self.captained_team(captain_id, team_id).await?;
        if captain_id == new_captain_id {
            return Err(DomainError::validation("You are already the captain"));
        }

        let is_member = self
            .membership_record(team_id, new_captain_id)
            .await?
            .is_some_and(|m| m.is_accepted());
        if !is_member {
            return Err(DomainError::validation(
                "The new captain must be a member of the team",
            ));
        }

        team.set_captain(new_captain_id.clone());
        info!(team_id = %team_id, from = %captain_id, to = %new_captain_id, "Captaincy transferred");
        self.stores.teams.update(team).await
    }

    /// Withdraw every pending join request of the caller, returning how many were removed
    pub async fn cancel_join_requests(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let pending = self.pending_requests_of(user_id).await?;
        if pending.is_empty() {
            return Err(DomainError::not_found("You have no pending join requests"));
        }

        for membership in &pending {
            self.stores.memberships.delete(membership.id()).await?;
        }

        info!(user_id = %user_id, count = pending.len(), "Cancelled join requests");
        Ok(pending.len())
    }

    /// Leave the current team; a lone captain's team is deactivated
    pub async fn leave_team(&self, user_id: &UserId) -> Result<(), DomainError> {
        let _guard = self.stores.lock_writes().await;

        let membership = accepted_membership(&self.stores, user_id)
            .await?
            .ok_or_else(|| DomainError::validation("You are not in a team"))?;
        let mut team = self.stores.teams.require(membership.team_id(), "Team").await?;

        if team.is_captain(user_id) {
            if member_count(&self.stores, team.id()).await? > 1 {
                return Err(DomainError::validation(
                    "Transfer captaincy to another member before leaving the team",
                ));
            }

            team.deactivate();
            info!(team_id = %team.id(), "Last member left; team deactivated");
            self.stores.teams.update(team.clone()).await?;
        }

        self.stores.memberships.delete(membership.id()).await?;
        info!(team_id = %team.id(), user_id = %user_id, "User left team");
        Ok(())
    }

    /// Invite a user, addressed by email, to the captain's team
    pub async fn send_invitation(
        &self,
        captain_id: &UserId,
        team_id: &TeamId,
        email: &str,
        message: &str,
    ) -> Result<TeamInvitation, DomainError> {
        let message = message.trim();
        validate_invitation_message(message)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let _guard = self.stores.lock_writes().await;

        let team = self.captained_team(captain_id, team_id).await?;
        if !team.is_active() {
            return Err(DomainError::validation("This team is not active"));
        }
        if team.is_full(member_count(&self.stores, team_id).await?) {
            return Err(DomainError::validation("This team is full"));
        }

        let email = email.trim().to_lowercase();
        let target = self
            .stores
            .users
            .find_one({
                let email = email.clone();
                move |u| u.email() == email
            })
            .await?
            .ok_or_else(|| DomainError::not_found(format!("No user with email '{}'", email)))?;

        if target.id() == captain_id {
            return Err(DomainError::validation("You cannot invite yourself"));
        }
        self.ensure_teamless(target.id(), "This user is already in a team")
            .await?;
        if self
            .membership_record(team_id, target.id())
            .await?
            .is_some_and(|m| m.is_pending())
        {
            return Err(DomainError::validation(
                "This user has already requested to join your team",
            ));
        }

        let (team_key, to) = (team_id.clone(), target.id().clone());
        let existing = self
            .stores
            .invitations
            .find_one(move |i| i.team_id() == &team_key && i.to_user_id() == &to)
            .await?;

        let invitation = match existing {
            Some(invitation) if invitation.is_pending() => {
                return Err(DomainError::conflict(
                    "This user already has a pending invitation from your team",
                ));
            }
            Some(mut invitation) => {
                invitation.renew(captain_id.clone(), message);
                self.stores.invitations.update(invitation).await?
            }
            None => {
                self.stores
                    .invitations
                    .create(TeamInvitation::new(
                        team_id.clone(),
                        captain_id.clone(),
                        target.id().clone(),
                        message,
                    ))
                    .await?
            }
        };

        info!(team_id = %team_id, to_user_id = %target.id(), "Invitation sent");
        Ok(invitation)
    }

    pub async fn cancel_invitation(
        &self,
        captain_id: &UserId,
        invitation_id: &InvitationId,
    ) -> Result<TeamInvitation, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let mut invitation = self
            .stores
            .invitations
            .require(invitation_id, "Invitation")
            .await?;
        self.captained_team(captain_id, invitation.team_id()).await?;

        if !invitation.is_pending() {
            return Err(DomainError::validation(
                "Only pending invitations can be cancelled",
            ));
        }

        invitation.cancel();
        info!(invitation_id = %invitation_id, "Invitation cancelled");
        self.stores.invitations.update(invitation).await
    }

    /// Join a team through an invitation
    pub async fn accept_invitation(
        &self,
        user_id: &UserId,
        invitation_id: &InvitationId,
    ) -> Result<TeamMembership, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let mut invitation = self.invitation_for(user_id, invitation_id).await?;
        self.ensure_teamless(user_id, "You are already in a team").await?;

        let team = self.stores.teams.require(invitation.team_id(), "Team").await?;
        let unavailable = if !team.is_active() {
            Some("This team is no longer active")
        } else if team.is_full(member_count(&self.stores, team.id()).await?) {
            Some("Team is now full")
        } else {
            None
        };

        if let Some(reason) = unavailable {
            invitation.cancel();
            self.stores.invitations.update(invitation).await?;
            return Err(DomainError::validation(reason));
        }

        invitation.accept();
        let invitation = self.stores.invitations.update(invitation).await?;

        let membership = match self.membership_record(team.id(), user_id).await? {
            Some(mut existing) => {
                existing.accept();
                self.stores.memberships.update(existing).await?
            }
            None => {
                self.stores
                    .memberships
                    .create(TeamMembership::accepted(team.id().clone(), user_id.clone()))
                    .await?
            }
        };
        self.settle_user(user_id, Some(membership.id()), Some(invitation.id()))
            .await?;

        info!(team_id = %team.id(), user_id = %user_id, "Invitation accepted");
        Ok(membership)
    }

    pub async fn decline_invitation(
        &self,
        user_id: &UserId,
        invitation_id: &InvitationId,
    ) -> Result<TeamInvitation, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let mut invitation = self.invitation_for(user_id, invitation_id).await?;
        invitation.decline();

        info!(invitation_id = %invitation_id, user_id = %user_id, "Invitation declined");
        self.stores.invitations.update(invitation).await
    }

    /// Pending invitations addressed to the user, newest first
    pub async fn list_invitations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<TeamInvitation>, DomainError> {
        let to = user_id.clone();
        let mut invitations = self
            .stores
            .invitations
            .find_all(move |i| i.to_user_id() == &to && i.is_pending())
            .await?;
        invitations.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(invitations)
    }

    /// Pending invitations sent by the captain's team
    pub async fn sent_invitations(
        &self,
        captain_id: &UserId,
        team_id: &TeamId,
    ) -> Result<Vec<TeamInvitation>, DomainError> {
        self.captained_team(captain_id, team_id).await?;

        let team_key = team_id.clone();
        self.stores
            .invitations
            .find_all(move |i| i.team_id() == &team_key && i.is_pending())
            .await
    }

    /// Pending join requests for the captain's team
    pub async fn pending_requests(
        &self,
        captain_id: &UserId,
        team_id: &TeamId,
    ) -> Result<Vec<TeamMembership>, DomainError> {
        self.captained_team(captain_id, team_id).await?;

        let team_key = team_id.clone();
        self.stores
            .memberships
            .find_all(move |m| m.team_id() == &team_key && m.is_pending())
            .await
    }

    /// Active teams with their member counts
    pub async fn list_teams(&self) -> Result<Vec<TeamSummary>, DomainError> {
        let counts = self.member_counts().await?;

        Ok(self
            .stores
            .teams
            .find_all(|t| t.is_active())
            .await?
            .into_iter()
            .map(|team| {
                let count = counts.get(team.id()).copied().unwrap_or(0);
                TeamSummary::new(team, count)
            })
            .collect())
    }

    pub async fn team_detail(&self, team_id: &TeamId) -> Result<TeamDetail, DomainError> {
        let team = self.stores.teams.require(team_id, "Team").await?;
        let memberships = accepted_members(&self.stores, team_id).await?;

        let mut members = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let username = self
                .stores
                .users
                .get(membership.user_id())
                .await?
                .map(|u| u.username().to_string())
                .unwrap_or_default();

            members.push(TeamMember {
                membership_id: membership.id().clone(),
                user_id: membership.user_id().clone(),
                is_captain: team.is_captain(membership.user_id()),
                joined_at: membership.decided_at(),
                username,
            });
        }
        members.sort_by_key(|m| (!m.is_captain, m.joined_at));

        Ok(TeamDetail {
            summary: TeamSummary::new(team, members.len()),
            members,
        })
    }

    /// The caller's team, if any
    pub async fn my_team(&self, user_id: &UserId) -> Result<Option<TeamDetail>, DomainError> {
        match accepted_membership(&self.stores, user_id).await? {
            Some(membership) => Ok(Some(self.team_detail(membership.team_id()).await?)),
            None => Ok(None),
        }
    }

    /// Active teams that can compete, best first
    pub async fn leaderboard(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<Ranked<TeamEntry>>, DomainError> {
        let standings = self
            .list_teams()
            .await?
            .into_iter()
            .filter(|summary| summary.can_compete)
            .map(|summary| Standing {
                score: summary.team.total_score(),
                challenges_solved: summary.team.challenges_solved(),
                last_submission: summary.team.last_submission(),
                competitor: TeamEntry {
                    team_id: summary.team.id().clone(),
                    name: summary.team.name().to_string(),
                    member_count: summary.member_count,
                },
            })
            .collect();

        Ok(rank(standings, limit))
    }

    async fn member_counts(&self) -> Result<HashMap<TeamId, usize>, DomainError> {
        let mut counts = HashMap::new();
        for membership in self.stores.memberships.find_all(|m| m.is_accepted()).await? {
            *counts.entry(membership.team_id().clone()).or_default() += 1;
        }
        Ok(counts)
    }

    async fn ensure_teamless(&self, user_id: &UserId, message: &str) -> Result<(), DomainError> {
        if accepted_membership(&self.stores, user_id).await?.is_some() {
            return Err(DomainError::validation(message));
        }
        Ok(())
    }

    async fn captained_team(
        &self,
        captain_id: &UserId,
        team_id: &TeamId,
    ) -> Result<Team, DomainError> {
        let team = self.stores.teams.require(team_id, "Team").await?;
        if !team.is_captain(captain_id) {
            return Err(DomainError::forbidden(
                "Only the team captain can perform this action",
            ));
        }
        Ok(team)
    }

    async fn pending_request_for(
        &self,
        captain_id: &UserId,
        membership_id: &MembershipId,
    ) -> Result<(TeamMembership, Team), DomainError> {
        let membership = self
            .stores
            .memberships
            .require(membership_id, "Membership")
            .await?;
        let team = self.captained_team(captain_id, membership.team_id()).await?;

        if !membership.is_pending() {
            return Err(DomainError::validation(
                "This request has already been handled",
            ));
        }
        Ok((membership, team))
    }

    async fn invitation_for(
        &self,
        user_id: &UserId,
        invitation_id: &InvitationId,
    ) -> Result<TeamInvitation, DomainError> {
        let invitation = self
            .stores
            .invitations
            .require(invitation_id, "Invitation")
            .await?;

        if invitation.to_user_id() != user_id {
            return Err(DomainError::forbidden("This invitation is not addressed to you"));
        }
        if !invitation.is_pending() {
            return Err(DomainError::validation(
                "This invitation is no longer pending",
            ));
        }
        Ok(invitation)
    }

    async fn membership_record(
        &self,
        team_id: &TeamId,
        user_id: &UserId,
    ) -> Result<Option<TeamMembership>, DomainError> {
        let (team_key, user_key) = (team_id.clone(), user_id.clone());
        self.stores
            .memberships
            .find_one(move |m| m.team_id() == &team_key && m.user_id() == &user_key)
            .await
    }

    async fn pending_requests_of(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<TeamMembership>, DomainError> {
        let owner = user_id.clone();
        self.stores
            .memberships
            .find_all(move |m| m.user_id() == &owner && m.is_pending())
            .await
    }

    /// Once a user is placed in a team, their other requests are rejected and
    /// their other invitations cancelled.
    async fn settle_user(
        &self,
        user_id: &UserId,
        keep_membership: Option<&MembershipId>,
        keep_invitation: Option<&InvitationId>,
    ) -> Result<(), DomainError> {
        for mut membership in self.pending_requests_of(user_id).await? {
            if Some(membership.id()) != keep_membership {
                membership.reject();
                self.stores.memberships.update(membership).await?;
            }
        }

        let to = user_id.clone();
        for mut invitation in self
            .stores
            .invitations
            .find_all(move |i| i.to_user_id() == &to && i.is_pending())
            .await?
        {
            if Some(invitation.id()) != keep_invitation {
                invitation.cancel();
                self.stores.invitations.update(invitation).await?;
            }
        }

        debug!(user_id = %user_id, "Settled outstanding requests and invitations");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::team::{InvitationStatus, MembershipStatus};
    use crate::domain::user::User;

    pub(crate) async fn user(stores: &Stores, name: &str) -> User {
        stores
            .users
            .create(User::new(name, format!("{}@ctf.local", name), "hash"))
            .await
            .unwrap()
    }

    pub(crate) fn request(name: &str) -> CreateTeamRequest {
        CreateTeamRequest {
            name: name.to_string(),
            description: Some("We hack things".to_string()),
        }
    }

    /// A team of `members` players (captain included); returns the team and its roster
    pub(crate) async fn team_with_members(
        stores: &Stores,
        name: &str,
        members: usize,
    ) -> (Team, Vec<User>) {
        let service = TeamService::new(stores.clone(), 3);
        let captain = user(stores, &format!("{}_cap", name)).await;
        let team = service.create_team(captain.id(), request(name)).await.unwrap();

        let mut roster = vec![captain.clone()];
        for i in 1..members {
            let member = user(stores, &format!("{}_m{}", name, i)).await;
            let pending = service.request_join(member.id(), team.id()).await.unwrap();
            service.approve(captain.id(), pending.id()).await.unwrap();
            roster.push(member);
        }

        (team, roster)
    }

    fn service(stores: &Stores) -> TeamService {
        TeamService::new(stores.clone(), 3)
    }

    #[tokio::test]
    async fn test_create_team_makes_captain_member() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let captain = user(&stores, "cap").await;

        let team = service
            .create_team(captain.id(), request("  Red Team  "))
            .await
            .unwrap();

        assert_eq!(team.name(), "Red Team");
        assert_eq!(team.max_members(), 3);
        let detail = service.team_detail(team.id()).await.unwrap();
        assert_eq!(detail.summary.member_count, 1);
        assert!(detail.members[0].is_captain);
        assert!(!detail.summary.can_compete);
    }

    #[tokio::test]
    async fn test_create_team_rules() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let captain = user(&stores, "cap").await;
        let other = user(&stores, "other").await;
        let team = service.create_team(captain.id(), request("Red")).await.unwrap();

        let twice = service.create_team(captain.id(), request("Blue")).await;
        assert!(matches!(twice, Err(DomainError::Validation { .. })));

        let duplicate = service.create_team(other.id(), request("red")).await;
        assert!(matches!(duplicate, Err(DomainError::Conflict { .. })));

        service.request_join(other.id(), team.id()).await.unwrap();
        let pending = service.create_team(other.id(), request("Green")).await;
        assert!(matches!(pending, Err(DomainError::Validation { .. })));

        let blank = service.create_team(user(&stores, "third").await.id(), request("  ")).await;
        assert!(matches!(blank, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_join_request_flow() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let captain = user(&stores, "cap").await;
        let player = user(&stores, "player").await;
        let team = service.create_team(captain.id(), request("Red")).await.unwrap();

        let pending = service.request_join(player.id(), team.id()).await.unwrap();
        let duplicate = service.request_join(player.id(), team.id()).await;
        assert!(matches!(duplicate, Err(DomainError::Conflict { .. })));

        let stranger = service.approve(player.id(), pending.id()).await;
        assert!(matches!(stranger, Err(DomainError::Forbidden { .. })));

        let rejected = service.reject(captain.id(), pending.id()).await.unwrap();
        assert_eq!(rejected.status(), MembershipStatus::Rejected);

        let reopened = service.request_join(player.id(), team.id()).await.unwrap();
        assert_eq!(reopened.id(), pending.id());
        assert!(reopened.is_pending());

        let accepted = service.approve(captain.id(), reopened.id()).await.unwrap();
        assert!(accepted.is_accepted());
        assert!(service.team_detail(team.id()).await.unwrap().summary.can_compete);
    }

    #[tokio::test]
    async fn test_captain_cannot_request_own_team() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let captain = user(&stores, "cap").await;
        let team = service.create_team(captain.id(), request("Red")).await.unwrap();

        let result = service.request_join(captain.id(), team.id()).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_approval_rejects_other_requests_and_invitations() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let red_cap = user(&stores, "red_cap").await;
        let blue_cap = user(&stores, "blue_cap").await;
        let green_cap = user(&stores, "green_cap").await;
        let player = user(&stores, "player").await;

        let red = service.create_team(red_cap.id(), request("Red")).await.unwrap();
        let blue = service.create_team(blue_cap.id(), request("Blue")).await.unwrap();
        let green = service.create_team(green_cap.id(), request("Green")).await.unwrap();

        let to_red = service.request_join(player.id(), red.id()).await.unwrap();
        let to_blue = service.request_join(player.id(), blue.id()).await.unwrap();
        let invitation = service
            .send_invitation(green_cap.id(), green.id(), "player@ctf.local", "join us")
            .await
            .unwrap();

        service.approve(red_cap.id(), to_red.id()).await.unwrap();

        let blue_request = stores.memberships.get(to_blue.id()).await.unwrap().unwrap();
        assert_eq!(blue_request.status(), MembershipStatus::Rejected);
        let invitation = stores.invitations.get(invitation.id()).await.unwrap().unwrap();
        assert_eq!(invitation.status(), InvitationStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_full_team_rejects_requests() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let (team, _) = team_with_members(&stores, "Red", 3).await;
        let late = user(&stores, "late").await;

        let result = service.request_join(late.id(), team.id()).await;
        match result {
            Err(DomainError::Validation { message }) => assert_eq!(message, "This team is full"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remove_member_and_captain_protection() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let (team, roster) = team_with_members(&stores, "Red", 2).await;
        let detail = service.team_detail(team.id()).await.unwrap();

        let captain_membership = &detail.members.iter().find(|m| m.is_captain).unwrap().membership_id;
        let member_membership = &detail.members.iter().find(|m| !m.is_captain).unwrap().membership_id;

        let result = service.remove_member(roster[0].id(), captain_membership).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        let not_captain = service.remove_member(roster[1].id(), member_membership).await;
        assert!(matches!(not_captain, Err(DomainError::Forbidden { .. })));

        service.remove_member(roster[0].id(), member_membership).await.unwrap();
        assert_eq!(service.team_detail(team.id()).await.unwrap().summary.member_count, 1);
    }

    #[tokio::test]
    async fn test_transfer_captaincy_and_leave() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let (team, roster) = team_with_members(&stores, "Red", 2).await;
        let outsider = user(&stores, "outsider").await;

        let blocked = service.leave_team(roster[0].id()).await;
        assert!(matches!(blocked, Err(DomainError::Validation { .. })));

        let invalid = service
            .transfer_captaincy(roster[0].id(), team.id(), outsider.id())
            .await;
        assert!(matches!(invalid, Err(DomainError::Validation { .. })));

        let team = service
            .transfer_captaincy(roster[0].id(), team.id(), roster[1].id())
            .await
            .unwrap();
        assert!(team.is_captain(roster[1].id()));

        service.leave_team(roster[0].id()).await.unwrap();
        service.leave_team(roster[1].id()).await.unwrap();

        let team = stores.teams.get(team.id()).await.unwrap().unwrap();
        assert!(!team.is_active());
        assert!(service.list_teams().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_join_requests() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let captain = user(&stores, "cap").await;
        let player = user(&stores, "player").await;
        let team = service.create_team(captain.id(), request("Red")).await.unwrap();

        let none = service.cancel_join_requests(player.id()).await;
        assert!(matches!(none, Err(DomainError::NotFound { .. })));

        service.request_join(player.id(), team.id()).await.unwrap();
        assert_eq!(service.cancel_join_requests(player.id()).await.unwrap(), 1);
        assert!(service
            .pending_requests(captain.id(), team.id())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_invitation_rules() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let captain = user(&stores, "cap").await;
        let player = user(&stores, "player").await;
        let team = service.create_team(captain.id(), request("Red")).await.unwrap();

        let self_invite = service
            .send_invitation(captain.id(), team.id(), "cap@ctf.local", "")
            .await;
        assert!(matches!(self_invite, Err(DomainError::Validation { .. })));

        let unknown = service
            .send_invitation(captain.id(), team.id(), "ghost@ctf.local", "")
            .await;
        assert!(matches!(unknown, Err(DomainError::NotFound { .. })));

        let invitation = service
            .send_invitation(captain.id(), team.id(), "PLAYER@ctf.local", "hi")
            .await
            .unwrap();
        let duplicate = service
            .send_invitation(captain.id(), team.id(), "player@ctf.local", "hi")
            .await;
        assert!(matches!(duplicate, Err(DomainError::Conflict { .. })));

        service.cancel_invitation(captain.id(), invitation.id()).await.unwrap();
        let renewed = service
            .send_invitation(captain.id(), team.id(), "player@ctf.local", "again")
            .await
            .unwrap();
        assert_eq!(renewed.id(), invitation.id());
        assert!(renewed.is_pending());
        assert_eq!(service.list_invitations(player.id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_accept_invitation_joins_team() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let captain = user(&stores, "cap").await;
        let player = user(&stores, "player").await;
        let team = service.create_team(captain.id(), request("Red")).await.unwrap();

        let invitation = service
            .send_invitation(captain.id(), team.id(), "player@ctf.local", "")
            .await
            .unwrap();

        let wrong_user = service.accept_invitation(captain.id(), invitation.id()).await;
        assert!(matches!(wrong_user, Err(DomainError::Forbidden { .. })));

        let membership = service.accept_invitation(player.id(), invitation.id()).await.unwrap();
        assert!(membership.is_accepted());
        assert_eq!(
            service.my_team(player.id()).await.unwrap().unwrap().summary.team.id(),
            team.id()
        );
    }

    #[tokio::test]
    async fn test_accept_invitation_to_full_team_cancels_it() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let (team, roster) = team_with_members(&stores, "Red", 2).await;
        let invited = user(&stores, "invited").await;
        let filler = user(&stores, "filler").await;

        let invitation = service
            .send_invitation(roster[0].id(), team.id(), "invited@ctf.local", "")
            .await
            .unwrap();
        let pending = service.request_join(filler.id(), team.id()).await.unwrap();
        service.approve(roster[0].id(), pending.id()).await.unwrap();

        let result = service.accept_invitation(invited.id(), invitation.id()).await;
        match result {
            Err(DomainError::Validation { message }) => assert_eq!(message, "Team is now full"),
            other => panic!("expected validation error, got {:?}", other),
        }

        let invitation = stores.invitations.get(invitation.id()).await.unwrap().unwrap();
        assert_eq!(invitation.status(), InvitationStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_decline_invitation() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let captain = user(&stores, "cap").await;
        let player = user(&stores, "player").await;
        let team = service.create_team(captain.id(), request("Red")).await.unwrap();
        let invitation = service
            .send_invitation(captain.id(), team.id(), "player@ctf.local", "")
            .await
            .unwrap();

        let declined = service.decline_invitation(player.id(), invitation.id()).await.unwrap();
        assert_eq!(declined.status(), InvitationStatus::Rejected);
        assert!(service.list_invitations(player.id()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_team_leaderboard_only_competing_teams() {
        let stores = Stores::in_memory();
        let service = service(&stores);
        let (red, _) = team_with_members(&stores, "Red", 2).await;
        let (blue, _) = team_with_members(&stores, "Blue", 2).await;
        team_with_members(&stores, "Solo", 1).await;

        let mut red = stores.teams.get(red.id()).await.unwrap().unwrap();
        red.credit_solve(100, Utc::now());
        stores.teams.update(red).await.unwrap();

        let board = service.leaderboard(None).await.unwrap();
        let names: Vec<_> = board.iter().map(|r| r.standing.competitor.name.as_str()).collect();
        assert_eq!(names, vec!["Red", "Blue"]);
        assert_eq!(board[1].standing.competitor.team_id, *blue.id());
    }
}
