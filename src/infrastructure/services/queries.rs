//! Store lookups shared by several services

use crate::domain::group_event::{GroupEventId, PlatformMode, PlatformModeId};
use crate::domain::team::{Team, TeamId, TeamMembership};
use crate::domain::user::UserId;
use crate::domain::{DomainError, StorageExt};
use crate::infrastructure::storage::Stores;

/// The user's accepted membership, if they belong to a team
pub(crate) async fn accepted_membership(
    stores: &Stores,
    user_id: &UserId,
) -> Result<Option<TeamMembership>, DomainError> {
    let user_id = user_id.clone();
    stores
        .memberships
        .find_one(move |m| m.user_id() == &user_id && m.is_accepted())
        .await
}

pub(crate) async fn accepted_members(
    stores: &Stores,
    team_id: &TeamId,
) -> Result<Vec<TeamMembership>, DomainError> {
    let team_id = team_id.clone();
    stores
        .memberships
        .find_all(move |m| m.team_id() == &team_id && m.is_accepted())
        .await
}

pub(crate) async fn member_count(stores: &Stores, team_id: &TeamId) -> Result<usize, DomainError> {
    Ok(accepted_members(stores, team_id).await?.len())
}

/// The user's team together with its accepted member count
pub(crate) async fn current_team(
    stores: &Stores,
    user_id: &UserId,
) -> Result<Option<(Team, usize)>, DomainError> {
    let Some(membership) = accepted_membership(stores, user_id).await? else {
        return Ok(None);
    };

    let Some(team) = stores.teams.get(membership.team_id()).await? else {
        return Ok(None);
    };

    let count = member_count(stores, team.id()).await?;
    Ok(Some((team, count)))
}

/// Loads the platform mode singleton; a missing record means individual mode
pub(crate) async fn platform_mode(stores: &Stores) -> Result<PlatformMode, DomainError> {
    Ok(stores
        .platform_mode
        .get(&PlatformModeId::singleton())
        .await?
        .unwrap_or_default())
}

/// Removes an event with its challenges and submissions.
///
/// If the event was driving group mode, the platform returns to individual mode.
pub(crate) async fn delete_event_cascade(
    stores: &Stores,
    event_id: &GroupEventId,
) -> Result<bool, DomainError> {
    let key = event_id.clone();
    for submission in stores
        .group_submissions
        .find_all(move |s| s.event_id() == &key)
        .await?
    {
        stores.group_submissions.delete(submission.id()).await?;
    }

    let key = event_id.clone();
    for challenge in stores
        .group_challenges
        .find_all(move |c| c.event_id() == &key)
        .await?
    {
        stores.group_challenges.delete(challenge.id()).await?;
    }

    let mut mode = platform_mode(stores).await?;
    if mode.is_active_event(event_id) {
        mode.switch_to_individual(None);
        stores.platform_mode.save(mode).await?;
    }

    stores.events.delete(event_id).await
}
