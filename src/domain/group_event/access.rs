//! Who may play group challenges
//!
//! Access is the conjunction of four independent predicates, checked in the
//! order a player would fix them: be logged in, be an accepted member of an
//! active team, have enough teammates, and have a group event running.

use serde::Serialize;
use thiserror::Error;

use super::event::GroupEvent;
use super::platform_mode::PlatformMode;
use crate::domain::team::{Team, MIN_COMPETING_MEMBERS};
use crate::domain::DomainError;

/// Why a user may not access group challenges
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GroupAccessDenial {
    #[error("You must be logged in to access group challenges")]
    NotAuthenticated,

    #[error("You must be in a team to access group challenges")]
    NotInTeam,

    #[error("Your team '{team_name}' is not active")]
    TeamInactive { team_name: String },

    #[error("Your team '{team_name}' needs at least {min} members to compete", min = MIN_COMPETING_MEMBERS)]
    TeamTooSmall { team_name: String, member_count: usize },

    #[error("No group competition is currently active")]
    NoActiveEvent,
}

impl GroupAccessDenial {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::NotInTeam => "not_in_team",
            Self::TeamInactive { .. } => "team_inactive",
            Self::TeamTooSmall { .. } => "team_too_small",
            Self::NoActiveEvent => "no_active_event",
        }
    }
}

impl From<GroupAccessDenial> for DomainError {
    fn from(denial: GroupAccessDenial) -> Self {
        DomainError::access_denied(denial.to_string(), denial.code())
    }
}

/// The accepted team of the user being checked
#[derive(Debug, Clone, Copy)]
pub struct TeamSnapshot<'a> {
    pub team: &'a Team,
    pub member_count: usize,
}

/// Everything the access predicates look at
#[derive(Debug, Clone, Copy)]
pub struct AccessContext<'a> {
    pub authenticated: bool,
    pub team: Option<TeamSnapshot<'a>>,
    pub platform_mode: &'a PlatformMode,
    pub active_event: Option<&'a GroupEvent>,
}

pub fn is_authenticated(ctx: &AccessContext<'_>) -> Result<(), GroupAccessDenial> {
    if ctx.authenticated {
        Ok(())
    } else {
        Err(GroupAccessDenial::NotAuthenticated)
    }
}

pub fn has_active_membership(ctx: &AccessContext<'_>) -> Result<(), GroupAccessDenial> {
    match ctx.team {
        None => Err(GroupAccessDenial::NotInTeam),
        Some(snapshot) if !snapshot.team.is_active() => Err(GroupAccessDenial::TeamInactive {
            team_name: snapshot.team.name().to_string(),
        }),
        Some(_) => Ok(()),
    }
}

pub fn meets_team_size(ctx: &AccessContext<'_>) -> Result<(), GroupAccessDenial> {
    match ctx.team {
        Some(snapshot) if !snapshot.team.can_compete(snapshot.member_count) => {
            Err(GroupAccessDenial::TeamTooSmall {
                team_name: snapshot.team.name().to_string(),
                member_count: snapshot.member_count,
            })
        }
        Some(_) => Ok(()),
        None => Err(GroupAccessDenial::NotInTeam),
    }
}

pub fn has_active_event(ctx: &AccessContext<'_>) -> Result<(), GroupAccessDenial> {
    let running = ctx.platform_mode.is_group_mode()
        && ctx.active_event.is_some_and(|event| {
            event.is_active() && ctx.platform_mode.is_active_event(event.id())
        });

    if running {
        Ok(())
    } else {
        Err(GroupAccessDenial::NoActiveEvent)
    }
}

/// Returns the first failing predicate, if any
pub fn evaluate_access(ctx: &AccessContext<'_>) -> Result<(), GroupAccessDenial> {
    is_authenticated(ctx)?;
    has_active_membership(ctx)?;
    meets_team_size(ctx)?;
    has_active_event(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserId;
    use chrono::{Duration, Utc};

    struct Fixture {
        team: Team,
        mode: PlatformMode,
        event: GroupEvent,
    }

    fn fixture() -> Fixture {
        let now = Utc::now();
        let mut event = GroupEvent::new(
            "Finals",
            "Team finals",
            now - Duration::hours(1),
            now + Duration::hours(2),
            UserId::generate(),
        );
        event.activate_manually();

        let mut mode = PlatformMode::default();
        mode.switch_to_group(event.id().clone(), None);

        Fixture {
            team: Team::new("Owls", "", UserId::generate(), 5),
            mode,
            event,
        }
    }

    fn context<'a>(f: &'a Fixture, members: usize) -> AccessContext<'a> {
        AccessContext {
            authenticated: true,
            team: Some(TeamSnapshot {
                team: &f.team,
                member_count: members,
            }),
            platform_mode: &f.mode,
            active_event: Some(&f.event),
        }
    }

    #[test]
    fn test_all_predicates_pass() {
        let f = fixture();
        assert_eq!(evaluate_access(&context(&f, 2)), Ok(()));
    }

    #[test]
    fn test_anonymous_is_denied_first() {
        let f = fixture();
        let ctx = AccessContext {
            authenticated: false,
            team: None,
            ..context(&f, 0)
        };

        assert_eq!(evaluate_access(&ctx), Err(GroupAccessDenial::NotAuthenticated));
    }

    #[test]
    fn test_user_without_team() {
        let f = fixture();
        let ctx = AccessContext {
            team: None,
            ..context(&f, 0)
        };

        let denial = evaluate_access(&ctx).unwrap_err();
        assert_eq!(denial, GroupAccessDenial::NotInTeam);
        assert_eq!(
            denial.to_string(),
            "You must be in a team to access group challenges"
        );
    }

    #[test]
    fn test_inactive_team() {
        let mut f = fixture();
        f.team.deactivate();

        let denial = evaluate_access(&context(&f, 3)).unwrap_err();
        assert_eq!(denial.to_string(), "Your team 'Owls' is not active");
    }

    #[test]
    fn test_single_member_team() {
        let f = fixture();

        let denial = evaluate_access(&context(&f, 1)).unwrap_err();
        assert_eq!(denial.code(), "team_too_small");
        assert_eq!(
            denial.to_string(),
            "Your team 'Owls' needs at least 2 members to compete"
        );
    }

    #[test]
    fn test_individual_mode_denies() {
        let mut f = fixture();
        f.mode.switch_to_individual(None);

        assert_eq!(
            evaluate_access(&context(&f, 2)),
            Err(GroupAccessDenial::NoActiveEvent)
        );
    }

    #[test]
    fn test_inactive_event_denies() {
        let mut f = fixture();
        f.event.set_active(false);

        assert_eq!(
            evaluate_access(&context(&f, 2)),
            Err(GroupAccessDenial::NoActiveEvent)
        );
    }

    #[test]
    fn test_predicates_are_independent() {
        let mut f = fixture();
        f.mode.switch_to_individual(None);
        let ctx = context(&f, 1);

        assert!(is_authenticated(&ctx).is_ok());
        assert!(has_active_membership(&ctx).is_ok());
        assert!(meets_team_size(&ctx).is_err());
        assert!(has_active_event(&ctx).is_err());
    }

    #[test]
    fn test_denial_converts_to_domain_error() {
        let error: DomainError = GroupAccessDenial::NoActiveEvent.into();

        match error {
            DomainError::AccessDenied { message, code } => {
                assert_eq!(message, "No group competition is currently active");
                assert_eq!(code, "no_active_event");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
