//! Team domain
//!
//! Teams, the join-request workflow and captain invitations.

mod entity;
mod membership;
mod validation;

pub use entity::{Team, TeamId, DEFAULT_MAX_MEMBERS, MIN_COMPETING_MEMBERS};
pub use membership::{
    InvitationId, InvitationStatus, MembershipId, MembershipStatus, TeamInvitation,
    TeamMembership,
};
pub use validation::{
    validate_invitation_message, validate_max_members, validate_team_description,
    validate_team_name, TeamValidationError,
};
