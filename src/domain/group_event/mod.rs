//! Group event domain
//!
//! Time-boxed team competitions, the platform mode switch, access rules and
//! event-scoped scoring.

mod access;
mod challenge;
mod event;
mod platform_mode;
mod scoring;
mod validation;

pub use access::{
    evaluate_access, has_active_event, has_active_membership, is_authenticated, meets_team_size,
    AccessContext, GroupAccessDenial, TeamSnapshot,
};
pub use challenge::{
    GroupChallenge, GroupChallengeId, GroupSubmission, GroupSubmissionId,
    DEFAULT_MAX_ATTEMPTS_PER_TEAM,
};
pub use event::{EventPhase, GroupEvent, GroupEventId};
pub use platform_mode::{CompetitionMode, PlatformMode, PlatformModeId};
pub use scoring::{
    attempt_summary, calculate_points, challenge_stats, event_standings, AttemptSummary,
    ChallengeStats,
};
pub use validation::{activation_errors, deactivation_errors, validate_event_draft, EventDraft};
