//! Infrastructure services

mod broadcast_service;
mod challenge_service;
mod chat_service;
mod event_lifecycle_service;
mod group_event_service;
mod queries;
mod submission_service;
mod team_service;
mod user_service;

pub use broadcast_service::{BroadcastService, Recipient};
pub use challenge_service::{
    ChallengeListing, ChallengeService, CreateChallengeRequest, HintUnlockResult, HintView,
    UpdateChallengeRequest,
};
pub use chat_service::{ChatMessageView, ChatService, ReactionCount};
pub use event_lifecycle_service::{
    spawn_lifecycle_task, CleanupSummary, EventDetails, EventHistoryEntry, EventLifecycleService,
    EventOverview, EventResults, EventStatistics, EventStatus, LifecycleTransition,
    PreservedEvent, RemovedEvent, StatusSummary, TransitionAction,
};
pub use group_event_service::{
    AccessReport, CreateEventRequest, CreateGroupChallengeRequest, EventInfo, EventTeamEntry,
    GroupAccess, GroupEventService, GroupFlagResult, GroupStatus, TeamChallengeView, TeamRanking,
    UpdateEventRequest, UpdateGroupChallengeRequest,
};
pub use submission_service::{FlagResult, PlayerEntry, SubmissionService};
pub use team_service::{
    CreateTeamRequest, TeamDetail, TeamEntry, TeamMember, TeamService, TeamSummary,
    UpdateTeamRequest,
};
pub use user_service::{
    BootstrapAdminRequest, BootstrappedAdmin, CategorySolves, LoginResult, RegisterUserRequest,
    UpdateProfileRequest, UserProfile, UserService,
};

#[cfg(test)]
pub(crate) use user_service::tests::PlainHasher;
