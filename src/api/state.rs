//! Application state for shared services

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::Clock;
use crate::infrastructure::auth::{JwtGenerator, PasswordHasher};
use crate::infrastructure::services::{
    BroadcastService, ChallengeService, ChatService, EventLifecycleService, GroupEventService,
    SubmissionService, TeamService, UserService,
};
use crate::infrastructure::storage::Stores;

/// Services shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub challenge_service: Arc<ChallengeService>,
    pub submission_service: Arc<SubmissionService>,
    pub team_service: Arc<TeamService>,
    pub group_event_service: Arc<GroupEventService>,
    pub lifecycle_service: Arc<EventLifecycleService>,
    pub chat_service: Arc<ChatService>,
    pub broadcast_service: Arc<BroadcastService>,
    pub stores: Stores,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire every service onto one set of stores
    pub fn new(
        stores: Stores,
        clock: Arc<dyn Clock>,
        hasher: Arc<dyn PasswordHasher>,
        jwt: Arc<dyn JwtGenerator>,
        config: AppConfig,
    ) -> Self {
        let competition = &config.competition;

        Self {
            user_service: Arc::new(UserService::new(stores.clone(), hasher, jwt)),
            challenge_service: Arc::new(ChallengeService::new(stores.clone())),
            submission_service: Arc::new(SubmissionService::new(
                stores.clone(),
                clock.clone(),
                competition.leaderboard_limit,
            )),
            team_service: Arc::new(TeamService::new(
                stores.clone(),
                competition.default_max_members,
            )),
            group_event_service: Arc::new(GroupEventService::new(stores.clone(), clock.clone())),
            lifecycle_service: Arc::new(EventLifecycleService::new(stores.clone(), clock)),
            chat_service: Arc::new(ChatService::new(stores.clone())),
            broadcast_service: Arc::new(BroadcastService::new(stores.clone())),
            stores,
            config: Arc::new(config),
        }
    }

    /// In-memory state on the wall clock, for tests
    #[cfg(test)]
    pub fn in_memory() -> Self {
        use crate::domain::SystemClock;
        use crate::infrastructure::auth::{JwtConfig, JwtService};
        use crate::infrastructure::services::PlainHasher;

        Self::new(
            Stores::in_memory(),
            Arc::new(SystemClock),
            Arc::new(PlainHasher),
            Arc::new(JwtService::new(JwtConfig::new("test-secret", 1))),
            AppConfig::default(),
        )
    }
}
