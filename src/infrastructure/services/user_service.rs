//! User service - registration, authentication and the individual profile

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::challenge::Category;
use crate::domain::user::{
    validate_email, validate_password, validate_person_name, validate_username, PersonalDetails,
    Profile, User, UserId, UserRole,
};
use crate::domain::{DomainError, StorageExt};
use crate::infrastructure::auth::{JwtGenerator, PasswordHasher};
use crate::infrastructure::storage::Stores;

const GENERATED_PASSWORD_LENGTH: usize = 20;

/// Request for registering a new player
#[derive(Debug, Clone, Default)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub details: PersonalDetails,
}

/// Request for updating the caller's own profile; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub details: Option<PersonalDetails>,
}

/// Administrator account created on an empty platform
#[derive(Debug, Clone)]
pub struct BootstrapAdminRequest {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

/// Solved challenges within one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySolves {
    pub category: Category,
    pub solved: u32,
}

/// A user together with their leaderboard position
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: User,
    pub rank: usize,
    pub categories: Vec<CategorySolves>,
}

/// Outcome of the startup admin bootstrap
#[derive(Debug, Clone)]
pub struct BootstrappedAdmin {
    pub user: User,
    /// Set when no password was configured and one had to be generated
    pub generated_password: Option<String>,
}

/// User service for accounts and individual standings
#[derive(Debug, Clone)]
pub struct UserService {
    stores: Stores,
    hasher: Arc<dyn PasswordHasher>,
    jwt: Arc<dyn JwtGenerator>,
}

impl UserService {
    pub fn new(
        stores: Stores,
        hasher: Arc<dyn PasswordHasher>,
        jwt: Arc<dyn JwtGenerator>,
    ) -> Self {
        Self {
            stores,
            hasher,
            jwt,
        }
    }

    /// Register a new player account
    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_lowercase();
        let first_name = request.first_name.unwrap_or_default().trim().to_string();
        let last_name = request.last_name.unwrap_or_default().trim().to_string();

        let mut errors = Vec::new();
        if let Err(e) = validate_username(&username) {
            errors.push(e.to_string());
        }
        if let Err(e) = validate_email(&email) {
            errors.push(e.to_string());
        }
        if let Err(e) = validate_password(&request.password) {
            errors.push(e.to_string());
        }
        if !first_name.is_empty() {
            if let Err(e) = validate_person_name("First name", &first_name) {
                errors.push(e.to_string());
            }
        }
        if !last_name.is_empty() {
            if let Err(e) = validate_person_name("Last name", &last_name) {
                errors.push(e.to_string());
            }
        }
        if !errors.is_empty() {
            return Err(DomainError::validation_list(&errors));
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let _guard = self.stores.lock_writes().await;
        self.ensure_unique(&username, &email).await?;

        let user = User::new(&username, &email, password_hash)
            .with_names(first_name, last_name)
            .with_details(request.details);

        info!(user_id = %user.id(), username = %username, "Registering user");
        self.stores.users.create(user).await
    }

    /// Verify credentials and issue a bearer token
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, DomainError> {
        let username = username.trim().to_string();
        let found = self
            .stores
            .users
            .find_one(move |u| u.username() == username)
            .await?;

        let mut user = match found {
            Some(user) if self.hasher.verify(password, user.password_hash()) => user,
            _ => return Err(DomainError::unauthorized("Invalid username or password")),
        };

        if !user.status().can_login() {
            warn!(user_id = %user.id(), "Login attempt on suspended account");
            return Err(DomainError::forbidden("This account has been suspended"));
        }

        user.record_login();
        let user = self.stores.users.update(user).await?;
        let token = self.jwt.generate(&user)?;
        let expires_at = Utc::now() + Duration::hours(self.jwt.expiration_hours() as i64);

        info!(user_id = %user.id(), "User logged in");
        Ok(LoginResult {
            token,
            user,
            expires_at,
        })
    }

    /// Resolve a bearer token to an active user
    pub async fn authenticate_token(&self, token: &str) -> Result<User, DomainError> {
        let claims = self.jwt.validate(token)?;
        let user_id = UserId::new(claims.user_id())
            .map_err(|_| DomainError::unauthorized("Invalid token subject"))?;

        let user = self
            .stores
            .users
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::unauthorized("User no longer exists"))?;

        if !user.is_active() {
            return Err(DomainError::forbidden("This account has been suspended"));
        }

        Ok(user)
    }

    pub async fn get(&self, user_id: &UserId) -> Result<User, DomainError> {
        self.stores.users.require(user_id, "User").await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email = email.trim().to_lowercase();
        self.stores
            .users
            .find_one(move |u| u.email() == email)
            .await
    }

    /// Profile with leaderboard rank and solves per category
    pub async fn profile(&self, user_id: &UserId) -> Result<UserProfile, DomainError> {
        let user = self.get(user_id).await?;
        let score = user.profile().total_score;

        let ahead = self
            .stores
            .users
            .find_all(move |u| u.can_score() && u.profile().total_score > score)
            .await?
            .len();

        let owner = user_id.clone();
        let solved: HashSet<_> = self
            .stores
            .submissions
            .find_all(move |s| s.user_id() == &owner && s.is_correct())
            .await?
            .into_iter()
            .map(|s| s.challenge_id().clone())
            .collect();

        let mut per_category: HashMap<Category, u32> = HashMap::new();
        for challenge in self.stores.challenges.list().await? {
            if solved.contains(challenge.id()) {
                *per_category.entry(challenge.category()).or_default() += 1;
            }
        }

        let categories = Category::ALL
            .iter()
            .map(|category| CategorySolves {
                category: *category,
                solved: per_category.get(category).copied().unwrap_or(0),
            })
            .collect();

        Ok(UserProfile {
            user,
            rank: ahead + 1,
            categories,
        })
    }

    pub async fn update_profile(
        &self,
        user_id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.get(user_id).await?;

        let first_name = request
            .first_name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| user.first_name().to_string());
        let last_name = request
            .last_name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| user.last_name().to_string());

        if !first_name.is_empty() {
            validate_person_name("First name", &first_name)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }
        if !last_name.is_empty() {
            validate_person_name("Last name", &last_name)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        user.set_names(first_name, last_name);
        if let Some(details) = request.details {
            user.set_details(details);
        }

        info!(user_id = %user_id, "Updating user profile");
        self.stores.users.update(user).await
    }

    /// List every account in registration order
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.stores.users.list().await
    }

    pub async fn suspend(&self, admin_id: &UserId, user_id: &UserId) -> Result<User, DomainError> {
        if admin_id == user_id {
            return Err(DomainError::validation("You cannot suspend your own account"));
        }

        let mut user = self.get(user_id).await?;
        user.suspend();

        info!(user_id = %user_id, admin_id = %admin_id, "Suspending user");
        self.stores.users.update(user).await
    }

    pub async fn activate(&self, admin_id: &UserId, user_id: &UserId) -> Result<User, DomainError> {
        let mut user = self.get(user_id).await?;
        user.activate();

        info!(user_id = %user_id, admin_id = %admin_id, "Activating user");
        self.stores.users.update(user).await
    }

    /// Rebuild every player's profile from the submission ledger and hint purchases.
    ///
    /// Returns the number of profiles that changed.
    pub async fn recalculate_scores(&self) -> Result<usize, DomainError> {
        let _guard = self.stores.lock_writes().await;

        let submissions = self.stores.submissions.find_all(|s| s.is_correct()).await?;
        let unlocks = self.stores.hint_unlocks.list().await?;
        let mut changed = 0;

        for mut user in self.stores.users.find_all(|u| u.can_score()).await? {
            let mut earned: u64 = 0;
            let mut solved = HashSet::new();
            let mut last_submission: Option<DateTime<Utc>> = None;

            for submission in submissions.iter().filter(|s| s.user_id() == user.id()) {
                earned += u64::from(submission.points_awarded());
                solved.insert(submission.challenge_id().clone());
                last_submission = last_submission.max(Some(submission.submitted_at()));
            }

            let deducted: u64 = unlocks
                .iter()
                .filter(|u| u.user_id() == user.id())
                .map(|u| u64::from(u.points_deducted()))
                .sum();

            let profile = Profile {
                total_score: earned.saturating_sub(deducted),
                challenges_solved: solved.len() as u32,
                last_submission,
            };

            if user.profile() != &profile {
                user.replace_profile(profile);
                self.stores.users.update(user).await?;
                changed += 1;
            }
        }

        info!(changed, "Recalculated player scores");
        Ok(changed)
    }

    /// Create the first administrator when the platform has no users yet
    pub async fn bootstrap_admin(
        &self,
        request: BootstrapAdminRequest,
    ) -> Result<Option<BootstrappedAdmin>, DomainError> {
        let _guard = self.stores.lock_writes().await;

        if self.stores.users.count().await? > 0 {
            return Ok(None);
        }

        validate_username(&request.username)
            .map_err(|e| DomainError::configuration(format!("Bootstrap admin: {}", e)))?;

        let (password, generated_password) = match request.password {
            Some(password) => (password, None),
            None => {
                let password = generate_password();
                (password.clone(), Some(password))
            }
        };

        let user = User::new(
            request.username,
            request.email.to_lowercase(),
            self.hasher.hash(&password)?,
        )
        .with_role(UserRole::Admin);

        info!(user_id = %user.id(), username = %user.username(), "Creating bootstrap admin");
        let user = self.stores.users.create(user).await?;

        Ok(Some(BootstrappedAdmin {
            user,
            generated_password,
        }))
    }

    async fn ensure_unique(&self, username: &str, email: &str) -> Result<(), DomainError> {
        let (name, mail) = (username.to_string(), email.to_string());
        let existing = self
            .stores
            .users
            .find_all(move |u| u.username() == name || u.email() == mail)
            .await?;

        if existing.iter().any(|u| u.username() == username) {
            return Err(DomainError::conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        if !existing.is_empty() {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        Ok(())
    }
}

fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::challenge::{Challenge, Difficulty, Hint, HintUnlock};
    use crate::domain::submission::Submission;
    use crate::infrastructure::auth::{JwtConfig, JwtService};

    /// Reversible stand-in for Argon2, which is too slow for unit tests
    #[derive(Debug)]
    pub(crate) struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String, DomainError> {
            Ok(format!("plain:{}", password))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            hash == format!("plain:{}", password)
        }
    }

    pub(crate) fn create_service(stores: &Stores) -> UserService {
        UserService::new(
            stores.clone(),
            Arc::new(PlainHasher),
            Arc::new(JwtService::new(JwtConfig::new("test-secret", 24))),
        )
    }

    pub(crate) fn register_request(username: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            email: format!("{}@ctf.local", username),
            password: "correct-horse".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_creates_player() {
        let stores = Stores::in_memory();
        let service = create_service(&stores);

        let user = service
            .register(RegisterUserRequest {
                first_name: Some("Ada".to_string()),
                last_name: Some("Lovelace".to_string()),
                ..register_request("ada")
            })
            .await
            .unwrap();

        assert_eq!(user.role(), UserRole::Player);
        assert_eq!(user.first_name(), "Ada");
        assert_eq!(user.password_hash(), "plain:correct-horse");
    }

    #[tokio::test]
    async fn test_register_collects_all_errors() {
        let service = create_service(&Stores::in_memory());

        let result = service
            .register(RegisterUserRequest {
                username: "a@b".to_string(),
                email: "nope".to_string(),
                password: "short".to_string(),
                ..Default::default()
            })
            .await;

        match result {
            Err(DomainError::Validation { message }) => {
                assert!(message.contains("@"));
                assert!(message.contains("email"));
                assert!(message.contains("8"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let service = create_service(&Stores::in_memory());
        service.register(register_request("ada")).await.unwrap();

        let same_name = service.register(register_request("ada")).await;
        assert!(matches!(same_name, Err(DomainError::Conflict { .. })));

        let same_email = service
            .register(RegisterUserRequest {
                email: "ADA@ctf.local".to_string(),
                ..register_request("ada2")
            })
            .await;
        assert!(matches!(same_email, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_login_and_token_round_trip() {
        let service = create_service(&Stores::in_memory());
        let user = service.register(register_request("ada")).await.unwrap();

        let login = service.login("ada", "correct-horse").await.unwrap();
        assert!(login.user.last_login_at().is_some());
        assert!(login.expires_at > Utc::now());

        let resolved = service.authenticate_token(&login.token).await.unwrap();
        assert_eq!(resolved.id(), user.id());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let service = create_service(&Stores::in_memory());
        service.register(register_request("ada")).await.unwrap();

        let wrong = service.login("ada", "wrong-password").await;
        assert!(matches!(wrong, Err(DomainError::Unauthorized { .. })));

        let unknown = service.login("bob", "correct-horse").await;
        assert!(matches!(unknown, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_suspended_user_cannot_login() {
        let service = create_service(&Stores::in_memory());
        let admin = UserId::generate();
        let user = service.register(register_request("ada")).await.unwrap();

        service.suspend(&admin, user.id()).await.unwrap();
        let result = service.login("ada", "correct-horse").await;
        assert!(matches!(result, Err(DomainError::Forbidden { .. })));

        service.activate(&admin, user.id()).await.unwrap();
        assert!(service.login("ada", "correct-horse").await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_cannot_suspend_self() {
        let service = create_service(&Stores::in_memory());
        let user = service.register(register_request("ada")).await.unwrap();

        let result = service.suspend(user.id(), user.id()).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_profile_rank_and_categories() {
        let stores = Stores::in_memory();
        let service = create_service(&stores);

        let mut leader = service.register(register_request("leader")).await.unwrap();
        let mut tied = service.register(register_request("tied")).await.unwrap();
        let newbie = service.register(register_request("newbie")).await.unwrap();

        let challenge = stores
            .challenges
            .create(Challenge::new("Warmup", "desc", Category::Web, Difficulty::Easy, 100, "flag{x}"))
            .await
            .unwrap();

        leader.credit_solve(300, Utc::now());
        stores.users.update(leader).await.unwrap();
        tied.credit_solve(100, Utc::now());
        stores.users.update(tied.clone()).await.unwrap();

        let profile = service.profile(tied.id()).await.unwrap();
        assert_eq!(profile.rank, 2);

        stores
            .submissions
            .create(Submission::correct(
                tied.id().clone(),
                challenge.id().clone(),
                100,
                Utc::now(),
            ))
            .await
            .unwrap();
        let profile = service.profile(tied.id()).await.unwrap();
        let web = profile
            .categories
            .iter()
            .find(|c| c.category == Category::Web)
            .unwrap();
        assert_eq!(web.solved, 1);
        assert_eq!(profile.categories.len(), Category::ALL.len());

        assert_eq!(service.profile(newbie.id()).await.unwrap().rank, 3);
    }

    #[tokio::test]
    async fn test_update_profile_validates_names() {
        let service = create_service(&Stores::in_memory());
        let user = service.register(register_request("ada")).await.unwrap();

        let result = service
            .update_profile(
                user.id(),
                UpdateProfileRequest {
                    first_name: Some("Ada1".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_err());

        let updated = service
            .update_profile(
                user.id(),
                UpdateProfileRequest {
                    last_name: Some("Byron".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.last_name(), "Byron");
    }

    #[tokio::test]
    async fn test_recalculate_scores_subtracts_hints_and_skips_admins() {
        let stores = Stores::in_memory();
        let service = create_service(&stores);

        let player = service.register(register_request("ada")).await.unwrap();
        let admin = stores
            .users
            .create(User::new("root", "root@ctf.local", "x").with_role(UserRole::Admin))
            .await
            .unwrap();

        let challenge = Challenge::new("C", "d", Category::Crypto, Difficulty::Hard, 250, "f");
        let hint = Hint::new(challenge.id().clone(), "look closer", 50, 1);
        let earlier = Utc::now() - Duration::minutes(5);

        for user in [player.id(), admin.id()] {
            stores
                .submissions
                .create(Submission::incorrect(user.clone(), challenge.id().clone(), earlier))
                .await
                .unwrap();
            stores
                .submissions
                .create(Submission::correct(user.clone(), challenge.id().clone(), 250, earlier))
                .await
                .unwrap();
        }
        stores
            .hint_unlocks
            .create(HintUnlock::new(player.id().clone(), &hint, 50))
            .await
            .unwrap();

        assert_eq!(service.recalculate_scores().await.unwrap(), 1);

        let player = service.get(player.id()).await.unwrap();
        assert_eq!(player.profile().total_score, 200);
        assert_eq!(player.profile().challenges_solved, 1);
        assert_eq!(player.profile().last_submission, Some(earlier));

        let admin = service.get(admin.id()).await.unwrap();
        assert_eq!(admin.profile().total_score, 0);

        assert_eq!(service.recalculate_scores().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_only_on_empty_platform() {
        let service = create_service(&Stores::in_memory());
        let request = BootstrapAdminRequest {
            username: "admin".to_string(),
            email: "admin@ctf.local".to_string(),
            password: None,
        };

        let created = service.bootstrap_admin(request.clone()).await.unwrap().unwrap();
        assert!(created.user.is_admin());
        let password = created.generated_password.unwrap();
        assert_eq!(password.len(), GENERATED_PASSWORD_LENGTH);
        assert!(service.login("admin", &password).await.is_ok());

        assert!(service.bootstrap_admin(request).await.unwrap().is_none());
    }
}
