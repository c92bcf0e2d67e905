//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::entity_id;
use crate::domain::storage::StorageEntity;

entity_id!(
    /// User identifier
    UserId
);

/// Role of a user on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Competes in challenges and teams
    #[default]
    Player,
    /// Manages challenges and events; cannot score
    Admin,
}

/// Status of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
}

impl UserStatus {
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    Undergraduate,
    Postgraduate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    CyberSecurity,
    SoftwareEngineering,
    ComputerScience,
    It,
}

/// Optional demographic details a player may fill in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub sex: Option<Sex>,
    pub education_level: Option<EducationLevel>,
    pub department: Option<Department>,
}

/// Individual competition standing of a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub total_score: u64,
    pub challenges_solved: u32,
    pub last_submission: Option<DateTime<Utc>>,
}

/// Platform user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    role: UserRole,
    status: UserStatus,
    #[serde(default)]
    details: PersonalDetails,
    #[serde(default)]
    profile: Profile,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: UserId::generate(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            first_name: String::new(),
            last_name: String::new(),
            role: UserRole::Player,
            status: UserStatus::Active,
            details: PersonalDetails::default(),
            profile: Profile::default(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    pub fn with_names(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_details(mut self, details: PersonalDetails) -> Self {
        self.details = details;
        self
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn details(&self) -> &PersonalDetails {
        &self.details
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_active(&self) -> bool {
        self.status.can_login()
    }

    /// Admins manage the competition and never appear on scoreboards
    pub fn can_score(&self) -> bool {
        self.role == UserRole::Player
    }

    pub fn set_names(&mut self, first_name: impl Into<String>, last_name: impl Into<String>) {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self.touch();
    }

    pub fn set_details(&mut self, details: PersonalDetails) {
        self.details = details;
        self.touch();
    }

    pub fn suspend(&mut self) {
        self.status = UserStatus::Suspended;
        self.touch();
    }

    pub fn activate(&mut self) {
        self.status = UserStatus::Active;
        self.touch();
    }

    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
    }

    /// Credits a solved challenge to the individual profile
    pub fn credit_solve(&mut self, points: u32, at: DateTime<Utc>) {
        self.profile.total_score += u64::from(points);
        self.profile.challenges_solved += 1;
        self.profile.last_submission = Some(at);
        self.touch();
    }

    /// Deducts points without going below zero, returning what was actually taken
    pub fn deduct_points(&mut self, points: u32) -> u32 {
        let taken = self.profile.total_score.min(u64::from(points));
        self.profile.total_score -= taken;
        self.touch();
        taken as u32
    }

    pub fn replace_profile(&mut self, profile: Profile) {
        self.profile = profile;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for User {
    type Key = UserId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_active_player() {
        let user = User::new("alice", "alice@ctf.local", "hash");

        assert_eq!(user.role(), UserRole::Player);
        assert!(user.is_active());
        assert!(user.can_score());
        assert_eq!(user.profile(), &Profile::default());
    }

    #[test]
    fn test_admin_cannot_score() {
        let user = User::new("root", "root@ctf.local", "hash").with_role(UserRole::Admin);

        assert!(user.is_admin());
        assert!(!user.can_score());
    }

    #[test]
    fn test_credit_solve_updates_profile() {
        let mut user = User::new("alice", "alice@ctf.local", "hash");
        let at = Utc::now();

        user.credit_solve(150, at);
        user.credit_solve(50, at);

        assert_eq!(user.profile().total_score, 200);
        assert_eq!(user.profile().challenges_solved, 2);
        assert_eq!(user.profile().last_submission, Some(at));
    }

    #[test]
    fn test_deduct_points_floors_at_zero() {
        let mut user = User::new("alice", "alice@ctf.local", "hash");
        user.credit_solve(30, Utc::now());

        assert_eq!(user.deduct_points(20), 20);
        assert_eq!(user.deduct_points(20), 10);
        assert_eq!(user.profile().total_score, 0);
    }

    #[test]
    fn test_suspend_and_activate() {
        let mut user = User::new("alice", "alice@ctf.local", "hash");

        user.suspend();
        assert!(!user.is_active());

        user.activate();
        assert!(user.is_active());
    }

    #[test]
    fn test_storage_round_trip_keeps_password_hash() {
        let user = User::new("alice", "alice@ctf.local", "$argon2id$hash")
            .with_names("Alice", "Smith");
        let json = serde_json::to_value(&user).unwrap();
        let back: User = serde_json::from_value(json).unwrap();

        assert_eq!(back.password_hash(), "$argon2id$hash");
        assert_eq!(back.first_name(), "Alice");
        assert_eq!(back.id(), user.id());
    }
}
