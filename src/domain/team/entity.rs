//! Team entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::entity_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;

entity_id!(
    /// Team identifier
    TeamId
);

/// Smallest team allowed to take part in group competition
pub const MIN_COMPETING_MEMBERS: usize = 2;

pub const DEFAULT_MAX_MEMBERS: u32 = 5;

/// A team led by a captain, scored by group competition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: String,
    description: String,
    captain_id: UserId,
    total_score: u64,
    challenges_solved: u32,
    last_submission: Option<DateTime<Utc>>,
    is_active: bool,
    is_open: bool,
    max_members: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Team {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        captain_id: UserId,
        max_members: u32,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: TeamId::generate(),
            name: name.into(),
            description: description.into(),
            captain_id,
            total_score: 0,
            challenges_solved: 0,
            last_submission: None,
            is_active: true,
            is_open: true,
            max_members,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn captain_id(&self) -> &UserId {
        &self.captain_id
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    pub fn challenges_solved(&self) -> u32 {
        self.challenges_solved
    }

    pub fn last_submission(&self) -> Option<DateTime<Utc>> {
        self.last_submission
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn max_members(&self) -> u32 {
        self.max_members
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_captain(&self, user_id: &UserId) -> bool {
        &self.captain_id == user_id
    }

    pub fn is_full(&self, member_count: usize) -> bool {
        member_count >= self.max_members as usize
    }

    pub fn can_compete(&self, member_count: usize) -> bool {
        member_count >= MIN_COMPETING_MEMBERS
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    pub fn set_open(&mut self, is_open: bool) {
        self.is_open = is_open;
        self.touch();
    }

    pub fn set_captain(&mut self, captain_id: UserId) {
        self.captain_id = captain_id;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    /// Credits a group challenge solve
    pub fn credit_solve(&mut self, points: u64, at: DateTime<Utc>) {
        self.total_score += points;
        self.challenges_solved += 1;
        self.last_submission = Some(at);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Team {
    type Key = TeamId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team() -> Team {
        Team::new("Null Pointers", "", UserId::generate(), DEFAULT_MAX_MEMBERS)
    }

    #[test]
    fn test_new_team() {
        let team = team();

        assert!(team.is_active());
        assert!(team.is_open());
        assert_eq!(team.total_score(), 0);
        assert_eq!(team.max_members(), 5);
    }

    #[test]
    fn test_size_rules() {
        let team = team();

        assert!(!team.can_compete(1));
        assert!(team.can_compete(2));
        assert!(!team.is_full(4));
        assert!(team.is_full(5));
    }

    #[test]
    fn test_credit_solve() {
        let mut team = team();
        let at = Utc::now();

        team.credit_solve(120, at);

        assert_eq!(team.total_score(), 120);
        assert_eq!(team.challenges_solved(), 1);
        assert_eq!(team.last_submission(), Some(at));
    }

    #[test]
    fn test_captain() {
        let captain = UserId::generate();
        let mut team = Team::new("Owls", "", captain.clone(), 5);
        assert!(team.is_captain(&captain));

        let other = UserId::generate();
        team.set_captain(other.clone());
        assert!(team.is_captain(&other));
        assert!(!team.is_captain(&captain));
    }
}
