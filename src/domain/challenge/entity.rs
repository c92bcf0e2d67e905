//! Challenge entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::flag::HashedFlag;
use crate::domain::id::entity_id;
use crate::domain::storage::StorageEntity;

entity_id!(
    /// Challenge identifier
    ChallengeId
);

/// Challenge difficulty, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Web,
    Crypto,
    Forensics,
    Pwn,
    Reverse,
    Misc,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Self::Web,
        Self::Crypto,
        Self::Forensics,
        Self::Pwn,
        Self::Reverse,
        Self::Misc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Crypto => "crypto",
            Self::Forensics => "forensics",
            Self::Pwn => "pwn",
            Self::Reverse => "reverse",
            Self::Misc => "misc",
        }
    }
}

/// Who a challenge is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    Individual,
    Team,
    #[default]
    Both,
}

pub const DEFAULT_MIN_TEAM_SIZE: u32 = 1;
pub const DEFAULT_MAX_TEAM_SIZE: u32 = 5;

/// Individual catalog challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    id: ChallengeId,
    title: String,
    description: String,
    difficulty: Difficulty,
    category: Category,
    flag: HashedFlag,
    points: u32,
    is_active: bool,
    challenge_type: ChallengeType,
    min_team_size: u32,
    max_team_size: u32,
    team_points_multiplier: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Challenge {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        difficulty: Difficulty,
        points: u32,
        flag: &str,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: ChallengeId::generate(),
            title: title.into(),
            description: description.into(),
            difficulty,
            category,
            flag: HashedFlag::from_plain(flag),
            points,
            is_active: true,
            challenge_type: ChallengeType::default(),
            min_team_size: DEFAULT_MIN_TEAM_SIZE,
            max_team_size: DEFAULT_MAX_TEAM_SIZE,
            team_points_multiplier: 1.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_type(mut self, challenge_type: ChallengeType) -> Self {
        self.challenge_type = challenge_type;
        self
    }

    pub fn with_team_size(mut self, min: u32, max: u32) -> Self {
        self.min_team_size = min;
        self.max_team_size = max;
        self
    }

    pub fn with_team_points_multiplier(mut self, multiplier: f64) -> Self {
        self.team_points_multiplier = multiplier;
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn id(&self) -> &ChallengeId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn challenge_type(&self) -> ChallengeType {
        self.challenge_type
    }

    pub fn min_team_size(&self) -> u32 {
        self.min_team_size
    }

    pub fn max_team_size(&self) -> u32 {
        self.max_team_size
    }

    pub fn team_points_multiplier(&self) -> f64 {
        self.team_points_multiplier
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn check_flag(&self, submitted: &str) -> bool {
        self.flag.matches(submitted)
    }

    /// Points a team earns for this challenge
    pub fn team_points(&self) -> u64 {
        (f64::from(self.points) * self.team_points_multiplier).floor() as u64
    }

    /// Catalog order: difficulty first, then points
    pub fn catalog_key(&self) -> (Difficulty, u32) {
        (self.difficulty, self.points)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.touch();
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
        self.touch();
    }

    pub fn set_points(&mut self, points: u32) {
        self.points = points;
        self.touch();
    }

    pub fn set_flag(&mut self, flag: &str) {
        self.flag = HashedFlag::from_plain(flag);
        self.touch();
    }

    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
        self.touch();
    }

    pub fn set_challenge_type(&mut self, challenge_type: ChallengeType) {
        self.challenge_type = challenge_type;
        self.touch();
    }

    pub fn set_team_size(&mut self, min: u32, max: u32) {
        self.min_team_size = min;
        self.max_team_size = max;
        self.touch();
    }

    pub fn set_team_points_multiplier(&mut self, multiplier: f64) {
        self.team_points_multiplier = multiplier;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Challenge {
    type Key = ChallengeId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Challenge {
        Challenge::new(
            "Baby SQLi",
            "Log in as admin",
            Category::Web,
            Difficulty::Easy,
            100,
            "CTF{or_1_eq_1}",
        )
    }

    #[test]
    fn test_defaults() {
        let challenge = sample();

        assert!(challenge.is_active());
        assert_eq!(challenge.challenge_type(), ChallengeType::Both);
        assert_eq!(challenge.min_team_size(), 1);
        assert_eq!(challenge.max_team_size(), 5);
        assert_eq!(challenge.team_points_multiplier(), 1.0);
    }

    #[test]
    fn test_flag_is_never_stored_in_plain_text() {
        let challenge = sample();
        let json = serde_json::to_string(&challenge).unwrap();

        assert!(!json.contains("CTF{or_1_eq_1}"));
        assert!(challenge.check_flag("CTF{or_1_eq_1}"));
        assert!(!challenge.check_flag("CTF{wrong}"));
    }

    #[test]
    fn test_team_points_floor() {
        let challenge = sample().with_team_points_multiplier(1.55);
        assert_eq!(challenge.team_points(), 155);

        let challenge = sample().with_team_points_multiplier(0.333);
        assert_eq!(challenge.team_points(), 33);
    }

    #[test]
    fn test_team_points_do_not_wrap_at_u32() {
        let challenge = Challenge::new("Big", "d", Category::Misc, Difficulty::Hard, u32::MAX, "f")
            .with_team_points_multiplier(3.0);
        assert_eq!(challenge.team_points(), u64::from(u32::MAX) * 3);
    }

    #[test]
    fn test_catalog_order() {
        let mut challenges = vec![
            sample().with_team_size(1, 5),
            Challenge::new("RSA", "d", Category::Crypto, Difficulty::Hard, 50, "f"),
            Challenge::new("Intro", "d", Category::Misc, Difficulty::Easy, 10, "f"),
            Challenge::new("Heap", "d", Category::Pwn, Difficulty::Medium, 300, "f"),
        ];
        challenges.sort_by_key(|c| c.catalog_key());

        let titles: Vec<&str> = challenges.iter().map(|c| c.title()).collect();
        assert_eq!(titles, vec!["Intro", "Baby SQLi", "Heap", "RSA"]);
    }
}
