//! Group scoring and event aggregation

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::challenge::{GroupChallengeId, GroupSubmission};
use crate::domain::leaderboard::Standing;
use crate::domain::team::TeamId;

/// Points for a group solve: `floor(points × multiplier)`
pub fn calculate_points(points: u32, multiplier: f64) -> u64 {
    (f64::from(points) * multiplier).floor().max(0.0) as u64
}

/// Builds per-team standings from the submissions of one event.
///
/// Score is the sum of awarded points and solves count distinct challenges. The
/// tie-breaking timestamp is the team's latest submission, correct or not.
/// Teams with only incorrect attempts still appear.
pub fn event_standings(submissions: &[GroupSubmission]) -> Vec<Standing<TeamId>> {
    #[derive(Default)]
    struct Tally {
        score: u64,
        solved: HashSet<GroupChallengeId>,
        last_submission: Option<DateTime<Utc>>,
    }

    let mut tallies: HashMap<TeamId, Tally> = HashMap::new();

    for submission in submissions {
        let tally = tallies.entry(submission.team_id().clone()).or_default();
        tally.last_submission = tally.last_submission.max(Some(submission.submitted_at()));

        if submission.is_correct() {
            tally.score += submission.points_awarded();
            tally.solved.insert(submission.challenge_id().clone());
        }
    }

    tallies
        .into_iter()
        .map(|(team_id, tally)| Standing {
            competitor: team_id,
            score: tally.score,
            challenges_solved: tally.solved.len() as u32,
            last_submission: tally.last_submission,
        })
        .collect()
}

/// Solve statistics of a single group challenge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeStats {
    pub total_teams: usize,
    pub solved_teams: usize,
    pub total_attempts: usize,
    pub solve_rate: f64,
}

pub fn challenge_stats(
    challenge_id: &GroupChallengeId,
    submissions: &[GroupSubmission],
) -> ChallengeStats {
    let relevant: Vec<&GroupSubmission> = submissions
        .iter()
        .filter(|s| s.challenge_id() == challenge_id)
        .collect();

    let teams: HashSet<&TeamId> = relevant.iter().map(|s| s.team_id()).collect();
    let solved: HashSet<&TeamId> = relevant
        .iter()
        .filter(|s| s.is_correct())
        .map(|s| s.team_id())
        .collect();

    let solve_rate = if teams.is_empty() {
        0.0
    } else {
        solved.len() as f64 / teams.len() as f64 * 100.0
    };

    ChallengeStats {
        total_teams: teams.len(),
        solved_teams: solved.len(),
        total_attempts: relevant.len(),
        solve_rate,
    }
}

/// A team's attempts at one challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttemptSummary {
    pub attempts: u32,
    pub solved: bool,
}

pub fn attempt_summary(
    challenge_id: &GroupChallengeId,
    team_id: &TeamId,
    submissions: &[GroupSubmission],
) -> AttemptSummary {
    submissions
        .iter()
        .filter(|s| s.challenge_id() == challenge_id && s.team_id() == team_id)
        .fold(AttemptSummary::default(), |acc, s| AttemptSummary {
            attempts: acc.attempts + 1,
            solved: acc.solved || s.is_correct(),
        })
}
