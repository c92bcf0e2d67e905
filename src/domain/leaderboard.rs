//! Leaderboard ordering shared by individual, team and event boards

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A competitor's standing before ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing<T> {
    pub competitor: T,
    pub score: u64,
    pub challenges_solved: u32,
    pub last_submission: Option<DateTime<Utc>>,
}

/// A standing with its 1-based position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<T> {
    pub rank: usize,
    #[serde(flatten)]
    pub standing: Standing<T>,
}

/// Higher score first; on ties, whoever reached it earlier wins.
/// Competitors without any submission sort after those with one.
pub fn compare_standings<T>(a: &Standing<T>, b: &Standing<T>) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| match (a.last_submission, b.last_submission) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Sorts standings and assigns ranks, keeping at most `limit` entries
pub fn rank<T>(mut standings: Vec<Standing<T>>, limit: Option<usize>) -> Vec<Ranked<T>> {
    standings.sort_by(compare_standings);

    if let Some(limit) = limit {
        standings.truncate(limit);
    }

    standings
        .into_iter()
        .enumerate()
        .map(|(index, standing)| Ranked {
            rank: index + 1,
            standing,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn standing(name: &'static str, score: u64, minutes_ago: Option<i64>) -> Standing<&'static str> {
        Standing {
            competitor: name,
            score,
            challenges_solved: 1,
            last_submission: minutes_ago.map(|m| Utc::now() - Duration::minutes(m)),
        }
    }

    #[test]
    fn test_higher_score_first() {
        let ranked = rank(
            vec![standing("low", 100, Some(5)), standing("high", 300, Some(1))],
            None,
        );

        assert_eq!(ranked[0].standing.competitor, "high");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_tie_broken_by_earliest_submission() {
        let ranked = rank(
            vec![
                standing("late", 200, Some(1)),
                standing("none", 200, None),
                standing("early", 200, Some(30)),
            ],
            None,
        );

        let order: Vec<&str> = ranked.iter().map(|r| r.standing.competitor).collect();
        assert_eq!(order, vec!["early", "late", "none"]);
    }

    #[test]
    fn test_limit() {
        let ranked = rank(
            vec![
                standing("a", 3, Some(1)),
                standing("b", 2, Some(1)),
                standing("c", 1, Some(1)),
            ],
            Some(2),
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[1].standing.competitor, "b");
    }
}
