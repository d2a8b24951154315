//! Scoring engine: closed-answer auto-grading and the TTL-cached leaderboard.

use std::{
    cmp::Ordering,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use indexmap::IndexMap;

use crate::{
    catalog::{Question, TeamCatalog},
    dao::{models::NewGrade, storage::StorageResult, store::ResultStore},
};

/// One leaderboard line: team display name and aggregate points.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    /// Team display name.
    pub team: String,
    /// Aggregate points across all of the team's result rows.
    pub points: f64,
}

struct CachedBoard {
    rows: Vec<LeaderboardRow>,
    computed_at: Instant,
}

/// Owns the leaderboard cache and the auto-grading rule.
///
/// The cache is memoization with a TTL, not write-through: result writes do
/// not invalidate it early, readers within the refresh delay see the cached
/// value unchanged.
pub struct ScoringEngine {
    refresh_delay: Duration,
    cache: Mutex<Option<CachedBoard>>,
}

impl ScoringEngine {
    /// Engine whose leaderboard is recomputed at most once per `refresh_delay`.
    pub fn new(refresh_delay: Duration) -> Self {
        Self {
            refresh_delay,
            cache: Mutex::new(None),
        }
    }

    /// Grade an accepted closed answer and record the result immediately.
    ///
    /// Awards the question's configured points when the content matches the
    /// canonical answer, zero otherwise; bonuses are always zero at
    /// auto-grade time. Returns the points awarded.
    pub fn auto_grade(
        &self,
        question: &Question,
        team_id: &str,
        submission_id: uuid::Uuid,
        content: &str,
        results: &dyn ResultStore,
    ) -> StorageResult<f64> {
        let correct = question
            .answer
            .as_deref()
            .is_some_and(|canonical| answer_matches(canonical, content));
        let points = if correct { question.points } else { 0.0 };
        results.upsert_result(&NewGrade::auto(team_id, submission_id, question.id, points))?;
        Ok(points)
    }

    /// Teams ranked by aggregate points, served from cache within the
    /// refresh delay.
    ///
    /// Every registered team appears, zero-scored teams included. Ties keep
    /// catalog order (stable sort over the insertion-ordered aggregate map).
    pub fn leaderboard(
        &self,
        teams: &TeamCatalog,
        results: &dyn ResultStore,
    ) -> StorageResult<Vec<LeaderboardRow>> {
        let mut guard = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = guard.as_ref() {
            if cached.computed_at.elapsed() <= self.refresh_delay {
                return Ok(cached.rows.clone());
            }
        }

        let totals = results.aggregate_points_by_team()?;
        let mut board: IndexMap<String, f64> = IndexMap::new();
        for team in teams.all() {
            let points = totals.get(&team.id).copied().unwrap_or(0.0);
            board.insert(team.name, points);
        }
        board.sort_by(|_, a, _, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

        let rows: Vec<LeaderboardRow> = board
            .into_iter()
            .map(|(team, points)| LeaderboardRow { team, points })
            .collect();
        *guard = Some(CachedBoard {
            rows: rows.clone(),
            computed_at: Instant::now(),
        });
        Ok(rows)
    }

    /// Drop the cached leaderboard so the next read recomputes.
    pub fn invalidate(&self) {
        let mut guard = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }
}

/// Token-set comparison used to grade closed answers.
///
/// Both strings are lower-cased and split on single spaces; the submission
/// matches when the token lists have equal length and every canonical token
/// appears among the submitted tokens.
pub fn answer_matches(canonical: &str, submitted: &str) -> bool {
    let submitted_tokens: Vec<String> = submitted
        .trim()
        .to_lowercase()
        .split(' ')
        .map(ToOwned::to_owned)
        .collect();
    let canonical_lower = canonical.to_lowercase();
    let canonical_tokens: Vec<&str> = canonical_lower.split(' ').collect();

    if canonical_tokens.len() != submitted_tokens.len() {
        return false;
    }
    canonical_tokens
        .iter()
        .all(|token| submitted_tokens.iter().any(|sub| sub == token.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{QuestionKind, Team},
        dao::sqlite::SqliteResultStore,
        dao::store::ResultStore,
    };
    use uuid::Uuid;

    fn closed_question(canonical: &str, points: f64) -> Question {
        Question {
            id: 4,
            kind: QuestionKind::Closed,
            answer: Some(canonical.into()),
            points,
        }
    }

    #[test]
    fn case_and_surrounding_whitespace_are_ignored() {
        assert!(answer_matches("abc", "abc"));
        assert!(answer_matches("abc", "ABC"));
        assert!(answer_matches("abc", "  abc  "));
    }

    #[test]
    fn near_misses_do_not_match() {
        assert!(!answer_matches("abc", "abcd"));
        assert!(!answer_matches("abc", "ab"));
        // Token-count mismatch.
        assert!(!answer_matches("abc", "abc def"));
    }

    #[test]
    fn multi_token_answers_match_in_any_order() {
        assert!(answer_matches("foo bar", "bar foo"));
        assert!(answer_matches("foo bar", "Foo Bar"));
        assert!(!answer_matches("foo bar", "foo"));
        assert!(!answer_matches("foo bar", "foo baz"));
    }

    #[test]
    fn auto_grade_awards_configured_points_for_correct_answers() {
        let engine = ScoringEngine::new(Duration::ZERO);
        let results = SqliteResultStore::in_memory().unwrap();
        let question = closed_question("abc", 10.0);

        let points = engine
            .auto_grade(&question, "A1", Uuid::new_v4(), "  ABC ", &results)
            .unwrap();
        assert_eq!(points, 10.0);

        let rows = results.all_reviewed().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].base_points, 10.0);
        assert_eq!(rows[0].bonus_for_first, 0.0);
        assert_eq!(rows[0].bonus_for_unique, 0.0);
        assert_eq!(rows[0].other_bonus, 0.0);
    }

    #[test]
    fn auto_grade_records_zero_for_incorrect_answers() {
        let engine = ScoringEngine::new(Duration::ZERO);
        let results = SqliteResultStore::in_memory().unwrap();
        let question = closed_question("abc", 10.0);

        let points = engine
            .auto_grade(&question, "A1", Uuid::new_v4(), "abcd", &results)
            .unwrap();
        assert_eq!(points, 0.0);
        assert_eq!(results.all_reviewed().unwrap()[0].base_points, 0.0);
    }

    fn two_teams() -> TeamCatalog {
        TeamCatalog::fixed(vec![
            Team {
                id: "A1".into(),
                name: "alpha".into(),
            },
            Team {
                id: "B2".into(),
                name: "bravo".into(),
            },
        ])
    }

    #[test]
    fn leaderboard_ranks_by_points_with_zero_scored_teams_included() {
        let engine = ScoringEngine::new(Duration::ZERO);
        let teams = two_teams();
        let results = SqliteResultStore::in_memory().unwrap();
        results
            .upsert_result(&NewGrade::auto("B2", Uuid::new_v4(), 4, 10.0))
            .unwrap();

        let rows = engine.leaderboard(&teams, &results).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].team, "bravo");
        assert_eq!(rows[0].points, 10.0);
        assert_eq!(rows[1].team, "alpha");
        assert_eq!(rows[1].points, 0.0);
    }

    #[test]
    fn tied_teams_keep_catalog_order() {
        let engine = ScoringEngine::new(Duration::ZERO);
        let teams = two_teams();
        let results = SqliteResultStore::in_memory().unwrap();

        let rows = engine.leaderboard(&teams, &results).unwrap();
        assert_eq!(rows[0].team, "alpha");
        assert_eq!(rows[1].team, "bravo");
    }

    #[test]
    fn cached_board_is_served_unchanged_within_the_refresh_delay() {
        let engine = ScoringEngine::new(Duration::from_secs(3600));
        let teams = two_teams();
        let results = SqliteResultStore::in_memory().unwrap();

        let before = engine.leaderboard(&teams, &results).unwrap();
        results
            .upsert_result(&NewGrade::auto("A1", Uuid::new_v4(), 4, 10.0))
            .unwrap();
        let cached = engine.leaderboard(&teams, &results).unwrap();
        assert_eq!(before, cached);

        engine.invalidate();
        let fresh = engine.leaderboard(&teams, &results).unwrap();
        assert_eq!(fresh[0].team, "alpha");
        assert_eq!(fresh[0].points, 10.0);
    }

    #[test]
    fn expired_cache_is_recomputed() {
        let engine = ScoringEngine::new(Duration::ZERO);
        let teams = two_teams();
        let results = SqliteResultStore::in_memory().unwrap();

        engine.leaderboard(&teams, &results).unwrap();
        results
            .upsert_result(&NewGrade::auto("B2", Uuid::new_v4(), 4, 5.0))
            .unwrap();
        std::thread::sleep(Duration::from_millis(5));
        let rows = engine.leaderboard(&teams, &results).unwrap();
        assert_eq!(rows[0].team, "bravo");
        assert_eq!(rows[0].points, 5.0);
    }
}
