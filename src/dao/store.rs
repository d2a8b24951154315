use uuid::Uuid;

use crate::dao::{
    models::{NewGrade, ResultEntity, SubmissionEntity},
    storage::StorageResult,
};
use std::collections::HashMap;

/// Abstraction over the append-only store of raw answers and bug notes.
///
/// Calls are blocking: the backing medium is local and fast, so short
/// synchronous calls under the backend's own lock are acceptable here.
pub trait SubmissionStore: Send + Sync {
    /// Append an answer row and mirror it to the flat-file dump.
    ///
    /// `open_question` only selects which dump directory receives the
    /// companion file; the stored row is identical either way.
    fn record_answer(
        &self,
        team_id: &str,
        question_id: u32,
        content: &str,
        open_question: bool,
    ) -> StorageResult<SubmissionEntity>;

    /// Append a bug note row and mirror it to the flat-file dump.
    fn record_bug(&self, team_id: &str, content: &str) -> StorageResult<SubmissionEntity>;

    /// Every answer row, in storage insertion order.
    fn all_answers(&self) -> StorageResult<Vec<SubmissionEntity>>;

    /// Every bug row, in storage insertion order.
    fn all_bugs(&self) -> StorageResult<Vec<SubmissionEntity>>;

    /// Whether an answer row already exists for this (team, question).
    fn has_existing(&self, team_id: &str, question_id: u32) -> StorageResult<bool>;

    /// Distinct (team, question) pairs with at least one answer row.
    ///
    /// Bulk form of [`Self::has_existing`] used to rebuild the in-memory
    /// dedup table at startup.
    fn answered_pairs(&self) -> StorageResult<Vec<(String, u32)>>;

    /// Look up a single answer row by team and submission identifier.
    fn find_answer(
        &self,
        team_id: &str,
        submission_id: Uuid,
    ) -> StorageResult<Option<SubmissionEntity>>;

    /// Look up any submission row (answer or bug) by team and identifier.
    fn find_submission(
        &self,
        team_id: &str,
        submission_id: Uuid,
    ) -> StorageResult<Option<SubmissionEntity>>;

    /// Cheap connectivity probe for health reporting.
    fn ping(&self) -> StorageResult<()>;
}

/// Abstraction over the store of graded results.
pub trait ResultStore: Send + Sync {
    /// Insert a result row for (team, submission), or update its point
    /// fields and comment and increment the review counter if one exists.
    ///
    /// The write is atomic per (team, submission) key.
    fn upsert_result(&self, grade: &NewGrade) -> StorageResult<()>;

    /// Whether a result row exists for this (team, submission).
    fn exists(&self, team_id: &str, submission_id: Uuid) -> StorageResult<bool>;

    /// Every result row with a positive review counter, i.e. every row.
    fn all_reviewed(&self) -> StorageResult<Vec<ResultEntity>>;

    /// Sum of base + all bonus points grouped by team identifier.
    fn aggregate_points_by_team(&self) -> StorageResult<HashMap<String, f64>>;

    /// Cheap connectivity probe for health reporting.
    fn ping(&self) -> StorageResult<()>;
}
