use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Discriminates the two flavours of raw submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    /// Answer to a quiz question (open or closed).
    Answer,
    /// Free-form bug report note.
    Bug,
}

impl SubmissionKind {
    /// Stable column value used by the storage layer.
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionKind::Answer => "answer",
            SubmissionKind::Bug => "bug",
        }
    }
}

/// Immutable record of a team's raw answer or bug note.
///
/// Created exactly once per accepted admission request, never mutated,
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionEntity {
    /// Generated unique identifier.
    pub id: Uuid,
    /// Answer or bug note.
    pub kind: SubmissionKind,
    /// Identifier of the submitting team.
    pub team_id: String,
    /// Question the answer targets; `None` for bug notes.
    pub question_id: Option<u32>,
    /// Raw free-text content as submitted.
    pub content: String,
    /// Creation timestamp (Rfc3339).
    pub created_at: String,
}

/// Mutable graded outcome linked to one submission.
///
/// At most one row exists per (team, submission) pair; repeated grading
/// updates the point fields and bumps `times_reviewed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultEntity {
    /// Identifier of the graded team.
    pub team_id: String,
    /// Submission this grade refers to.
    pub submission_id: Uuid,
    /// Question the submission answered, when it was an answer.
    pub question_id: Option<u32>,
    /// Points awarded for the answer itself.
    pub base_points: f64,
    /// Bonus for being first to answer (manual grading only).
    pub bonus_for_first: f64,
    /// Bonus for a unique answer (manual grading only).
    pub bonus_for_unique: f64,
    /// Any other manually awarded bonus.
    pub other_bonus: f64,
    /// Grader comment, if any.
    pub comment: Option<String>,
    /// Number of times this row was written (insert counts as 1).
    pub times_reviewed: i64,
    /// Creation timestamp (Rfc3339).
    pub created_at: String,
}

impl ResultEntity {
    /// Total points contributed by this row: base plus all bonuses.
    pub fn total_points(&self) -> f64 {
        self.base_points + self.bonus_for_first + self.bonus_for_unique + self.other_bonus
    }
}

/// Payload for a result upsert, shared by auto-grading and manual grading.
#[derive(Debug, Clone)]
pub struct NewGrade {
    /// Identifier of the graded team.
    pub team_id: String,
    /// Submission being graded.
    pub submission_id: Uuid,
    /// Question the submission answered, when resolvable.
    pub question_id: Option<u32>,
    /// Points awarded for the answer itself.
    pub base_points: f64,
    /// Bonus for being first to answer.
    pub bonus_for_first: f64,
    /// Bonus for a unique answer.
    pub bonus_for_unique: f64,
    /// Any other bonus.
    pub other_bonus: f64,
    /// Grader comment, if any.
    pub comment: Option<String>,
}

impl NewGrade {
    /// Grade written by the scoring engine when a closed answer is accepted:
    /// base points only, bonuses are assigned by manual grading later.
    pub fn auto(team_id: &str, submission_id: Uuid, question_id: u32, points: f64) -> Self {
        Self {
            team_id: team_id.to_owned(),
            submission_id,
            question_id: Some(question_id),
            base_points: points,
            bonus_for_first: 0.0,
            bonus_for_unique: 0.0,
            other_bonus: 0.0,
            comment: None,
        }
    }
}
