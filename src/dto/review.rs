use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::{ResultEntity, SubmissionEntity, SubmissionKind};

/// One entry of a grader worklist: a submission plus its grade, if any.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewItem {
    /// Identifier of the underlying submission.
    pub submission_id: Uuid,
    /// Identifier of the submitting team.
    pub team_id: String,
    /// Answer or bug note.
    pub kind: SubmissionKind,
    /// Question the answer targets; `None` for bug notes.
    pub question_id: Option<u32>,
    /// Raw submitted content.
    pub content: String,
    /// Submission timestamp (Rfc3339).
    pub created_at: String,
    /// Grade attached to the submission; `None` while pending.
    pub grade: Option<GradeSummary>,
}

/// Point fields of an existing result row.
#[derive(Debug, Serialize, ToSchema)]
pub struct GradeSummary {
    /// Points awarded for the answer itself.
    pub base_points: f64,
    /// First-to-answer bonus.
    pub bonus_for_first: f64,
    /// Unique-answer bonus.
    pub bonus_for_unique: f64,
    /// Other manual bonus.
    pub other_bonus: f64,
    /// Grader comment, if any.
    pub comment: Option<String>,
    /// Number of times the row was written.
    pub times_reviewed: i64,
}

impl ReviewItem {
    /// Pair a submission with its grade (absent while pending).
    pub fn new(submission: SubmissionEntity, result: Option<&ResultEntity>) -> Self {
        Self {
            submission_id: submission.id,
            team_id: submission.team_id,
            kind: submission.kind,
            question_id: submission.question_id,
            content: submission.content,
            created_at: submission.created_at,
            grade: result.map(GradeSummary::from),
        }
    }
}

impl From<&ResultEntity> for GradeSummary {
    fn from(result: &ResultEntity) -> Self {
        Self {
            base_points: result.base_points,
            bonus_for_first: result.bonus_for_first,
            bonus_for_unique: result.bonus_for_unique,
            other_bonus: result.other_bonus,
            comment: result.comment.clone(),
            times_reviewed: result.times_reviewed,
        }
    }
}

/// Payload for the full manual grading path (upsert with bonuses).
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GradeRequest {
    /// Identifier of the graded team.
    #[validate(length(min = 1, message = "team_id must not be empty"))]
    pub team_id: String,
    /// Submission being graded.
    pub submission_id: Uuid,
    /// Points for the answer itself; absent means zero.
    pub base_points: Option<f64>,
    /// First-to-answer bonus; absent means zero.
    pub bonus_for_first: Option<f64>,
    /// Unique-answer bonus; absent means zero.
    pub bonus_for_unique: Option<f64>,
    /// Other bonus; absent means zero.
    pub other_bonus: Option<f64>,
    /// Grader comment.
    pub comment: Option<String>,
}

/// Payload for the idempotent answer-marking path.
///
/// Points arrive as a raw string on purpose: the original organizer tooling
/// posts them verbatim, and a non-numeric value must be rejected as a parse
/// failure rather than a deserialization error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkAnswerRequest {
    /// Point value as typed by the grader.
    pub points: String,
}

/// Outcome of a grading call.
#[derive(Debug, Serialize, ToSchema)]
pub struct GradeResponse {
    /// Whether a result row was written.
    pub applied: bool,
    /// Human-readable reason ("Answer already marked", "Answer not found", ...).
    pub message: String,
}
