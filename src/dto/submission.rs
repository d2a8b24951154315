use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::catalog::QuestionKind;

/// Payload used to submit an answer to a question.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AnswerRequest {
    /// Identifier of the submitting team.
    #[validate(length(min = 1, message = "team_id must not be empty"))]
    pub team_id: String,
    /// Identifier of the question being answered.
    pub question_id: u32,
    /// Claimed question kind; must match the catalog entry.
    pub question_type: QuestionKind,
    /// Free-text answer content.
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
}

/// Payload used to submit a bug report note.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct BugRequest {
    /// Identifier of the submitting team.
    #[validate(length(min = 1, message = "team_id must not be empty"))]
    pub team_id: String,
    /// Free-text bug description.
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
}

/// Receipt returned once a submission has been recorded.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionReceipt {
    /// Generated identifier of the stored submission.
    pub submission_id: Uuid,
    /// Creation timestamp (Rfc3339).
    pub created_at: String,
    /// Human-readable confirmation for form-driven clients.
    pub message: String,
}
