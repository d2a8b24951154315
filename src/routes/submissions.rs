use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use validator::Validate;

use crate::{
    dto::submission::{AnswerRequest, BugRequest, SubmissionReceipt},
    error::AppError,
    services::submission_service::{self, Submission},
    state::{AdmissionOutcome, SharedState},
};

/// Routes accepting answer and bug note submissions.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/submissions/answers", post(submit_answer))
        .route("/submissions/bugs", post(submit_bug))
}

/// Submit an answer to a question.
#[utoipa::path(
    post,
    path = "/submissions/answers",
    tag = "submissions",
    request_body = AnswerRequest,
    responses(
        (status = 201, description = "Answer recorded", body = SubmissionReceipt),
        (status = 400, description = "Claimed question type does not match"),
        (status = 401, description = "Unknown team"),
        (status = 404, description = "Unknown question"),
        (status = 409, description = "Question already answered by this team")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Json(payload): Json<AnswerRequest>,
) -> Result<(StatusCode, Json<SubmissionReceipt>), AppError> {
    payload.validate()?;
    let team_id = payload.team_id.clone();
    let question_id = payload.question_id;

    match submission_service::submit_answer(&state, payload).await? {
        Submission::Accepted(receipt) => Ok((StatusCode::CREATED, Json(receipt))),
        Submission::Rejected(outcome) => Err(rejection(outcome, &team_id, Some(question_id))),
    }
}

/// Submit a bug report note.
#[utoipa::path(
    post,
    path = "/submissions/bugs",
    tag = "submissions",
    request_body = BugRequest,
    responses(
        (status = 201, description = "Bug note recorded", body = SubmissionReceipt),
        (status = 401, description = "Unknown team")
    )
)]
pub async fn submit_bug(
    State(state): State<SharedState>,
    Json(payload): Json<BugRequest>,
) -> Result<(StatusCode, Json<SubmissionReceipt>), AppError> {
    payload.validate()?;
    let team_id = payload.team_id.clone();

    match submission_service::submit_bug(&state, payload).await? {
        Submission::Accepted(receipt) => Ok((StatusCode::CREATED, Json(receipt))),
        Submission::Rejected(outcome) => Err(rejection(outcome, &team_id, None)),
    }
}

/// Translate an admission rejection into the HTTP error the shell returns.
fn rejection(outcome: AdmissionOutcome, team_id: &str, question_id: Option<u32>) -> AppError {
    let question_id = question_id.unwrap_or_default();
    match outcome {
        AdmissionOutcome::UnknownTeam => {
            AppError::Unauthorized(format!("Team with id '{team_id}' was not found."))
        }
        AdmissionOutcome::UnknownQuestion => {
            AppError::NotFound(format!("No question with id '{question_id}'."))
        }
        AdmissionOutcome::TypeMismatch => AppError::BadRequest(format!(
            "Question with id '{question_id}' is not of the claimed type."
        )),
        AdmissionOutcome::AlreadyAnswered => AppError::Conflict(format!(
            "Team with id '{team_id}' already answered question with id '{question_id}'."
        )),
        // Not a rejection; kept total so the compiler enforces the mapping.
        AdmissionOutcome::Admitted => {
            AppError::BadRequest("submission was already admitted".into())
        }
    }
}
