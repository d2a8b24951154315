use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::review::{GradeRequest, GradeResponse, MarkAnswerRequest, ReviewItem},
    error::AppError,
    services::review_service,
    state::SharedState,
};

/// Routes backing the grader views and grading actions.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/review/pending", get(pending_submissions))
        .route("/review/reviewed", get(reviewed_submissions))
        .route("/review/grades", post(apply_grade))
        .route(
            "/review/answers/{team_id}/{submission_id}/{question_id}",
            post(mark_answer),
        )
}

/// Submissions still waiting for a manual grade.
#[utoipa::path(
    get,
    path = "/review/pending",
    tag = "review",
    responses((status = 200, description = "Pending worklist", body = [ReviewItem]))
)]
pub async fn pending_submissions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ReviewItem>>, AppError> {
    let items = review_service::pending_submissions(&state).await?;
    Ok(Json(items))
}

/// Submissions that already carry a result row.
#[utoipa::path(
    get,
    path = "/review/reviewed",
    tag = "review",
    responses((status = 200, description = "Reviewed worklist", body = [ReviewItem]))
)]
pub async fn reviewed_submissions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ReviewItem>>, AppError> {
    let items = review_service::reviewed_submissions(&state).await?;
    Ok(Json(items))
}

/// Apply (or re-apply) a manual grade with all bonus components.
#[utoipa::path(
    post,
    path = "/review/grades",
    tag = "review",
    request_body = GradeRequest,
    responses(
        (status = 200, description = "Grade applied", body = GradeResponse),
        (status = 422, description = "Target submission not found", body = GradeResponse)
    )
)]
pub async fn apply_grade(
    State(state): State<SharedState>,
    Json(payload): Json<GradeRequest>,
) -> Result<(StatusCode, Json<GradeResponse>), AppError> {
    payload.validate()?;
    let response = review_service::apply_grade(&state, payload).await?;
    Ok((grade_status(&response), Json(response)))
}

/// Mark an open answer with base points, once.
#[utoipa::path(
    post,
    path = "/review/answers/{team_id}/{submission_id}/{question_id}",
    tag = "review",
    params(
        ("team_id" = String, Path, description = "Identifier of the graded team"),
        ("submission_id" = Uuid, Path, description = "Identifier of the answer submission"),
        ("question_id" = u32, Path, description = "Identifier of the answered question")
    ),
    request_body = MarkAnswerRequest,
    responses(
        (status = 200, description = "Answer marked", body = GradeResponse),
        (status = 400, description = "Point value could not be parsed"),
        (status = 422, description = "Answer missing or already marked", body = GradeResponse)
    )
)]
pub async fn mark_answer(
    State(state): State<SharedState>,
    Path((team_id, submission_id, question_id)): Path<(String, Uuid, u32)>,
    Json(payload): Json<MarkAnswerRequest>,
) -> Result<(StatusCode, Json<GradeResponse>), AppError> {
    let response =
        review_service::mark_answer(&state, &team_id, submission_id, question_id, &payload.points)
            .await?;
    Ok((grade_status(&response), Json(response)))
}

fn grade_status(response: &GradeResponse) -> StatusCode {
    if response.applied {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}
