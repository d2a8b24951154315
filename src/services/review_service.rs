//! Grader-facing operations: the reconciliation worklists and manual grading.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{NewGrade, ResultEntity, SubmissionEntity},
    dto::review::{GradeRequest, GradeResponse, ReviewItem},
    error::ServiceError,
    state::SharedState,
};

/// Submissions awaiting manual review: bug notes plus answers to open
/// questions with no result row yet.
pub async fn pending_submissions(state: &SharedState) -> Result<Vec<ReviewItem>, ServiceError> {
    let (pending, _) = build_worklists(state)?;
    Ok(pending)
}

/// Submissions that already carry a result row, with their current grades.
pub async fn reviewed_submissions(state: &SharedState) -> Result<Vec<ReviewItem>, ServiceError> {
    let (_, reviewed) = build_worklists(state)?;
    Ok(reviewed)
}

/// Join the submission store against the result store without mutating
/// either. A submission counts as reviewed when a result row references its
/// identifier.
fn build_worklists(
    state: &SharedState,
) -> Result<(Vec<ReviewItem>, Vec<ReviewItem>), ServiceError> {
    let open_ids = state.questions().open_question_ids();

    let mut candidates: Vec<SubmissionEntity> = state.submissions().all_bugs()?;
    candidates.extend(
        state
            .submissions()
            .all_answers()?
            .into_iter()
            .filter(|answer| {
                answer
                    .question_id
                    .is_some_and(|id| open_ids.contains(&id))
            }),
    );

    let results = state.results().all_reviewed()?;
    let by_submission: HashMap<Uuid, &ResultEntity> = results
        .iter()
        .map(|result| (result.submission_id, result))
        .collect();

    let mut pending = Vec::new();
    let mut reviewed = Vec::new();
    for submission in candidates {
        match by_submission.get(&submission.id) {
            Some(result) => reviewed.push(ReviewItem::new(submission, Some(result))),
            None => pending.push(ReviewItem::new(submission, None)),
        }
    }
    Ok((pending, reviewed))
}

/// Full manual grading path: upsert the result row for (team, submission).
///
/// Re-grading the same pair updates the point fields and increments the
/// review counter. Absent point components are zero.
pub async fn apply_grade(
    state: &SharedState,
    request: GradeRequest,
) -> Result<GradeResponse, ServiceError> {
    let Some(submission) = state
        .submissions()
        .find_submission(&request.team_id, request.submission_id)?
    else {
        return Ok(GradeResponse {
            applied: false,
            message: "Answer not found".into(),
        });
    };

    state.results().upsert_result(&NewGrade {
        team_id: request.team_id.clone(),
        submission_id: request.submission_id,
        question_id: submission.question_id,
        base_points: request.base_points.unwrap_or(0.0),
        bonus_for_first: request.bonus_for_first.unwrap_or(0.0),
        bonus_for_unique: request.bonus_for_unique.unwrap_or(0.0),
        other_bonus: request.other_bonus.unwrap_or(0.0),
        comment: request.comment,
    })?;

    info!(
        team_id = %request.team_id,
        submission_id = %request.submission_id,
        "manual grade applied"
    );
    Ok(GradeResponse {
        applied: true,
        message: "Points updated".into(),
    })
}

/// Idempotent answer-marking path used by the organizer tooling.
///
/// The point value arrives as a raw string; a non-numeric value is an input
/// error, not a storage failure. Marking an answer that already has a result
/// row is a no-op reported as "Answer already marked".
pub async fn mark_answer(
    state: &SharedState,
    team_id: &str,
    submission_id: Uuid,
    question_id: u32,
    raw_points: &str,
) -> Result<GradeResponse, ServiceError> {
    let Ok(points) = raw_points.trim().parse::<f64>() else {
        return Err(ServiceError::InvalidInput(format!(
            "Could not parse '{raw_points}'"
        )));
    };

    let Some(answer) = state.submissions().find_answer(team_id, submission_id)? else {
        return Ok(GradeResponse {
            applied: false,
            message: "Answer not found".into(),
        });
    };
    if answer.question_id != Some(question_id) {
        return Ok(GradeResponse {
            applied: false,
            message: "Answer not found".into(),
        });
    }

    if state.results().exists(team_id, submission_id)? {
        return Ok(GradeResponse {
            applied: false,
            message: "Answer already marked".into(),
        });
    }

    state.results().upsert_result(&NewGrade {
        team_id: team_id.to_owned(),
        submission_id,
        question_id: Some(question_id),
        base_points: points,
        bonus_for_first: 0.0,
        bonus_for_unique: 0.0,
        other_bonus: 0.0,
        comment: None,
    })?;

    info!(team_id, %submission_id, question_id, points, "answer marked");
    Ok(GradeResponse {
        applied: true,
        message: "Answer marked".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::QuestionKind,
        dto::submission::{AnswerRequest, BugRequest},
        services::submission_service::{self, Submission, tests::test_state},
    };

    async fn accepted_answer(
        state: &SharedState,
        team: &str,
        question: u32,
        kind: QuestionKind,
        content: &str,
    ) -> Uuid {
        let submission = submission_service::submit_answer(
            state,
            AnswerRequest {
                team_id: team.into(),
                question_id: question,
                question_type: kind,
                content: content.into(),
            },
        )
        .await
        .unwrap();
        match submission {
            Submission::Accepted(receipt) => receipt.submission_id,
            Submission::Rejected(outcome) => panic!("rejected: {outcome:?}"),
        }
    }

    #[tokio::test]
    async fn worklist_contains_bugs_and_open_answers_but_not_closed_ones() {
        let state = test_state();
        accepted_answer(&state, "A1", 1, QuestionKind::Open, "open text").await;
        accepted_answer(&state, "A1", 4, QuestionKind::Closed, "abc").await;
        submission_service::submit_bug(
            &state,
            BugRequest {
                team_id: "B2".into(),
                content: "a bug".into(),
            },
        )
        .await
        .unwrap();

        let pending = pending_submissions(&state).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|item| item.grade.is_none()));
        assert!(pending.iter().any(|item| item.question_id == Some(1)));
        assert!(pending.iter().any(|item| item.question_id.is_none()));
        // Auto-graded closed answers never enter the worklist.
        assert!(pending.iter().all(|item| item.question_id != Some(4)));

        assert!(reviewed_submissions(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn grading_moves_an_item_from_pending_to_reviewed() {
        let state = test_state();
        let submission_id = accepted_answer(&state, "A1", 1, QuestionKind::Open, "insightful").await;

        let response = apply_grade(
            &state,
            GradeRequest {
                team_id: "A1".into(),
                submission_id,
                base_points: Some(5.0),
                bonus_for_first: Some(1.0),
                bonus_for_unique: None,
                other_bonus: None,
                comment: Some("nice".into()),
            },
        )
        .await
        .unwrap();
        assert!(response.applied);

        assert!(pending_submissions(&state).await.unwrap().is_empty());
        let reviewed = reviewed_submissions(&state).await.unwrap();
        assert_eq!(reviewed.len(), 1);
        let grade = reviewed[0].grade.as_ref().unwrap();
        assert_eq!(grade.base_points, 5.0);
        assert_eq!(grade.bonus_for_first, 1.0);
        assert_eq!(grade.times_reviewed, 1);
    }

    #[tokio::test]
    async fn regrading_updates_fields_and_bumps_the_counter() {
        let state = test_state();
        let submission_id = accepted_answer(&state, "A1", 1, QuestionKind::Open, "text").await;

        for base in [3.0, 7.0] {
            apply_grade(
                &state,
                GradeRequest {
                    team_id: "A1".into(),
                    submission_id,
                    base_points: Some(base),
                    bonus_for_first: None,
                    bonus_for_unique: None,
                    other_bonus: None,
                    comment: None,
                },
            )
            .await
            .unwrap();
        }

        let reviewed = reviewed_submissions(&state).await.unwrap();
        let grade = reviewed[0].grade.as_ref().unwrap();
        assert_eq!(grade.base_points, 7.0);
        assert_eq!(grade.times_reviewed, 2);
    }

    #[tokio::test]
    async fn grading_an_unknown_submission_reports_not_found() {
        let state = test_state();
        let response = apply_grade(
            &state,
            GradeRequest {
                team_id: "A1".into(),
                submission_id: Uuid::new_v4(),
                base_points: Some(5.0),
                bonus_for_first: None,
                bonus_for_unique: None,
                other_bonus: None,
                comment: None,
            },
        )
        .await
        .unwrap();
        assert!(!response.applied);
        assert_eq!(response.message, "Answer not found");
    }

    #[tokio::test]
    async fn mark_answer_is_idempotent() {
        let state = test_state();
        let submission_id = accepted_answer(&state, "A1", 1, QuestionKind::Open, "text").await;

        let first = mark_answer(&state, "A1", submission_id, 1, "12.5")
            .await
            .unwrap();
        assert!(first.applied);

        let second = mark_answer(&state, "A1", submission_id, 1, "99")
            .await
            .unwrap();
        assert!(!second.applied);
        assert_eq!(second.message, "Answer already marked");

        let reviewed = reviewed_submissions(&state).await.unwrap();
        assert_eq!(reviewed[0].grade.as_ref().unwrap().base_points, 12.5);
    }

    #[tokio::test]
    async fn mark_answer_rejects_non_numeric_points_before_any_write() {
        let state = test_state();
        let submission_id = accepted_answer(&state, "A1", 1, QuestionKind::Open, "text").await;

        let err = mark_answer(&state, "A1", submission_id, 1, "ten")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(state.results().all_reviewed().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_answer_requires_matching_question() {
        let state = test_state();
        let submission_id = accepted_answer(&state, "A1", 1, QuestionKind::Open, "text").await;

        let response = mark_answer(&state, "A1", submission_id, 4, "5")
            .await
            .unwrap();
        assert!(!response.applied);
        assert_eq!(response.message, "Answer not found");
    }
}
