//! Orchestration of the submission path: admission, recording, auto-grading.

use tracing::{debug, warn};

use crate::{
    catalog::QuestionKind,
    dto::submission::{AnswerRequest, BugRequest, SubmissionReceipt},
    error::ServiceError,
    state::{AdmissionOutcome, SharedState},
};

/// Result of presenting an answer submission to the core.
#[derive(Debug)]
pub enum Submission {
    /// The submission was recorded; the receipt carries its identifier.
    Accepted(SubmissionReceipt),
    /// The submission was rejected by the admission policy.
    Rejected(AdmissionOutcome),
}

/// Validate, record, and (for closed questions) auto-grade an answer.
pub async fn submit_answer(
    state: &SharedState,
    request: AnswerRequest,
) -> Result<Submission, ServiceError> {
    let outcome = state.admission().admit_answer(
        state.teams(),
        state.questions(),
        &request.team_id,
        request.question_id,
        request.question_type,
    );
    if outcome != AdmissionOutcome::Admitted {
        return Ok(Submission::Rejected(outcome));
    }

    // Admission verified the question exists; a concurrent catalog reload
    // could still have removed it, in which case the mark is released.
    let Some(question) = state.questions().lookup_question(request.question_id) else {
        state
            .admission()
            .retract(&request.team_id, request.question_id);
        return Ok(Submission::Rejected(AdmissionOutcome::UnknownQuestion));
    };

    let open_question = question.kind == QuestionKind::Open;
    let submission = match state.submissions().record_answer(
        &request.team_id,
        request.question_id,
        &request.content,
        open_question,
    ) {
        Ok(submission) => submission,
        Err(err) => {
            // The row was never written; release the dedup mark so a retry
            // is not rejected as a duplicate.
            state
                .admission()
                .retract(&request.team_id, request.question_id);
            warn!(
                team_id = %request.team_id,
                question_id = request.question_id,
                "answer write failed; dedup mark retracted"
            );
            return Err(err.into());
        }
    };

    if question.kind == QuestionKind::Closed {
        let points = state.scoring().auto_grade(
            &question,
            &request.team_id,
            submission.id,
            &request.content,
            state.results(),
        )?;
        debug!(
            team_id = %request.team_id,
            question_id = request.question_id,
            points,
            "closed answer auto-graded"
        );
    }

    let team_name = state
        .teams()
        .lookup_team(&request.team_id)
        .map(|team| team.name)
        .unwrap_or_else(|| request.team_id.clone());
    Ok(Submission::Accepted(SubmissionReceipt {
        submission_id: submission.id,
        created_at: submission.created_at,
        message: format!(
            "Answer for question '{}' for team {team_name} added.",
            request.question_id
        ),
    }))
}

/// Validate and record a bug note.
pub async fn submit_bug(
    state: &SharedState,
    request: BugRequest,
) -> Result<Submission, ServiceError> {
    let outcome = state.admission().admit_bug(state.teams(), &request.team_id);
    if outcome != AdmissionOutcome::Admitted {
        return Ok(Submission::Rejected(outcome));
    }

    let submission = state
        .submissions()
        .record_bug(&request.team_id, &request.content)?;

    let team_name = state
        .teams()
        .lookup_team(&request.team_id)
        .map(|team| team.name)
        .unwrap_or_else(|| request.team_id.clone());
    Ok(Submission::Accepted(SubmissionReceipt {
        submission_id: submission.id,
        created_at: submission.created_at,
        message: format!("Note created for team {team_name}."),
    }))
}
