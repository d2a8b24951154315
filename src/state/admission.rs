//! Admission gate for incoming submissions.
//!
//! Validates a candidate submission against the catalogs and the in-memory
//! dedup table before anything is written. Rejections are ordinary values,
//! not errors; the check order is part of the user-facing contract (an
//! unknown question is reported before a type mismatch, a mismatch before a
//! duplicate).

use std::collections::HashSet;

use dashmap::DashMap;

use crate::catalog::{QuestionCatalog, QuestionKind, TeamCatalog};

/// Outcome of an admission check, surfaced as a value all the way to the
/// HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// The submission may be recorded; for answers the dedup entry is
    /// already marked.
    Admitted,
    /// The team identifier is not on the allowlist.
    UnknownTeam,
    /// No question exists with the given identifier.
    UnknownQuestion,
    /// The question exists but is not of the claimed kind.
    TypeMismatch,
    /// The team already submitted an answer for this question.
    AlreadyAnswered,
}

/// Duplicate-answer gate backed by a per-team set of answered question ids.
///
/// The map is seeded from the submission store at startup and updated
/// synchronously on every accepted answer. The check-then-mark sequence is
/// atomic per team: the map entry guard is held across both steps, so of two
/// concurrent duplicates exactly one is admitted.
#[derive(Default)]
pub struct AdmissionPolicy {
    answered: DashMap<String, HashSet<u32>>,
}

impl AdmissionPolicy {
    /// Empty policy; call [`Self::seed`] to rebuild state from the store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a batch of already-answered (team, question) pairs.
    pub fn seed(&self, pairs: impl IntoIterator<Item = (String, u32)>) {
        for (team_id, question_id) in pairs {
            self.answered.entry(team_id).or_default().insert(question_id);
        }
    }

    /// Run the ordered admission checks for an answer submission.
    ///
    /// On `Admitted` the dedup entry has been marked; if the subsequent
    /// store write fails the caller must [`Self::retract`] the mark.
    pub fn admit_answer(
        &self,
        teams: &TeamCatalog,
        questions: &QuestionCatalog,
        team_id: &str,
        question_id: u32,
        claimed: QuestionKind,
    ) -> AdmissionOutcome {
        if teams.lookup_team(team_id).is_none() {
            return AdmissionOutcome::UnknownTeam;
        }
        let Some(question) = questions.lookup_question(question_id) else {
            return AdmissionOutcome::UnknownQuestion;
        };
        if question.kind != claimed {
            return AdmissionOutcome::TypeMismatch;
        }

        let mut entry = self.answered.entry(team_id.to_owned()).or_default();
        if entry.insert(question_id) {
            AdmissionOutcome::Admitted
        } else {
            AdmissionOutcome::AlreadyAnswered
        }
    }

    /// Admission check for a bug note: only the team must be known.
    ///
    /// Bug notes are not deduplicated; rate limiting, if any, is the HTTP
    /// shell's concern.
    pub fn admit_bug(&self, teams: &TeamCatalog, team_id: &str) -> AdmissionOutcome {
        if teams.lookup_team(team_id).is_none() {
            return AdmissionOutcome::UnknownTeam;
        }
        AdmissionOutcome::Admitted
    }

    /// Remove a dedup mark after a failed store write so a retry is not
    /// rejected as a duplicate of a submission that was never recorded.
    pub fn retract(&self, team_id: &str, question_id: u32) {
        if let Some(mut entry) = self.answered.get_mut(team_id) {
            entry.remove(&question_id);
        }
    }
}
