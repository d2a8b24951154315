//! Shared application state: the catalogs, stores, and the two stateful core
//! components (admission policy and scoring engine), wired together once at
//! startup and passed to request handlers by handle.

/// Admission gate with the duplicate-answer dedup table.
pub mod admission;
/// Auto-grading and the TTL-cached leaderboard.
pub mod scoring;

use std::sync::Arc;

use crate::{
    catalog::{QuestionCatalog, TeamCatalog},
    dao::{
        storage::StorageResult,
        store::{ResultStore, SubmissionStore},
    },
};

pub use self::admission::{AdmissionOutcome, AdmissionPolicy};
pub use self::scoring::ScoringEngine;

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state holding every core component.
///
/// There is no ambient singleton: everything a handler needs is reached
/// through this explicitly constructed value.
pub struct AppState {
    teams: TeamCatalog,
    questions: QuestionCatalog,
    submissions: Arc<dyn SubmissionStore>,
    results: Arc<dyn ResultStore>,
    admission: AdmissionPolicy,
    scoring: ScoringEngine,
}

impl AppState {
    /// Wire the components together, rebuilding the dedup table from the
    /// submission store.
    pub fn new(
        teams: TeamCatalog,
        questions: QuestionCatalog,
        submissions: Arc<dyn SubmissionStore>,
        results: Arc<dyn ResultStore>,
        scoring: ScoringEngine,
    ) -> StorageResult<SharedState> {
        let admission = AdmissionPolicy::new();
        admission.seed(submissions.answered_pairs()?);

        Ok(Arc::new(Self {
            teams,
            questions,
            submissions,
            results,
            admission,
            scoring,
        }))
    }

    /// Team allowlist catalog.
    pub fn teams(&self) -> &TeamCatalog {
        &self.teams
    }

    /// Question catalog.
    pub fn questions(&self) -> &QuestionCatalog {
        &self.questions
    }

    /// Append-only store of raw submissions.
    pub fn submissions(&self) -> &dyn SubmissionStore {
        self.submissions.as_ref()
    }

    /// Store of graded results.
    pub fn results(&self) -> &dyn ResultStore {
        self.results.as_ref()
    }

    /// Admission gate for incoming submissions.
    pub fn admission(&self) -> &AdmissionPolicy {
        &self.admission
    }

    /// Scoring engine owning the leaderboard cache.
    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }
}
