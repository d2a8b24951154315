//! Read-only team and question catalogs.
//!
//! Both catalogs are backed by static JSON documents. Lookups are served from
//! a cached copy that is lazily reloaded whenever the backing file's
//! modification time changes. A missing or unreadable file degrades to an
//! empty catalog: subsequent lookups fail as "unknown team/question", which
//! is an ordinary admission rejection, never a crash.

use std::{
    collections::HashSet,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
    time::SystemTime,
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{info, warn};
use utoipa::ToSchema;

/// A registered team, immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    /// Globally unique identifier assigned by static configuration.
    pub id: String,
    /// Unique display name, the public key in leaderboard output.
    pub name: String,
}

/// Whether a question expects free text or an exact-match answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Free-text question graded manually.
    Open,
    /// Exact-match question auto-graded at submission time.
    Closed,
}

/// A quiz question, immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    /// Question identifier.
    pub id: u32,
    /// Open or closed.
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Canonical answer string, present for closed questions.
    #[serde(default)]
    pub answer: Option<String>,
    /// Point value awarded for a correct closed answer.
    #[serde(default)]
    pub points: f64,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct TeamsDoc {
    #[serde(default)]
    teams: Vec<Team>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct QuestionsDoc {
    #[serde(default)]
    questions: Vec<Question>,
}

/// Lazily reloaded view of a JSON document on disk.
struct Reloadable<T> {
    source: Option<PathBuf>,
    state: RwLock<Loaded<T>>,
}

struct Loaded<T> {
    data: Arc<T>,
    modified: Option<SystemTime>,
}

impl<T: DeserializeOwned + Default> Reloadable<T> {
    fn from_path(path: PathBuf) -> Self {
        let modified = modification_time(&path);
        let data = Arc::new(load_document(&path));
        Self {
            source: Some(path),
            state: RwLock::new(Loaded { data, modified }),
        }
    }

    /// In-memory document that never reloads, for tests and tooling.
    fn fixed(data: T) -> Self {
        Self {
            source: None,
            state: RwLock::new(Loaded {
                data: Arc::new(data),
                modified: None,
            }),
        }
    }

    /// Current document, reloading first if the file changed on disk.
    fn snapshot(&self) -> Arc<T> {
        let Some(path) = &self.source else {
            return self.read_data();
        };

        let on_disk = modification_time(path);
        let cached = {
            let guard = self
                .state
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            guard.modified
        };
        if cached != on_disk {
            let mut guard = self
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            // Re-check: another thread may have reloaded while we waited.
            if guard.modified != on_disk {
                guard.data = Arc::new(load_document(path));
                guard.modified = on_disk;
            }
        }

        self.read_data()
    }

    fn read_data(&self) -> Arc<T> {
        let guard = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard.data)
    }
}

fn modification_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

fn load_document<T: DeserializeOwned + Default>(path: &Path) -> T {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse catalog; degrading to empty"
                );
                T::default()
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "catalog file not found; using empty catalog");
            T::default()
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "failed to read catalog; degrading to empty"
            );
            T::default()
        }
    }
}

/// Lookup table of registered teams.
pub struct TeamCatalog {
    inner: Reloadable<TeamsDoc>,
}

impl TeamCatalog {
    /// Load the catalog from a JSON document (`{"teams": [...]}`).
    pub fn from_path(path: PathBuf) -> Self {
        Self {
            inner: Reloadable::from_path(path),
        }
    }

    /// Catalog over a fixed in-memory team list.
    pub fn fixed(teams: Vec<Team>) -> Self {
        Self {
            inner: Reloadable::fixed(TeamsDoc { teams }),
        }
    }

    /// Find a team by its identifier.
    pub fn lookup_team(&self, id: &str) -> Option<Team> {
        self.inner
            .snapshot()
            .teams
            .iter()
            .find(|team| team.id == id)
            .cloned()
    }

    /// Find a team by its display name.
    pub fn lookup_team_by_name(&self, name: &str) -> Option<Team> {
        self.inner
            .snapshot()
            .teams
            .iter()
            .find(|team| team.name == name)
            .cloned()
    }

    /// Every registered team in catalog file order.
    pub fn all(&self) -> Vec<Team> {
        self.inner.snapshot().teams.clone()
    }
}

/// Lookup table of quiz questions.
pub struct QuestionCatalog {
    inner: Reloadable<QuestionsDoc>,
}

impl QuestionCatalog {
    /// Load the catalog from a JSON document (`{"questions": [...]}`).
    pub fn from_path(path: PathBuf) -> Self {
        Self {
            inner: Reloadable::from_path(path),
        }
    }

    /// Catalog over a fixed in-memory question list.
    pub fn fixed(questions: Vec<Question>) -> Self {
        Self {
            inner: Reloadable::fixed(QuestionsDoc { questions }),
        }
    }

    /// Find a question by its identifier.
    pub fn lookup_question(&self, id: u32) -> Option<Question> {
        self.inner
            .snapshot()
            .questions
            .iter()
            .find(|question| question.id == id)
            .cloned()
    }

    /// Whether the question exists and has the claimed kind.
    ///
    /// Admission does not call this: it needs to report an unknown question
    /// separately from a kind mismatch, so it looks the question up once and
    /// compares the kind itself. This helper is for callers that only need
    /// the combined boolean.
    pub fn kind_matches(&self, id: u32, claimed: QuestionKind) -> bool {
        self.lookup_question(id)
            .is_some_and(|question| question.kind == claimed)
    }

    /// Identifiers of all open questions, used by the reconciliation view.
    pub fn open_question_ids(&self) -> HashSet<u32> {
        self.inner
            .snapshot()
            .questions
            .iter()
            .filter(|question| question.kind == QuestionKind::Open)
            .map(|question| question.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_questions() -> Vec<Question> {
        vec![
            Question {
                id: 1,
                kind: QuestionKind::Open,
                answer: None,
                points: 0.0,
            },
            Question {
                id: 4,
                kind: QuestionKind::Closed,
                answer: Some("abc".into()),
                points: 10.0,
            },
        ]
    }

    #[test]
    fn missing_file_degrades_to_empty_catalog() {
        let teams = TeamCatalog::from_path(PathBuf::from("/nonexistent/teams.json"));
        assert!(teams.lookup_team("A1").is_none());
        assert!(teams.all().is_empty());

        let questions = QuestionCatalog::from_path(PathBuf::from("/nonexistent/questions.json"));
        assert!(questions.lookup_question(1).is_none());
        assert!(!questions.kind_matches(1, QuestionKind::Open));
    }

    #[test]
    fn rewritten_catalog_file_is_reloaded_on_next_lookup() {
        let path = std::env::temp_dir().join(format!("teams-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, r#"{"teams": [{"id": "A1", "name": "alpha"}]}"#).unwrap();

        let catalog = TeamCatalog::from_path(path.clone());
        assert!(catalog.lookup_team("A1").is_some());
        assert!(catalog.lookup_team("B2").is_none());

        fs::write(
            &path,
            r#"{"teams": [{"id": "A1", "name": "alpha"}, {"id": "B2", "name": "bravo"}]}"#,
        )
        .unwrap();
        // Force the mtime forward; a fast rewrite can land in the same
        // filesystem timestamp tick.
        let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + std::time::Duration::from_secs(2))
            .unwrap();
        drop(file);

        assert_eq!(
            catalog.lookup_team("B2").map(|t| t.name),
            Some("bravo".into())
        );
        fs::remove_file(&path).ok();
    }

    #[test]
    fn lookups_resolve_by_id_and_name() {
        let catalog = TeamCatalog::fixed(vec![
            Team {
                id: "A1".into(),
                name: "alpha".into(),
            },
            Team {
                id: "B2".into(),
                name: "bravo".into(),
            },
        ]);

        assert_eq!(catalog.lookup_team("A1").map(|t| t.name), Some("alpha".into()));
        assert_eq!(
            catalog.lookup_team_by_name("bravo").map(|t| t.id),
            Some("B2".into())
        );
        assert!(catalog.lookup_team("ghost").is_none());
    }

    #[test]
    fn kind_matches_requires_existing_question_of_claimed_kind() {
        let catalog = QuestionCatalog::fixed(sample_questions());

        assert!(catalog.kind_matches(1, QuestionKind::Open));
        assert!(catalog.kind_matches(4, QuestionKind::Closed));
        assert!(!catalog.kind_matches(4, QuestionKind::Open));
        assert!(!catalog.kind_matches(99, QuestionKind::Closed));
    }

    #[test]
    fn open_question_ids_filters_closed_questions() {
        let catalog = QuestionCatalog::fixed(sample_questions());
        let open = catalog.open_question_ids();
        assert!(open.contains(&1));
        assert!(!open.contains(&4));
    }
}
