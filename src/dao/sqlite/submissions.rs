use std::{path::Path, sync::Mutex};

use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use uuid::Uuid;

use crate::dao::{
    files::FileSink,
    models::{SubmissionEntity, SubmissionKind},
    sqlite::{lock, now_rfc3339, open_database, open_in_memory},
    storage::{StorageError, StorageResult},
    store::SubmissionStore,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS submissions (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    guid        TEXT NOT NULL UNIQUE,
    kind        TEXT NOT NULL,
    team_id     TEXT NOT NULL,
    question_id INTEGER,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_submissions_team_question
    ON submissions (team_id, question_id);
";

/// SQLite-backed append-only store of raw answers and bug notes.
pub struct SqliteSubmissionStore {
    conn: Mutex<Connection>,
    files: Option<FileSink>,
}

impl SqliteSubmissionStore {
    /// Open the store at `path`, mirroring accepted rows through `files`.
    pub fn open(path: &Path, files: Option<FileSink>) -> StorageResult<Self> {
        Ok(Self {
            conn: Mutex::new(open_database(path, SCHEMA)?),
            files,
        })
    }

    /// In-memory store without a file mirror, for tests.
    pub fn in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: Mutex::new(open_in_memory(SCHEMA)?),
            files: None,
        })
    }

    fn insert(
        &self,
        kind: SubmissionKind,
        team_id: &str,
        question_id: Option<u32>,
        content: &str,
    ) -> StorageResult<SubmissionEntity> {
        let entity = SubmissionEntity {
            id: Uuid::new_v4(),
            kind,
            team_id: team_id.to_owned(),
            question_id,
            content: content.to_owned(),
            created_at: now_rfc3339(),
        };

        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO submissions (guid, kind, team_id, question_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entity.id.to_string(),
                entity.kind.as_str(),
                entity.team_id,
                entity.question_id,
                entity.content,
                entity.created_at,
            ],
        )
        .map_err(|err| StorageError::unavailable("inserting submission", err))?;

        Ok(entity)
    }

    fn all_of_kind(&self, kind: SubmissionKind) -> StorageResult<Vec<SubmissionEntity>> {
        let conn = lock(&self.conn);
        let mut stmt = conn
            .prepare(
                "SELECT guid, kind, team_id, question_id, content, created_at
                 FROM submissions WHERE kind = ?1 ORDER BY seq",
            )
            .map_err(|err| StorageError::unavailable("listing submissions", err))?;
        let rows = stmt
            .query_map(params![kind.as_str()], row_to_submission)
            .map_err(|err| StorageError::unavailable("listing submissions", err))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| StorageError::unavailable("listing submissions", err))?;
        Ok(rows)
    }
}

impl SubmissionStore for SqliteSubmissionStore {
    fn record_answer(
        &self,
        team_id: &str,
        question_id: u32,
        content: &str,
        open_question: bool,
    ) -> StorageResult<SubmissionEntity> {
        let entity = self.insert(SubmissionKind::Answer, team_id, Some(question_id), content)?;
        if let Some(files) = &self.files {
            files.write_answer(&entity, open_question);
        }
        Ok(entity)
    }

    fn record_bug(&self, team_id: &str, content: &str) -> StorageResult<SubmissionEntity> {
        let entity = self.insert(SubmissionKind::Bug, team_id, None, content)?;
        if let Some(files) = &self.files {
            files.write_bug(&entity);
        }
        Ok(entity)
    }

    fn all_answers(&self) -> StorageResult<Vec<SubmissionEntity>> {
        self.all_of_kind(SubmissionKind::Answer)
    }

    fn all_bugs(&self) -> StorageResult<Vec<SubmissionEntity>> {
        self.all_of_kind(SubmissionKind::Bug)
    }

    fn has_existing(&self, team_id: &str, question_id: u32) -> StorageResult<bool> {
        let conn = lock(&self.conn);
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM submissions
                 WHERE kind = 'answer' AND team_id = ?1 AND question_id = ?2",
                params![team_id, question_id],
                |row| row.get(0),
            )
            .map_err(|err| StorageError::unavailable("checking for existing answer", err))?;
        Ok(count > 0)
    }

    fn answered_pairs(&self) -> StorageResult<Vec<(String, u32)>> {
        let conn = lock(&self.conn);
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT team_id, question_id FROM submissions
                 WHERE kind = 'answer' AND question_id IS NOT NULL",
            )
            .map_err(|err| StorageError::unavailable("listing answered pairs", err))?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))
            .map_err(|err| StorageError::unavailable("listing answered pairs", err))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| StorageError::unavailable("listing answered pairs", err))?;
        Ok(pairs)
    }

    fn find_answer(
        &self,
        team_id: &str,
        submission_id: Uuid,
    ) -> StorageResult<Option<SubmissionEntity>> {
        let conn = lock(&self.conn);
        conn.query_row(
            "SELECT guid, kind, team_id, question_id, content, created_at
             FROM submissions
             WHERE kind = 'answer' AND team_id = ?1 AND guid = ?2",
            params![team_id, submission_id.to_string()],
            row_to_submission,
        )
        .optional()
        .map_err(|err| StorageError::unavailable("looking up answer", err))
    }

    fn find_submission(
        &self,
        team_id: &str,
        submission_id: Uuid,
    ) -> StorageResult<Option<SubmissionEntity>> {
        let conn = lock(&self.conn);
        conn.query_row(
            "SELECT guid, kind, team_id, question_id, content, created_at
             FROM submissions WHERE team_id = ?1 AND guid = ?2",
            params![team_id, submission_id.to_string()],
            row_to_submission,
        )
        .optional()
        .map_err(|err| StorageError::unavailable("looking up submission", err))
    }

    fn ping(&self) -> StorageResult<()> {
        let conn = lock(&self.conn);
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|err| StorageError::unavailable("pinging submission store", err))
    }
}

fn row_to_submission(row: &Row<'_>) -> rusqlite::Result<SubmissionEntity> {
    let guid: String = row.get(0)?;
    let kind: String = row.get(1)?;
    Ok(SubmissionEntity {
        id: Uuid::parse_str(&guid)
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err)))?,
        kind: match kind.as_str() {
            "bug" => SubmissionKind::Bug,
            _ => SubmissionKind::Answer,
        },
        team_id: row.get(2)?,
        question_id: row.get(3)?,
        content: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_and_bugs_are_kept_apart_in_insertion_order() {
        let store = SqliteSubmissionStore::in_memory().unwrap();
        store.record_answer("A1", 1, "first", true).unwrap();
        store.record_bug("A1", "crash on login").unwrap();
        store.record_answer("B2", 2, "second", false).unwrap();

        let answers = store.all_answers().unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].content, "first");
        assert_eq!(answers[1].content, "second");
        assert_eq!(answers[0].question_id, Some(1));

        let bugs = store.all_bugs().unwrap();
        assert_eq!(bugs.len(), 1);
        assert_eq!(bugs[0].question_id, None);
        assert_eq!(bugs[0].kind, SubmissionKind::Bug);
    }

    #[test]
    fn has_existing_sees_only_matching_pairs() {
        let store = SqliteSubmissionStore::in_memory().unwrap();
        store.record_answer("A1", 4, "abc", false).unwrap();

        assert!(store.has_existing("A1", 4).unwrap());
        assert!(!store.has_existing("A1", 5).unwrap());
        assert!(!store.has_existing("B2", 4).unwrap());
    }

    #[test]
    fn answered_pairs_are_distinct_and_ignore_bugs() {
        let store = SqliteSubmissionStore::in_memory().unwrap();
        store.record_answer("A1", 1, "x", true).unwrap();
        store.record_answer("A1", 2, "y", true).unwrap();
        store.record_bug("A1", "note").unwrap();
        store.record_answer("B2", 1, "z", true).unwrap();

        let mut pairs = store.answered_pairs().unwrap();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("A1".to_owned(), 1),
                ("A1".to_owned(), 2),
                ("B2".to_owned(), 1)
            ]
        );
    }

    #[test]
    fn find_answer_resolves_by_team_and_guid() {
        let store = SqliteSubmissionStore::in_memory().unwrap();
        let recorded = store.record_answer("A1", 7, "open text", true).unwrap();

        let found = store.find_answer("A1", recorded.id).unwrap();
        assert_eq!(found, Some(recorded.clone()));
        assert_eq!(store.find_answer("B2", recorded.id).unwrap(), None);
        assert!(store.find_submission("A1", recorded.id).unwrap().is_some());
        assert!(store.find_submission("A1", Uuid::new_v4()).unwrap().is_none());
    }
}
