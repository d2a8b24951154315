use std::{collections::HashMap, path::Path, sync::Mutex};

use rusqlite::{Connection, Row, params, types::Type};
use uuid::Uuid;

use crate::dao::{
    models::{NewGrade, ResultEntity},
    sqlite::{lock, now_rfc3339, open_database, open_in_memory},
    storage::{StorageError, StorageResult},
    store::ResultStore,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS results (
    team_id          TEXT NOT NULL,
    submission_guid  TEXT NOT NULL,
    question_id      INTEGER,
    base_points      REAL NOT NULL DEFAULT 0,
    bonus_for_first  REAL NOT NULL DEFAULT 0,
    bonus_for_unique REAL NOT NULL DEFAULT 0,
    other_bonus      REAL NOT NULL DEFAULT 0,
    comment          TEXT,
    times_reviewed   INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL,
    PRIMARY KEY (team_id, submission_guid)
);
";

/// SQLite-backed store of graded results, one row per (team, submission).
pub struct SqliteResultStore {
    conn: Mutex<Connection>,
}

impl SqliteResultStore {
    /// Open the store at `path`.
    pub fn open(path: &Path) -> StorageResult<Self> {
        Ok(Self {
            conn: Mutex::new(open_database(path, SCHEMA)?),
        })
    }

    /// In-memory store for tests.
    pub fn in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: Mutex::new(open_in_memory(SCHEMA)?),
        })
    }
}

impl ResultStore for SqliteResultStore {
    fn upsert_result(&self, grade: &NewGrade) -> StorageResult<()> {
        // Single statement so check-then-write cannot interleave with a
        // concurrent upsert for the same key.
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO results (team_id, submission_guid, question_id, base_points,
                                  bonus_for_first, bonus_for_unique, other_bonus,
                                  comment, times_reviewed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9)
             ON CONFLICT (team_id, submission_guid) DO UPDATE SET
                 base_points      = excluded.base_points,
                 bonus_for_first  = excluded.bonus_for_first,
                 bonus_for_unique = excluded.bonus_for_unique,
                 other_bonus      = excluded.other_bonus,
                 comment          = excluded.comment,
                 times_reviewed   = times_reviewed + 1",
            params![
                grade.team_id,
                grade.submission_id.to_string(),
                grade.question_id,
                grade.base_points,
                grade.bonus_for_first,
                grade.bonus_for_unique,
                grade.other_bonus,
                grade.comment,
                now_rfc3339(),
            ],
        )
        .map_err(|err| StorageError::unavailable("upserting result", err))?;
        Ok(())
    }

    fn exists(&self, team_id: &str, submission_id: Uuid) -> StorageResult<bool> {
        let conn = lock(&self.conn);
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM results WHERE team_id = ?1 AND submission_guid = ?2",
                params![team_id, submission_id.to_string()],
                |row| row.get(0),
            )
            .map_err(|err| StorageError::unavailable("checking for result", err))?;
        Ok(count > 0)
    }

    fn all_reviewed(&self) -> StorageResult<Vec<ResultEntity>> {
        let conn = lock(&self.conn);
        let mut stmt = conn
            .prepare(
                "SELECT team_id, submission_guid, question_id, base_points, bonus_for_first,
                        bonus_for_unique, other_bonus, comment, times_reviewed, created_at
                 FROM results WHERE times_reviewed > 0",
            )
            .map_err(|err| StorageError::unavailable("listing results", err))?;
        let rows = stmt
            .query_map([], row_to_result)
            .map_err(|err| StorageError::unavailable("listing results", err))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| StorageError::unavailable("listing results", err))?;
        Ok(rows)
    }

    fn aggregate_points_by_team(&self) -> StorageResult<HashMap<String, f64>> {
        let conn = lock(&self.conn);
        let mut stmt = conn
            .prepare(
                "SELECT team_id,
                        SUM(base_points + bonus_for_first + bonus_for_unique + other_bonus)
                 FROM results GROUP BY team_id",
            )
            .map_err(|err| StorageError::unavailable("aggregating points", err))?;
        let totals = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))
            .map_err(|err| StorageError::unavailable("aggregating points", err))?
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(|err| StorageError::unavailable("aggregating points", err))?;
        Ok(totals)
    }

    fn ping(&self) -> StorageResult<()> {
        let conn = lock(&self.conn);
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|err| StorageError::unavailable("pinging result store", err))
    }
}

fn row_to_result(row: &Row<'_>) -> rusqlite::Result<ResultEntity> {
    let guid: String = row.get(1)?;
    Ok(ResultEntity {
        team_id: row.get(0)?,
        submission_id: Uuid::parse_str(&guid)
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(err)))?,
        question_id: row.get(2)?,
        base_points: row.get(3)?,
        bonus_for_first: row.get(4)?,
        bonus_for_unique: row.get(5)?,
        other_bonus: row.get(6)?,
        comment: row.get(7)?,
        times_reviewed: row.get(8)?,
        created_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(team: &str, submission: Uuid, base: f64) -> NewGrade {
        NewGrade {
            team_id: team.to_owned(),
            submission_id: submission,
            question_id: Some(1),
            base_points: base,
            bonus_for_first: 0.0,
            bonus_for_unique: 0.0,
            other_bonus: 0.0,
            comment: None,
        }
    }

    #[test]
    fn upsert_twice_keeps_one_row_with_latest_fields_and_counter_two() {
        let store = SqliteResultStore::in_memory().unwrap();
        let submission = Uuid::new_v4();

        store.upsert_result(&grade("A1", submission, 5.0)).unwrap();
        let mut second = grade("A1", submission, 8.0);
        second.other_bonus = 2.0;
        second.comment = Some("regraded".into());
        store.upsert_result(&second).unwrap();

        let rows = store.all_reviewed().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].base_points, 8.0);
        assert_eq!(rows[0].other_bonus, 2.0);
        assert_eq!(rows[0].comment.as_deref(), Some("regraded"));
        assert_eq!(rows[0].times_reviewed, 2);
    }

    #[test]
    fn exists_distinguishes_keys() {
        let store = SqliteResultStore::in_memory().unwrap();
        let submission = Uuid::new_v4();
        store.upsert_result(&grade("A1", submission, 1.0)).unwrap();

        assert!(store.exists("A1", submission).unwrap());
        assert!(!store.exists("B2", submission).unwrap());
        assert!(!store.exists("A1", Uuid::new_v4()).unwrap());
    }

    #[test]
    fn aggregate_sums_base_and_all_bonuses_per_team() {
        let store = SqliteResultStore::in_memory().unwrap();

        let mut first = grade("A1", Uuid::new_v4(), 10.0);
        first.bonus_for_first = 1.0;
        first.bonus_for_unique = 2.0;
        first.other_bonus = 0.5;
        store.upsert_result(&first).unwrap();
        store.upsert_result(&grade("A1", Uuid::new_v4(), 3.0)).unwrap();
        store.upsert_result(&grade("B2", Uuid::new_v4(), 4.0)).unwrap();

        let totals = store.aggregate_points_by_team().unwrap();
        assert_eq!(totals.get("A1"), Some(&16.5));
        assert_eq!(totals.get("B2"), Some(&4.0));
        assert_eq!(totals.get("C3"), None);
    }
}
