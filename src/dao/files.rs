//! Best-effort flat-file mirror of accepted submissions.
//!
//! Every accepted submission is also dumped to a per-submission text file so
//! organizers can grep the raw material without touching the database. A
//! failed file write is logged and otherwise ignored; it never rolls back or
//! fails the database write.

use std::{
    fs, io,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
};

use tracing::{debug, warn};

use crate::dao::models::SubmissionEntity;

/// Directories receiving the per-submission text files.
#[derive(Debug)]
pub struct FileSink {
    bug_dir: PathBuf,
    open_answer_dir: PathBuf,
    closed_answer_dir: PathBuf,
    bug_seq: AtomicU64,
}

impl FileSink {
    /// Build a sink over the three dump directories, creating them if needed.
    pub fn new(bug_dir: PathBuf, open_answer_dir: PathBuf, closed_answer_dir: PathBuf) -> Self {
        for dir in [&bug_dir, &open_answer_dir, &closed_answer_dir] {
            if let Err(err) = fs::create_dir_all(dir) {
                warn!(dir = %dir.display(), error = %err, "could not create dump directory");
            }
        }
        Self {
            bug_dir,
            open_answer_dir,
            closed_answer_dir,
            bug_seq: AtomicU64::new(0),
        }
    }

    /// Mirror an accepted answer. Failures are logged, never propagated.
    pub fn write_answer(&self, submission: &SubmissionEntity, open_question: bool) {
        let dir = if open_question {
            &self.open_answer_dir
        } else {
            &self.closed_answer_dir
        };
        let question_id = submission.question_id.unwrap_or_default();
        let file_name = format!(
            "{}_{}_{}_{}.txt",
            submission.team_id,
            question_id,
            submission.id,
            sanitize_timestamp(&submission.created_at)
        );
        let body = [
            format!("team id: {}", submission.team_id),
            format!("question id: {question_id}"),
            format!("question guid: {}", submission.id),
            format!("answer creation time: {}", submission.created_at),
            format!("Content: \r\n{}", submission.content),
        ]
        .join("\r\n");

        match write_file(dir.join(&file_name), &body) {
            Ok(()) => debug!(file = %file_name, "answer mirrored to file"),
            Err(err) => {
                warn!(file = %file_name, error = %err, "answer file write failed; ignoring")
            }
        }
    }

    /// Mirror an accepted bug note. Failures are logged, never propagated.
    ///
    /// Bug file names carry a per-process sequence number so a directory
    /// listing reads in arrival order.
    pub fn write_bug(&self, submission: &SubmissionEntity) {
        let seq = self.bug_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let file_name = format!(
            "{}_{}_{}_{}.txt",
            seq,
            sanitize_timestamp(&submission.created_at),
            submission.team_id,
            submission.id
        );
        let body = [
            format!("team id: {}", submission.team_id),
            format!("bug guid: {}", submission.id),
            format!("bug creation time: {}", submission.created_at),
            format!("Content: \r\n{}", submission.content),
        ]
        .join("\r\n");

        match write_file(self.bug_dir.join(&file_name), &body) {
            Ok(()) => debug!(file = %file_name, "bug note mirrored to file"),
            Err(err) => {
                warn!(file = %file_name, error = %err, "bug file write failed; ignoring")
            }
        }
    }
}

fn write_file(path: PathBuf, body: &str) -> io::Result<()> {
    fs::write(path, body.as_bytes())
}

/// Timestamps contain `:` which some filesystems reject in file names.
fn sanitize_timestamp(stamp: &str) -> String {
    stamp.replace(':', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::SubmissionKind;
    use uuid::Uuid;

    fn bug(team: &str, content: &str) -> SubmissionEntity {
        SubmissionEntity {
            id: Uuid::new_v4(),
            kind: SubmissionKind::Bug,
            team_id: team.into(),
            question_id: None,
            content: content.into(),
            created_at: "2026-08-23T10:00:00Z".into(),
        }
    }

    #[test]
    fn bug_files_are_numbered_in_arrival_order() {
        let base = std::env::temp_dir().join(format!("bug-sink-{}", Uuid::new_v4()));
        let sink = FileSink::new(
            base.join("bugs"),
            base.join("answers/open"),
            base.join("answers/closed"),
        );

        sink.write_bug(&bug("A1", "first note"));
        sink.write_bug(&bug("B2", "second note"));

        let mut names: Vec<String> = fs::read_dir(base.join("bugs"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("1_"), "got {}", names[0]);
        assert!(names[1].starts_with("2_"), "got {}", names[1]);
        assert!(names[0].contains("A1"));

        fs::remove_dir_all(&base).ok();
    }
}
