//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BUG_BASH_BACK_CONFIG_PATH";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite file backing the submission store.
    pub submissions_db_path: PathBuf,
    /// SQLite file backing the result store.
    pub results_db_path: PathBuf,
    /// JSON document with the team allowlist.
    pub teams_path: PathBuf,
    /// JSON document with the question list.
    pub questions_path: PathBuf,
    /// Directory receiving per-bug text files.
    pub bug_files_dir: PathBuf,
    /// Directory receiving per-answer text files for open questions.
    pub open_answer_files_dir: PathBuf,
    /// Directory receiving per-answer text files for closed questions.
    pub closed_answer_files_dir: PathBuf,
    /// Minimum age of the cached leaderboard before it is recomputed.
    pub results_refresh_delay: Duration,
    /// TCP port the server binds to (`PORT` env still wins in `main`).
    pub port: u16,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults
    /// when the file is missing or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

/// JSON representation of the configuration file.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    db: RawDbConfig,
    #[serde(default)]
    service: RawServiceConfig,
}

#[derive(Debug, Deserialize)]
struct RawDbConfig {
    #[serde(default = "default_submissions_db")]
    submissions_path: PathBuf,
    #[serde(default = "default_results_db")]
    results_path: PathBuf,
    #[serde(default = "default_bug_files_dir")]
    bug_files_dir: PathBuf,
    #[serde(default = "default_open_answer_files_dir")]
    open_answer_files_dir: PathBuf,
    #[serde(default = "default_closed_answer_files_dir")]
    closed_answer_files_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawServiceConfig {
    #[serde(default = "default_teams_path")]
    teams_path: PathBuf,
    #[serde(default = "default_questions_path")]
    questions_path: PathBuf,
    #[serde(default = "default_refresh_delay_secs")]
    results_refresh_delay_secs: u64,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for RawDbConfig {
    fn default() -> Self {
        Self {
            submissions_path: default_submissions_db(),
            results_path: default_results_db(),
            bug_files_dir: default_bug_files_dir(),
            open_answer_files_dir: default_open_answer_files_dir(),
            closed_answer_files_dir: default_closed_answer_files_dir(),
        }
    }
}

impl Default for RawServiceConfig {
    fn default() -> Self {
        Self {
            teams_path: default_teams_path(),
            questions_path: default_questions_path(),
            results_refresh_delay_secs: default_refresh_delay_secs(),
            port: default_port(),
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        Self {
            submissions_db_path: raw.db.submissions_path,
            results_db_path: raw.db.results_path,
            teams_path: raw.service.teams_path,
            questions_path: raw.service.questions_path,
            bug_files_dir: raw.db.bug_files_dir,
            open_answer_files_dir: raw.db.open_answer_files_dir,
            closed_answer_files_dir: raw.db.closed_answer_files_dir,
            results_refresh_delay: Duration::from_secs(raw.service.results_refresh_delay_secs),
            port: raw.service.port,
        }
    }
}

fn default_submissions_db() -> PathBuf {
    PathBuf::from("data/submissions.db")
}

fn default_results_db() -> PathBuf {
    PathBuf::from("data/results.db")
}

fn default_bug_files_dir() -> PathBuf {
    PathBuf::from("data/files/bugs")
}

fn default_open_answer_files_dir() -> PathBuf {
    PathBuf::from("data/files/answers/open")
}

fn default_closed_answer_files_dir() -> PathBuf {
    PathBuf::from("data/files/answers/closed")
}

fn default_teams_path() -> PathBuf {
    PathBuf::from("config/teams.json")
}

fn default_questions_path() -> PathBuf {
    PathBuf::from("config/questions.json")
}

fn default_refresh_delay_secs() -> u64 {
    30
}

fn default_port() -> u16 {
    8080
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
