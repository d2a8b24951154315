//! Bug Bash Back binary entrypoint wiring the REST surface to the SQLite stores.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod config;
mod dao;
mod dto;
mod error;
mod routes;
mod services;
mod state;

use catalog::{QuestionCatalog, TeamCatalog};
use config::AppConfig;
use dao::{
    files::FileSink,
    sqlite::{SqliteResultStore, SqliteSubmissionStore},
};
use state::{AppState, ScoringEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let files = FileSink::new(
        config.bug_files_dir.clone(),
        config.open_answer_files_dir.clone(),
        config.closed_answer_files_dir.clone(),
    );
    let submissions = SqliteSubmissionStore::open(&config.submissions_db_path, Some(files))
        .context("opening submission store")?;
    let results =
        SqliteResultStore::open(&config.results_db_path).context("opening result store")?;

    let teams = TeamCatalog::from_path(config.teams_path.clone());
    let questions = QuestionCatalog::from_path(config.questions_path.clone());
    let scoring = ScoringEngine::new(config.results_refresh_delay);

    let app_state = AppState::new(
        teams,
        questions,
        Arc::new(submissions),
        Arc::new(results),
        scoring,
    )
    .context("rebuilding admission state from the submission store")?;

    let app = build_router(app_state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(config.port);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: state::SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
