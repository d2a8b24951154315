use axum::{Json, Router, extract::State, routing::{get, post}};

use crate::{
    dto::leaderboard::LeaderboardEntry, error::AppError, services::leaderboard_service,
    state::SharedState,
};

/// Routes serving the public team ranking.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/leaderboard", get(get_leaderboard))
        .route("/leaderboard/refresh", post(refresh_leaderboard))
}

/// Teams ranked by aggregate points; cached up to the configured delay.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "leaderboard",
    responses((status = 200, description = "Current ranking", body = [LeaderboardEntry]))
)]
pub async fn get_leaderboard(
    State(state): State<SharedState>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let entries = leaderboard_service::get_leaderboard(&state).await?;
    Ok(Json(entries))
}

/// Invalidate the cached ranking and return a freshly computed one.
#[utoipa::path(
    post,
    path = "/leaderboard/refresh",
    tag = "leaderboard",
    responses((status = 200, description = "Recomputed ranking", body = [LeaderboardEntry]))
)]
pub async fn refresh_leaderboard(
    State(state): State<SharedState>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let entries = leaderboard_service::refresh_leaderboard(&state).await?;
    Ok(Json(entries))
}
