//! Read side of the leaderboard plus the explicit refresh hook.

use crate::{dto::leaderboard::LeaderboardEntry, error::ServiceError, state::SharedState};

/// Teams ranked by aggregate points, served from the TTL cache.
pub async fn get_leaderboard(state: &SharedState) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let rows = state.scoring().leaderboard(state.teams(), state.results())?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Drop the cached leaderboard and return a freshly computed one.
pub async fn refresh_leaderboard(
    state: &SharedState,
) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    state.scoring().invalidate();
    get_leaderboard(state).await
}
