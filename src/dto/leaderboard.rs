use serde::Serialize;
use utoipa::ToSchema;

use crate::state::scoring::LeaderboardRow;

/// One leaderboard line exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// Team display name.
    pub team: String,
    /// Aggregate points.
    pub points: f64,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        Self {
            team: row.team,
            points: row.points,
        }
    }
}
