use axum::Json;
use axum::extract::{Query, State};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use quiz_core::model::LeaderboardEntry;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<u32>,
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<LeaderboardQuery>, ApiError>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    Ok(Json(state.leaderboard.top(query.limit).await?))
}
