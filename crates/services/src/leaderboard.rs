use std::sync::Arc;

use quiz_core::model::{LeaderboardEntry, rank_records};
use storage::repository::{StorageError, UserStore};

/// Largest leaderboard a caller may ask for.
pub const MAX_LEADERBOARD_LIMIT: u32 = quiz_core::model::MAX_LEADERBOARD_SIZE;

/// Read side of the score store.
#[derive(Clone)]
pub struct LeaderboardService {
    scores: Arc<dyn UserStore>,
    default_limit: u32,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(scores: Arc<dyn UserStore>, default_limit: u32) -> Self {
        Self {
            scores,
            default_limit: default_limit.clamp(1, MAX_LEADERBOARD_LIMIT),
        }
    }

    /// Best results first. `limit` falls back to the configured size and is
    /// clamped to `1..=MAX_LEADERBOARD_LIMIT`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the score store cannot be read.
    pub async fn top(&self, limit: Option<u32>) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let limit = limit
            .unwrap_or(self.default_limit)
            .clamp(1, MAX_LEADERBOARD_LIMIT);
        let records = self.scores.top_scores(limit).await?;
        Ok(rank_records(records, usize::try_from(limit).unwrap_or(usize::MAX)))
    }
}
