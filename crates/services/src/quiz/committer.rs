use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use quiz_core::model::{Player, ScoreRecord, SessionId};
use storage::repository::{StorageError, UserStore};

use crate::error::QuizError;
use crate::quiz::registry::SessionRegistry;
use crate::Clock;

/// What was handed to the score store when a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResult {
    pub player: Player,
    pub score: u32,
    pub total_questions: u32,
    pub completed: bool,
    pub record_id: i64,
}

/// Ends sessions: persists the result, then evicts the session.
#[derive(Clone)]
pub struct ScoreCommitter {
    clock: Clock,
    registry: Arc<SessionRegistry>,
    scores: Arc<dyn UserStore>,
}

impl ScoreCommitter {
    #[must_use]
    pub fn new(clock: Clock, registry: Arc<SessionRegistry>, scores: Arc<dyn UserStore>) -> Self {
        Self {
            clock,
            registry,
            scores,
        }
    }

    /// Store the session's score and remove the session.
    ///
    /// The session is removed whether or not the store succeeds.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::SessionNotFound` if there is no session for `id`, or
    /// `QuizError::PersistenceFailed` if the score store rejects the record.
    pub async fn finalize(&self, id: &SessionId) -> Result<CommitResult, QuizError> {
        let slot = self.registry.get(id)?;
        let session = slot.lock().await?;

        let player = session.player().clone();
        let score = session.score();
        let total = u32::try_from(session.total()).unwrap_or(u32::MAX);
        let completed = session.is_complete();
        let completed_at = session.completed_at().unwrap_or_else(|| self.clock.now());

        let stored = match ScoreRecord::for_player(&player, score, total, completed_at) {
            Ok(record) => self.scores.store_score(&record).await,
            Err(e) => Err(StorageError::Serialization(e.to_string())),
        };

        // Evict while still holding the lock so queued requests see the removal.
        self.registry.remove_slot(id, &slot)?;
        drop(session);

        match stored {
            Ok(record_id) => {
                info!(session = %id, player = player.name(), score, total, "score stored");
                Ok(CommitResult {
                    player,
                    score,
                    total_questions: total,
                    completed,
                    record_id,
                })
            }
            Err(e) => {
                warn!(session = %id, player = player.name(), error = %e, "score store failed");
                Err(QuizError::PersistenceFailed(e))
            }
        }
    }
}
