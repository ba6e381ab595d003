use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::AccountRef;
use crate::model::player::Player;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("score ({score}) exceeds question count ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("player name cannot be empty")]
    EmptyPlayerName,
}

/// Final result of one quiz attempt, as handed to the score store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    player_name: String,
    account: Option<AccountRef>,
    score: u32,
    total_questions: u32,
    completed_at: DateTime<Utc>,
}

impl ScoreRecord {
    /// # Errors
    ///
    /// Returns `ScoreError::ScoreExceedsTotal` if more answers were correct than asked.
    pub fn for_player(
        player: &Player,
        score: u32,
        total_questions: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ScoreError> {
        Self::from_persisted(
            player.name().to_owned(),
            player.account(),
            score,
            total_questions,
            completed_at,
        )
    }

    /// Rehydrate a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError` if the name is blank or the counts do not align.
    pub fn from_persisted(
        player_name: String,
        account: Option<AccountRef>,
        score: u32,
        total_questions: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ScoreError> {
        if player_name.trim().is_empty() {
            return Err(ScoreError::EmptyPlayerName);
        }
        if score > total_questions {
            return Err(ScoreError::ScoreExceedsTotal {
                score,
                total: total_questions,
            });
        }
        Ok(Self {
            player_name,
            account,
            score,
            total_questions,
            completed_at,
        })
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    #[must_use]
    pub fn account(&self) -> Option<AccountRef> {
        self.account
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.account.is_none()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub player: String,
    pub anonymous: bool,
    pub score: u32,
    pub total_questions: u32,
    pub completed_at: DateTime<Utc>,
}

/// Orders records best first: higher score, then earlier completion.
pub fn rank_records(mut records: Vec<ScoreRecord>, limit: usize) -> Vec<LeaderboardEntry> {
    records.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.completed_at.cmp(&b.completed_at))
    });
    records
        .into_iter()
        .take(limit)
        .zip(1_u32..)
        .map(|(r, rank)| LeaderboardEntry {
            rank,
            anonymous: r.is_anonymous(),
            player: r.player_name,
            score: r.score,
            total_questions: r.total_questions,
            completed_at: r.completed_at,
        })
        .collect()
}
