use chrono::Duration;
use thiserror::Error;

pub const MAX_LEADERBOARD_SIZE: u32 = 100;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("questions per quiz must be > 0")]
    InvalidQuestionsPerQuiz,

    #[error("leaderboard size must be between 1 and 100")]
    InvalidLeaderboardSize,

    #[error("session idle timeout must be > 0")]
    InvalidIdleTimeout,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Server-wide quiz knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    questions_per_quiz: u32,
    leaderboard_size: u32,
    session_idle_timeout: Duration,
}

impl QuizSettings {
    /// Creates custom settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if any value is zero or the leaderboard size
    /// exceeds [`MAX_LEADERBOARD_SIZE`].
    pub fn new(
        questions_per_quiz: u32,
        leaderboard_size: u32,
        session_idle_timeout: Duration,
    ) -> Result<Self, SettingsError> {
        if questions_per_quiz == 0 {
            return Err(SettingsError::InvalidQuestionsPerQuiz);
        }
        if !(1..=MAX_LEADERBOARD_SIZE).contains(&leaderboard_size) {
            return Err(SettingsError::InvalidLeaderboardSize);
        }
        if session_idle_timeout <= Duration::zero() {
            return Err(SettingsError::InvalidIdleTimeout);
        }

        Ok(Self {
            questions_per_quiz,
            leaderboard_size,
            session_idle_timeout,
        })
    }

    #[must_use]
    pub fn questions_per_quiz(&self) -> u32 {
        self.questions_per_quiz
    }

    #[must_use]
    pub fn leaderboard_size(&self) -> u32 {
        self.leaderboard_size
    }

    /// How long a session may sit untouched before it is evicted.
    #[must_use]
    pub fn session_idle_timeout(&self) -> Duration {
        self.session_idle_timeout
    }
}

impl Default for QuizSettings {
    /// Five questions, a top-ten leaderboard, and a one-day idle window.
    fn default() -> Self {
        Self {
            questions_per_quiz: 5,
            leaderboard_size: 10,
            session_idle_timeout: Duration::hours(24),
        }
    }
}
