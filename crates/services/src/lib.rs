#![forbid(unsafe_code)]

pub mod accounts;
pub mod app_services;
pub mod error;
pub mod leaderboard;
pub mod quiz;

pub use quiz_core::Clock;

pub use accounts::RegistrationService;
pub use app_services::QuizServices;
pub use error::{QuizError, RegistrationError, ServicesError};
pub use leaderboard::LeaderboardService;
pub use quiz::{
    AnswerOutcome, CommitResult, PlayerSession, QuizEngine, QuizPhase, ScoreCommitter,
    SessionRegistry, SessionSlot, SessionSnapshot,
};
