pub mod account;
mod ids;
mod player;
mod question;
mod score;
mod settings;

pub use account::{AccountError, PasswordHash, Username, validate_password};
pub use ids::{AccountRef, ParseIdError, SessionId};
pub use player::{DisplayName, Player, PlayerError};
pub use question::{Question, QuestionDraft, QuestionError, QuestionView};
pub use score::{LeaderboardEntry, ScoreError, ScoreRecord, rank_records};
pub use settings::{MAX_LEADERBOARD_SIZE, QuizSettings, SettingsError};
